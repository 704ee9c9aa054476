//! Template tokens
//!
//! The token model shared by the lexer, the compression filter and the renderer.
//! Tokens are owned so a filtered stream can outlive the source it was lexed from.

use crate::error::Location;

/// Kinds of tokens in a template stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Optional first token marking the very start of a template
    Initial,
    /// Literal template text
    Data,
    /// `{%`
    BlockBegin,
    /// `%}`
    BlockEnd,
    /// `{{`
    VariableBegin,
    /// `}}`
    VariableEnd,
    /// An identifier inside a block or variable marker
    Name,
    /// Anything else inside a marker: operators, literals, paths
    Other,
}

/// A single token with the line it started on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub lineno: usize,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, lineno: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            lineno,
        }
    }

    pub fn data(value: impl Into<String>, lineno: usize) -> Self {
        Self::new(TokenKind::Data, value, lineno)
    }

    /// Checks the kind and, when given, the value
    pub fn test(&self, kind: TokenKind, value: Option<&str>) -> bool {
        self.kind == kind && value.is_none_or(|value| self.value == value)
    }

    /// True for a `Name` token with the given value
    pub fn is_name(&self, value: &str) -> bool {
        self.test(TokenKind::Name, Some(value))
    }
}

/// Identifies the template a stream came from, for error reports
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Source {
    pub name: Option<String>,
    pub filename: Option<String>,
}

impl Source {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            filename: None,
        }
    }

    /// The location of `token` within this template
    pub fn locate(&self, token: &Token) -> Location {
        self.at_line(token.lineno)
    }

    pub fn at_line(&self, lineno: usize) -> Location {
        Location {
            lineno,
            name: self.name.clone(),
            filename: self.filename.clone(),
        }
    }
}
