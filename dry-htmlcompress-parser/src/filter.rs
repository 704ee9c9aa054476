//! Directive scoped compression filter
//!
//! [`Filter`] wraps a template token stream and compresses its data tokens while
//! compression is active. Activity is controlled by directives:
//!
//! - `{% strip %}` / `{% strip true %}` ... `{% endstrip %}`: compress the enclosed region
//! - `{% strip false %}` ... `{% endstrip %}`: leave the enclosed region alone
//! - `{% unstrip %}` ... `{% endunstrip %}`: deprecated spelling of `strip false`, with its
//!   own closing directive
//!
//! Directives nest to any depth. They are consumed by the filter; every other token is
//! forwarded in order, with data rewritten by the [`Normalizer`].
//!
//! # Examples
//!
//! ```rust
//! use dry_htmlcompress_parser::filter::Filter;
//! use dry_htmlcompress_parser::token::{Source, Token};
//!
//! let tokens = vec![Token::data("<div>\n  <b> x </b>\n</div>", 1)];
//! let filtered: Vec<_> = Filter::new(Source::default(), tokens, true)
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(filtered[0].value, "<div><b>x</b></div>");
//! ```

use std::iter::Peekable;

use log::{trace, warn};

use crate::error::{Error, Result};
use crate::normalize::Normalizer;
use crate::token::{Source, Token, TokenKind};

/// One level of the directive scope stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Opened by `strip`, compressing when `true`
    Strip(bool),
    /// Opened by the deprecated `unstrip`, never compressing
    Unstrip,
}

impl Scope {
    pub fn is_active(self) -> bool {
        match self {
            Self::Strip(active) => active,
            Self::Unstrip => false,
        }
    }

    /// Scopes opened by `unstrip` only close with `endunstrip`
    pub fn is_inverted(self) -> bool {
        matches!(self, Self::Unstrip)
    }
}

/// A parsed scope directive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Open(Scope),
    Close { inverted: bool },
}

impl Directive {
    fn name(self) -> &'static str {
        match self {
            Self::Open(Scope::Strip(_)) => "strip",
            Self::Open(Scope::Unstrip) => "unstrip",
            Self::Close { inverted: false } => "endstrip",
            Self::Close { inverted: true } => "endunstrip",
        }
    }
}

fn is_directive(token: &Token) -> bool {
    token.kind == TokenKind::Name
        && matches!(
            token.value.as_str(),
            "strip" | "endstrip" | "unstrip" | "endunstrip"
        )
}

/// Iterator adapter compressing the data tokens of one template
pub struct Filter<I: Iterator<Item = Token>> {
    tokens: Peekable<I>,
    source: Source,
    normalizer: Normalizer,
    scopes: Vec<Scope>,
    default_active: bool,
    active: bool,
    /// Whether the next data token may lose its leading whitespace
    strip_leading_space: bool,
    failed: bool,
}

impl<I: Iterator<Item = Token>> Filter<I> {
    pub fn new(
        source: Source,
        tokens: impl IntoIterator<IntoIter = I>,
        default_active: bool,
    ) -> Self {
        Self {
            tokens: tokens.into_iter().peekable(),
            source,
            normalizer: Normalizer::new(),
            scopes: Vec::new(),
            default_active,
            active: default_active,
            strip_leading_space: false,
            failed: false,
        }
    }

    /// Whether data tokens are currently compressed
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Number of open directive scopes
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Reads the rest of a directive whose name is the next token
    fn parse_directive(&mut self, begin: &Token) -> Result<Directive> {
        let name = self
            .tokens
            .next()
            .ok_or_else(|| Error::unclosed("{%", self.source.locate(begin)))?;
        let directive = match name.value.as_str() {
            "strip" => {
                let enable = match self.tokens.peek() {
                    Some(token) if token.is_name("false") => Some(false),
                    Some(token) if token.is_name("true") => Some(true),
                    _ => None,
                };
                if enable.is_some() {
                    self.tokens.next();
                }
                Directive::Open(Scope::Strip(enable.unwrap_or(true)))
            }
            "endstrip" => Directive::Close { inverted: false },
            "unstrip" => {
                warn!(
                    "`{{% unstrip %}}` at {} is deprecated, use `{{% strip false %}}` instead",
                    self.source.locate(&name)
                );
                Directive::Open(Scope::Unstrip)
            }
            _ => Directive::Close { inverted: true },
        };
        self.expect_end(&name, directive)
    }

    fn expect_end(&mut self, name: &Token, directive: Directive) -> Result<Directive> {
        match self.tokens.next() {
            Some(token) if token.kind == TokenKind::BlockEnd => Ok(directive),
            Some(token) => Err(Error::syntax(
                format!(
                    "expected end of {} directive, got {:?}",
                    directive.name(),
                    token.value
                ),
                self.source.locate(&token),
            )),
            None => Err(Error::unclosed(directive.name(), self.source.locate(name))),
        }
    }

    fn apply(&mut self, directive: Directive, begin: &Token) -> Result<()> {
        match directive {
            Directive::Open(scope) => self.scopes.push(scope),
            Directive::Close { inverted } => {
                if !self.scopes.last().is_some_and(|top| top.is_inverted() == inverted) {
                    return Err(Error::UnexpectedDirective {
                        directive: directive.name().to_string(),
                        location: self.source.locate(begin),
                    });
                }
                self.scopes.pop();
            }
        }
        self.active = self
            .scopes
            .last()
            .map_or(self.default_active, |scope| scope.is_active());
        trace!(
            "{} at {}: depth {}, active {}",
            directive.name(),
            self.source.locate(begin),
            self.scopes.len(),
            self.active
        );
        Ok(())
    }

    fn data(&mut self, token: Token) -> Result<Token> {
        let Token { kind, value, lineno } = token;
        let value = if self.active {
            self.normalizer
                .normalize(&value, self.strip_leading_space)
                .map_err(|source| Error::TagClosed {
                    source,
                    location: self.source.at_line(lineno),
                })?
        } else {
            value
        };
        if let Some(last) = value.chars().last() {
            self.strip_leading_space =
                last.is_ascii_whitespace() || (self.active && self.normalizer.at_boundary());
        }
        Ok(Token { kind, value, lineno })
    }

    /// Handles one input token, returning what to forward
    fn step(&mut self, token: Token) -> Result<Option<Token>> {
        match token.kind {
            TokenKind::Initial => {
                self.strip_leading_space = true;
                Ok(Some(token))
            }
            TokenKind::Data => self.data(token).map(Some),
            TokenKind::BlockBegin if self.tokens.peek().is_some_and(is_directive) => {
                let directive = self.parse_directive(&token)?;
                self.apply(directive, &token)?;
                Ok(None)
            }
            _ => {
                self.strip_leading_space = false;
                Ok(Some(token))
            }
        }
    }
}

impl<I: Iterator<Item = Token>> Iterator for Filter<I> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            let token = self.tokens.next()?;
            match self.step(token) {
                Ok(Some(token)) => return Some(Ok(token)),
                Ok(None) => continue,
                Err(error) => {
                    self.failed = true;
                    return Some(Err(error));
                }
            }
        }
    }
}
