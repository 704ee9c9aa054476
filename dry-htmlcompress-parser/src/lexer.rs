// MIT License
//
// Copyright (c) 2024 Jerome Johnson
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! Template lexing
//!
//! Splits Jinja style template source into the token stream the compression filter works on.
//!
//! # Syntax
//!
//! - Blocks: `{% name args %}`
//! - Variables: `{{ expression }}`
//! - Comments: `{# comment #}`, dropped from the stream
//! - Raw sections: `{% raw %}{{ not parsed }}{% endraw %}`, emitted as data
//! - Whitespace control: `{%-` trims the text before a marker, `-%}` the text after it
//!
//! Marker content is split on whitespace. Identifiers become [`TokenKind::Name`] tokens,
//! everything else (paths, operators, literals) [`TokenKind::Other`]. String literals are
//! kept whole.
//!
//! # Examples
//!
//! ```rust
//! use dry_htmlcompress_parser::lexer::lex;
//! use dry_htmlcompress_parser::token::{Source, TokenKind};
//!
//! let tokens = lex(&Source::default(), "<p>{% if user %}{{ user.name }}{% endif %}</p>").unwrap();
//! assert_eq!(tokens[0].kind, TokenKind::Data);
//! assert!(tokens[2].is_name("if"));
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result, rcap};
use crate::token::{Source, Token, TokenKind};

static END_RAW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{%(-?)\s*endraw\s*(-?)%\}").unwrap());

/// Types of markers embedded in template text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Block,
    Variable,
    Comment,
}

impl Marker {
    fn close(self) -> &'static str {
        match self {
            Self::Block => "%}",
            Self::Variable => "}}",
            Self::Comment => "#}",
        }
    }

    fn tokens(self) -> (TokenKind, TokenKind) {
        match self {
            Self::Variable => (TokenKind::VariableBegin, TokenKind::VariableEnd),
            _ => (TokenKind::BlockBegin, TokenKind::BlockEnd),
        }
    }
}

/// Finds the next marker opening
fn find_marker(src: &str) -> Option<(usize, Marker)> {
    src.match_indices('{').find_map(|(i, _)| {
        let marker = match src[i + 1..].chars().next()? {
            '%' => Marker::Block,
            '{' => Marker::Variable,
            '#' => Marker::Comment,
            _ => return None,
        };
        Some((i, marker))
    })
}

/// Finds the end of a quoted string, returning the index after the closing quote
fn find_end_of_string(src: &str) -> Option<usize> {
    let quote = src.chars().next()?;
    let mut escaped = false;
    for (i, c) in src.char_indices().skip(1) {
        match c {
            '\\' => escaped = !escaped,
            c if c == quote && !escaped => return Some(i + c.len_utf8()),
            _ => escaped = false,
        }
    }
    None
}

/// Finds the end of a word, stopping at whitespace or the closing delimiter
fn find_end(src: &str, close: &str) -> usize {
    for (i, c) in src.char_indices() {
        let rest = &src[i..];
        if c.is_whitespace() || rest.starts_with(close) {
            return i;
        }
        if c == '-' && rest[1..].starts_with(close) {
            return i;
        }
    }
    src.len()
}

fn is_identifier(word: &str) -> bool {
    let mut chars = word.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

struct Lexer<'a> {
    source: &'a Source,
    src: &'a str,
    pos: usize,
    lineno: usize,
    /// Set by a `-%}` style close: trim the start of the following text
    lstrip_next: bool,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a Source, src: &'a str) -> Self {
        Self {
            source,
            src,
            pos: 0,
            lineno: 1,
            lstrip_next: false,
            tokens: Vec::new(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn advance(&mut self, len: usize) {
        self.lineno += self.src[self.pos..self.pos + len].matches('\n').count();
        self.pos += len;
    }

    fn push(&mut self, kind: TokenKind, value: &str) {
        self.tokens.push(Token::new(kind, value, self.lineno));
    }

    /// Pushes text found at the current position, which is not consumed
    fn push_data(&mut self, text: &str) {
        let mut lineno = self.lineno;
        let mut text = text;
        if self.lstrip_next {
            let trimmed = text.trim_start();
            lineno += text[..text.len() - trimmed.len()].matches('\n').count();
            text = trimmed;
            self.lstrip_next = false;
        }
        if !text.is_empty() {
            self.tokens.push(Token::data(text, lineno));
        }
    }

    fn run(mut self) -> Result<Vec<Token>> {
        while self.pos < self.src.len() {
            let rest = self.rest();
            let Some((start, marker)) = find_marker(rest) else {
                self.push_data(rest);
                self.advance(rest.len());
                break;
            };
            let trim_before = rest[start + 2..].starts_with('-');
            let text = &rest[..start];
            self.push_data(if trim_before { text.trim_end() } else { text });
            self.advance(start);
            let open_len = if trim_before { 3 } else { 2 };
            match marker {
                Marker::Comment => self.comment(open_len)?,
                _ => self.marker(marker, open_len)?,
            }
        }
        Ok(self.tokens)
    }

    fn comment(&mut self, open_len: usize) -> Result<()> {
        let lineno = self.lineno;
        let rest = self.rest();
        match rest[open_len..].find("#}") {
            Some(pos) => {
                let end = open_len + pos;
                self.lstrip_next = rest[..end].ends_with('-') && end > open_len;
                self.advance(end + 2);
                Ok(())
            }
            None => Err(Error::unclosed(rest, self.source.at_line(lineno))),
        }
    }

    fn marker(&mut self, marker: Marker, open_len: usize) -> Result<()> {
        let (begin, end) = marker.tokens();
        let close = marker.close();
        let opened_at = self.tokens.len();
        let lineno = self.lineno;
        let opening = self.rest();
        self.push(begin, &opening[..2]);
        self.advance(open_len);

        loop {
            let rest = self.rest();
            let skipped = rest.len() - rest.trim_start().len();
            self.advance(skipped);
            let rest = self.rest();
            if rest.is_empty() {
                return Err(Error::unclosed(opening, self.source.at_line(lineno)));
            }
            let trim_after = rest.starts_with('-') && rest[1..].starts_with(close);
            if trim_after || rest.starts_with(close) {
                if self.tokens.len() == opened_at + 1 {
                    let consumed = &opening[..opening.len() - rest.len()];
                    return Err(Error::syntax(
                        format!("empty marker near {}", rcap(consumed)),
                        self.source.at_line(lineno),
                    ));
                }
                self.push(end, close);
                self.advance(if trim_after { 3 } else { 2 });
                self.lstrip_next = trim_after;
                break;
            }
            let len = if rest.starts_with(['"', '\'']) {
                find_end_of_string(rest).ok_or_else(|| {
                    Error::syntax(
                        format!("unterminated string near {}", rcap(rest)),
                        self.source.at_line(self.lineno),
                    )
                })?
            } else {
                find_end(rest, close)
            };
            let word = &rest[..len];
            let kind = if is_identifier(word) {
                TokenKind::Name
            } else {
                TokenKind::Other
            };
            self.push(kind, word);
            self.advance(len);
        }

        if marker == Marker::Block && self.is_raw_opening(opened_at) {
            self.tokens.truncate(opened_at);
            self.raw(lineno)?;
        }
        Ok(())
    }

    fn is_raw_opening(&self, opened_at: usize) -> bool {
        self.tokens.len() == opened_at + 3 && self.tokens[opened_at + 1].is_name("raw")
    }

    /// Emits everything up to the matching `{% endraw %}` as data
    fn raw(&mut self, lineno: usize) -> Result<()> {
        let rest = self.rest();
        let Some(captures) = END_RAW.captures(rest) else {
            return Err(Error::syntax(
                "missing end of raw directive",
                self.source.at_line(lineno),
            ));
        };
        let Some(found) = captures.get(0) else {
            return Ok(());
        };
        let text = &rest[..found.start()];
        let trim_before = captures.get(1).is_some_and(|m| !m.is_empty());
        self.push_data(if trim_before { text.trim_end() } else { text });
        self.advance(found.end());
        self.lstrip_next = captures.get(2).is_some_and(|m| !m.is_empty());
        Ok(())
    }
}

/// Splits template source into tokens
pub fn lex(source: &Source, src: &str) -> Result<Vec<Token>> {
    Lexer::new(source, src).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind::*;

    fn kinds(src: &str) -> Vec<(TokenKind, String)> {
        lex(&Source::default(), src)
            .unwrap()
            .into_iter()
            .map(|token| (token.kind, token.value))
            .collect()
    }

    fn t(kind: TokenKind, value: &str) -> (TokenKind, String) {
        (kind, value.to_string())
    }

    #[test]
    fn splits_markers() {
        assert_eq!(
            kinds("a {% strip false %}b{{ user.name }}"),
            vec![
                t(Data, "a "),
                t(BlockBegin, "{%"),
                t(Name, "strip"),
                t(Name, "false"),
                t(BlockEnd, "%}"),
                t(Data, "b"),
                t(VariableBegin, "{{"),
                t(Other, "user.name"),
                t(VariableEnd, "}}"),
            ]
        );
    }

    #[test]
    fn markers_without_spaces() {
        assert_eq!(
            kinds("{%strip%}{{x}}"),
            vec![
                t(BlockBegin, "{%"),
                t(Name, "strip"),
                t(BlockEnd, "%}"),
                t(VariableBegin, "{{"),
                t(Name, "x"),
                t(VariableEnd, "}}"),
            ]
        );
    }

    #[test]
    fn strings_are_kept_whole() {
        assert_eq!(
            kinds("{{ \"a %} b\" ~ 'it\\'s' }}"),
            vec![
                t(VariableBegin, "{{"),
                t(Other, "\"a %} b\""),
                t(Other, "~"),
                t(Other, "'it\\'s'"),
                t(VariableEnd, "}}"),
            ]
        );
    }

    #[test]
    fn whitespace_control() {
        assert_eq!(
            kinds("a  \n {%- if x -%}\n  b {{- y }}"),
            vec![
                t(Data, "a"),
                t(BlockBegin, "{%"),
                t(Name, "if"),
                t(Name, "x"),
                t(BlockEnd, "%}"),
                t(Data, "b"),
                t(VariableBegin, "{{"),
                t(Name, "y"),
                t(VariableEnd, "}}"),
            ]
        );
    }

    #[test]
    fn comments_are_dropped() {
        assert_eq!(
            kinds("a {# note {{ x }} #} b {#- trimmed -#}  c"),
            vec![t(Data, "a "), t(Data, " b"), t(Data, "c")]
        );
    }

    #[test]
    fn raw_sections_are_data() {
        assert_eq!(
            kinds("{% raw %}{{ x }} {% if %}{% endraw %}!"),
            vec![t(Data, "{{ x }} {% if %}"), t(Data, "!")]
        );
    }

    #[test]
    fn line_numbers() {
        let tokens = lex(&Source::default(), "<p>\n{% strip %}\n  x\n{{\n y }}").unwrap();
        let lines: Vec<_> = tokens.iter().map(|token| token.lineno).collect();
        assert_eq!(lines, vec![1, 2, 2, 2, 2, 4, 5, 5]);
    }

    #[test]
    fn unclosed_markers() {
        let source = Source::named("broken");
        let error = lex(&source, "ok\n{% if x").unwrap_err();
        assert_eq!(error.location().map(|l| l.lineno), Some(2));
        assert!(error.to_string().starts_with("unclosed marker near {% if x"));
        assert!(lex(&source, "{# never closed").is_err());
        assert!(lex(&source, "{{ \"open }}").is_err());
        assert!(lex(&source, "{% raw %} forever").is_err());
    }

    #[test]
    fn empty_markers_are_errors() {
        let error = lex(&Source::default(), "x {%  %}").unwrap_err();
        assert!(error.to_string().starts_with("empty marker"));
        // a lone brace is text
        assert_eq!(kinds("a { b }"), vec![t(Data, "a { b }")]);
    }
}
