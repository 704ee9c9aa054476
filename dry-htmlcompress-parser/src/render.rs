//! Token stream rendering
//!
//! Turns a (filtered) token stream back into template source for the template engine that
//! will eventually compile it. Data is written verbatim; marker contents are joined with
//! single spaces, which is equivalent for any Jinja style engine.

use crate::token::{Token, TokenKind};

/// Writes tokens back out as template source
pub fn render<'a>(tokens: impl IntoIterator<Item = &'a Token>) -> String {
    let mut out = String::new();
    for token in tokens {
        match token.kind {
            TokenKind::Initial => (),
            TokenKind::Data => out.push_str(&token.value),
            TokenKind::BlockBegin => out.push_str("{%"),
            TokenKind::VariableBegin => out.push_str("{{"),
            TokenKind::BlockEnd => out.push_str(" %}"),
            TokenKind::VariableEnd => out.push_str(" }}"),
            TokenKind::Name | TokenKind::Other => {
                out.push(' ');
                out.push_str(&token.value);
            }
        }
    }
    out
}
