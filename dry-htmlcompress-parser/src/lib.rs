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

//! HTML whitespace compression for Jinja style templates
//!
//! This crate removes the whitespace that indentation leaves in HTML templates, before the
//! template engine ever sees them. It only touches literal template text, so expressions and
//! blocks pass through untouched. It is used by the `dry-htmlcompress` macros at compile time
//! and can be used directly at runtime.
//!
//! # Features
//!
//! - Whitespace collapsing that knows block level from inline elements
//! - Verbatim `pre`, `script`, `style`, `textarea` and `title` content
//! - Open element tracking across template markers, including optional end tags
//! - Scoped control with `{% strip %}`, `{% strip false %}` and `{% endstrip %}`
//! - Compress everything by default, or only inside `strip`
//!
//! # Example
//!
//! ```rust
//! use dry_htmlcompress_parser::{Compressor, Options};
//!
//! let compressor = Compressor::new(Options::ALWAYS);
//! let template = "<ul>\n  {% for item in items %}\n    <li>{{ item }}</li>\n  {% endfor %}\n</ul>\n";
//! assert_eq!(
//!     compressor.compress("list", template).unwrap(),
//!     "<ul>{% for item in items %}<li>{{ item }}</li>{% endfor %}</ul>"
//! );
//! ```
//!
//! # Module Structure
//!
//! - `compressor.rs`: Options, policies and the one call entry points
//! - `lexer.rs`: Template source to tokens
//! - `filter.rs`: Directive handling over a token stream
//! - `normalize.rs`: Whitespace rewriting of data tokens
//! - `tag_stack.rs`: Open element tracking with implicit closes
//! - `tags.rs`: Element classification tables
//! - `render.rs`: Tokens back to template source
//! - `error.rs`: Error types and handling

pub mod compressor;
pub mod error;
pub mod filter;
pub mod lexer;
pub mod normalize;
pub mod render;
pub mod tag_stack;
pub mod tags;
pub mod token;

pub use compressor::{Compressor, DEFAULT_ACTIVE_KEY, Options, Policies};
pub use error::{Error, Location, Result, UnmatchedClose};
pub use filter::{Directive, Filter, Scope};
pub use lexer::lex;
pub use render::render;
pub use tag_stack::TagStack;
pub use token::{Source, Token, TokenKind};
