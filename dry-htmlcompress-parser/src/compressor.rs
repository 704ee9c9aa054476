//! Template compression entry points
//!
//! [`Compressor`] ties the pieces together: it decides whether compression starts out
//! active for a template, and runs lexing, filtering and rendering in one call.
//!
//! # Configuration
//!
//! Whether compression is on by default comes from [`Options::default_active`], which can be
//! overridden per compressor with the `htmlcompress.default_active` policy:
//!
//! ```rust
//! use dry_htmlcompress_parser::{Compressor, Options, DEFAULT_ACTIVE_KEY};
//!
//! let always = Compressor::new(Options::ALWAYS);
//! assert_eq!(always.compress("t", "<b>  x  </b>").unwrap(), "<b>x</b>");
//!
//! let off = Compressor::new(Options::ALWAYS).with_policy(DEFAULT_ACTIVE_KEY, false);
//! assert_eq!(off.compress("t", "<b>  x  </b>").unwrap(), "<b>  x  </b>");
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::filter::Filter;
use crate::lexer::lex;
use crate::render::render;
use crate::token::{Source, Token, TokenKind};

/// Policy key controlling whether compression starts out active
pub const DEFAULT_ACTIVE_KEY: &str = "htmlcompress.default_active";

/// Compressor options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Compress outside of any `strip` directive
    pub default_active: bool,
    /// Treat the start of each template as a boundary, dropping its leading whitespace
    pub trim_start: bool,
}

impl Options {
    /// Compression everywhere except inside `strip false`
    pub const ALWAYS: Options = Options {
        default_active: true,
        trim_start: false,
    };

    /// Compression only inside `strip`
    pub const SELECTIVE: Options = Options {
        default_active: false,
        trim_start: false,
    };
}

impl Default for Options {
    fn default() -> Self {
        Self::ALWAYS
    }
}

/// Boolean policy values by key
#[derive(Debug, Clone, Default)]
pub struct Policies {
    values: HashMap<String, bool>,
}

impl Policies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: bool) {
        self.values.insert(key.into(), value);
    }

    pub fn get(&self, key: &str, default: bool) -> bool {
        self.values.get(key).copied().unwrap_or(default)
    }
}

/// Whitespace compressor for templates
#[derive(Debug, Clone, Default)]
pub struct Compressor {
    options: Options,
    policies: Policies,
}

impl Compressor {
    pub fn new(options: Options) -> Self {
        Self {
            options,
            policies: Policies::new(),
        }
    }

    pub fn with_policy(mut self, key: impl Into<String>, value: bool) -> Self {
        self.policies.set(key, value);
        self
    }

    pub fn policies_mut(&mut self) -> &mut Policies {
        &mut self.policies
    }

    /// Whether compression starts out active for a template
    pub fn active_for(&self, _source: &Source) -> bool {
        self.policies
            .get(DEFAULT_ACTIVE_KEY, self.options.default_active)
    }

    /// Wraps a token stream in a compression filter
    pub fn filter<T: IntoIterator<Item = Token>>(
        &self,
        source: Source,
        tokens: T,
    ) -> Filter<T::IntoIter> {
        let active = self.active_for(&source);
        Filter::new(source, tokens, active)
    }

    /// Compresses template source, returning the compressed source
    pub fn compress(&self, name: &str, template: &str) -> Result<String> {
        self.compress_source(Source::named(name), template)
    }

    pub fn compress_source(&self, source: Source, template: &str) -> Result<String> {
        let mut tokens = lex(&source, template)?;
        if self.options.trim_start {
            tokens.insert(0, Token::new(TokenKind::Initial, "", 1));
        }
        let filtered = self
            .filter(source, tokens)
            .collect::<Result<Vec<_>>>()?;
        Ok(render(&filtered))
    }

    /// Reads and compresses a template file, named after its file stem
    pub fn compress_file(&self, path: impl AsRef<Path>) -> Result<String> {
        let path = path.as_ref();
        let template = fs::read_to_string(path)?;
        let source = Source {
            name: path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned()),
            filename: Some(path.display().to_string()),
        };
        self.compress_source(source, &template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    static PAGE: &str = r#"
            <html>
              <head>
                <title>{{ title }}</title>
              </head>
              <script type=text/javascript>
                if (foo < 42) {
                  document.write('Foo < Bar');
                }
              </script>
              <body>
                <pre>
                    Preformatted text
                        Indented
                </pre>
                <li><a href="{{ href }}">{{ title }}</a><br>Test   Foo
                <li><a href="{{ href }}">{{ title }}</a><img src=test.png>
              </body>
            </html>
        "#;

    #[test]
    fn full_page() {
        let compressed = Compressor::new(Options::ALWAYS).compress("page", PAGE).unwrap();
        assert_eq!(
            compressed,
            r#"<html><head><title>{{ title }}</title></head><script type=text/javascript>
                if (foo < 42) {
                  document.write('Foo < Bar');
                }
              </script><body><pre>
                    Preformatted text
                        Indented
                </pre><li><a href="{{ href }}">{{ title }}</a><br>Test Foo<li><a href="{{ href }}">{{ title }}</a><img src=test.png></body></html>"#
        );
    }

    #[test]
    fn policy_overrides_options() {
        let src = "<span>  foo  bar  </span>";
        let selective = Compressor::new(Options::SELECTIVE);
        assert_eq!(selective.compress("t", src).unwrap(), src);
        let selective = selective.with_policy(DEFAULT_ACTIVE_KEY, true);
        assert_eq!(selective.compress("t", src).unwrap(), "<span>foo bar</span>");

        let mut always = Compressor::new(Options::ALWAYS);
        always.policies_mut().set(DEFAULT_ACTIVE_KEY, false);
        assert_eq!(always.compress("t", src).unwrap(), src);
        always.policies_mut().set("unrelated", false);
        always.policies_mut().set(DEFAULT_ACTIVE_KEY, true);
        assert_eq!(always.compress("t", src).unwrap(), "<span>foo bar</span>");
    }

    #[test]
    fn selective_strip_region() {
        let compressed = Compressor::new(Options::SELECTIVE)
            .compress("t", "<p>  a  </p>\n{% strip %}\n<p>  b  </p>\n{% endstrip %}\n<p>  c  </p>")
            .unwrap();
        assert_eq!(compressed, "<p>  a  </p>\n<p>b</p>\n<p>  c  </p>");
    }

    #[test]
    fn trim_start_option() {
        let options = Options {
            trim_start: true,
            ..Options::ALWAYS
        };
        assert_eq!(
            Compressor::new(options).compress("t", "  \n  <b>x</b>").unwrap(),
            "<b>x</b>"
        );
        assert_eq!(
            Compressor::new(Options::ALWAYS).compress("t", "  \n  <b>x</b>").unwrap(),
            " <b>x</b>"
        );
        assert_eq!(
            Compressor::new(options).compress("t", "  \n  hello {{ x }}").unwrap(),
            "hello {{ x }}"
        );
    }

    #[test]
    fn compression_resumes_after_unclosed_tag_in_pre() {
        let compressed = Compressor::new(Options::ALWAYS)
            .compress("t", "<div><pre><b>x</pre>\n   <p>  more   text  </p>\n</div>")
            .unwrap();
        assert_eq!(compressed, "<div><pre><b>x</pre><p>more text</p></div>");
    }

    #[test]
    fn errors_name_the_template() {
        let error = Compressor::default()
            .compress("broken", "<ul>\n{% endstrip %}")
            .unwrap_err();
        assert_eq!(error.to_string(), "unexpected tag endstrip at line 2 in \"broken\"");

        let error = Compressor::default()
            .compress_file("does/not/exist.html")
            .unwrap_err();
        assert!(matches!(error, Error::Io(_)));
        assert!(error.location().is_none());
    }
}
