//! Whitespace normalization of literal template text
//!
//! Each data token is scanned for tag heads (`<tag`, `</tag`) and tag tails (`>` plus the
//! whitespace after it). The text between them is either free text or attribute content,
//! and is rewritten as follows:
//!
//! - free text has every run of HTML whitespace (space, tab, CR, LF, form feed) collapsed
//!   to one space, other space characters such as `&nbsp;` are content
//! - whitespace next to a block level tag is dropped entirely
//! - next to an inline tag one space survives, so words are not glued together
//! - attribute values are kept as written, only whitespace next to the delimiters changes
//! - inside isolated elements (`pre`, `script`, ...) nothing is touched
//!
//! The open element stack and the "last tag seen" state carry over from one token to the
//! next, so a tag split across template markers is still handled.
//!
//! # Examples
//!
//! ```rust
//! use dry_htmlcompress_parser::normalize::Normalizer;
//!
//! let mut normalizer = Normalizer::new();
//! let text = normalizer.normalize("<p>Please   <a href=\"x\">  login  </a>   to", false).unwrap();
//! assert_eq!(text, "<p>Please <a href=\"x\">login</a> to");
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::error::UnmatchedClose;
use crate::tag_stack::TagStack;
use crate::tags::{is_raw_text, is_spaceless};

/// Tag heads and tag tails. The head must not swallow trailing whitespace,
/// that belongs to the attribute content that follows.
static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(?P<closes>/?)(?P<tag>[a-zA-Z0-9_-]+)|(?P<tail>>[ \t\r\n\x0C]*)").unwrap()
});

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t\r\n\x0C]+").unwrap());

fn is_space(c: char) -> bool {
    c.is_ascii_whitespace()
}

fn trim(text: &str) -> &str {
    text.trim_matches(is_space)
}

fn trim_start(text: &str) -> &str {
    text.trim_start_matches(is_space)
}

fn trim_end(text: &str) -> &str {
    text.trim_end_matches(is_space)
}

fn collapse(out: &mut String, text: &str) {
    out.push_str(&WHITESPACE.replace_all(text, " "));
}

/// Writes attribute content found between a tag head and its tail.
///
/// `after_head` is set when the content directly follows the tag name,
/// `before_tail` when it runs up to the closing `>`.
fn push_attributes(out: &mut String, text: &str, after_head: bool, before_tail: bool) {
    let body = trim(text);
    if body.is_empty() {
        if !before_tail && !text.is_empty() {
            out.push(' ');
        }
        return;
    }
    let leading = &text[..text.len() - trim_start(text).len()];
    if !leading.is_empty() {
        if after_head {
            out.push(' ');
        } else {
            out.push_str(leading);
        }
    }
    out.push_str(body);
    if !before_tail && trim_end(text).len() < text.len() {
        out.push(' ');
    }
}

/// Whitespace normalizer for the data tokens of one template
#[derive(Debug, Default)]
pub struct Normalizer {
    stack: TagStack,
    /// Name of the last tag head seen
    last_tag: Option<String>,
    /// Whether the last tag head was a closing tag
    last_closed: bool,
    /// Inside a tag, between its head and its tail
    in_marker: bool,
    /// Last output ended on a tail whose trailing whitespace was dropped
    at_boundary: bool,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The open element stack as left by the tokens normalized so far
    pub fn stack(&self) -> &TagStack {
        &self.stack
    }

    /// True when the last normalized token ended where following whitespace can be dropped
    pub fn at_boundary(&self) -> bool {
        self.at_boundary
    }

    /// Compresses one data token.
    ///
    /// Whitespace at the very start of `source` is only dropped when `strip_leading_space`
    /// is set; otherwise it may be separating this text from whatever came before.
    pub fn normalize(
        &mut self,
        source: &str,
        strip_leading_space: bool,
    ) -> Result<String, UnmatchedClose> {
        let mut out = String::with_capacity(source.len());
        let mut pos = 0;
        let mut head_end = None;
        let mut can_compress = !self.stack.is_isolated();
        self.at_boundary = false;

        for captures in TAG.captures_iter(source) {
            let Some(found) = captures.get(0) else {
                continue;
            };

            if let Some(tail) = captures.name("tail") {
                // a '>' outside of a tag is just text
                if !self.in_marker {
                    continue;
                }
                if can_compress {
                    let after_head = head_end == Some(pos);
                    push_attributes(&mut out, &source[pos..found.start()], after_head, true);
                    // an opening tag or a block tag needs no space after it,
                    // a closing inline tag keeps one
                    let strip = !self.last_closed
                        || self.last_tag.as_deref().is_none_or(is_spaceless);
                    if strip {
                        out.push('>');
                    } else {
                        collapse(&mut out, tail.as_str());
                    }
                    self.at_boundary = strip;
                } else {
                    out.push_str(&source[pos..found.end()]);
                }
                self.in_marker = false;
                pos = found.end();
                continue;
            }

            let closes = captures.name("closes").is_some_and(|m| !m.is_empty());
            let name = captures.name("tag").map_or("", |m| m.as_str());
            let tag = name.to_ascii_lowercase();

            // raw text elements only end at their own closing tag
            if let Some(top) = self.stack.top() {
                if is_raw_text(top) && !(closes && tag == top) {
                    continue;
                }
            }

            if can_compress {
                let mut preamble = &source[pos..found.start()];
                if pos > 0 || strip_leading_space {
                    preamble = trim_start(preamble);
                }
                // inline tags keep one space before them
                if closes || is_spaceless(&tag) {
                    preamble = trim_end(preamble);
                }
                collapse(&mut out, preamble);
                out.push_str(found.as_str());
            } else {
                out.push_str(&source[pos..found.end()]);
            }

            if closes {
                self.stack.leave(&tag)?;
            } else {
                self.stack.enter(&tag);
            }
            can_compress = !self.stack.is_isolated();
            self.last_closed = closes;
            self.last_tag = Some(tag);
            self.in_marker = true;
            self.at_boundary = false;
            pos = found.end();
            head_end = Some(pos);
        }

        let rest = &source[pos..];
        if !rest.is_empty() {
            self.at_boundary = false;
            if !can_compress {
                out.push_str(rest);
            } else if self.in_marker {
                push_attributes(&mut out, rest, head_end == Some(pos), false);
            } else if pos == 0 && strip_leading_space {
                collapse(&mut out, trim_start(rest));
            } else {
                collapse(&mut out, rest);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(src: &str) -> String {
        Normalizer::new().normalize(src, false).unwrap()
    }

    #[test]
    fn collapses_inline_content() {
        assert_eq!(normalize("<span>  foo  bar  </span>"), "<span>foo bar</span>");
    }

    #[test]
    fn keeps_single_space_around_inline_tags() {
        assert_eq!(
            normalize("<p>Please   <a href=\"x\">  login  </a>   to"),
            "<p>Please <a href=\"x\">login</a> to"
        );
    }

    #[test]
    fn drops_space_around_block_tags() {
        assert_eq!(
            normalize("<div>\n  <p>\n    Foo<br>Bar\n    Baz\n  </p>\n</div>\n"),
            "<div><p>Foo<br>Bar Baz</p></div>"
        );
    }

    #[test]
    fn preformatted_text_is_untouched() {
        let src = "<div>\n  <pre>\n   indented   text\n\n</pre>\n</div>";
        assert_eq!(
            normalize(src),
            "<div><pre>\n   indented   text\n\n</pre></div>"
        );
    }

    #[test]
    fn script_comparisons_are_not_tags() {
        let src = "<script>\n  if (a<b && c > d) {}\n</script>\n<b>x</b>";
        let mut normalizer = Normalizer::new();
        assert_eq!(
            normalizer.normalize(src, false).unwrap(),
            "<script>\n  if (a<b && c > d) {}\n</script><b>x</b>"
        );
        assert!(normalizer.stack().is_empty());
    }

    #[test]
    fn attribute_values_are_verbatim() {
        assert_eq!(
            normalize("<span   class=\"a  b\"   >  x</span>"),
            "<span class=\"a  b\">x</span>"
        );
        assert_eq!(normalize("<br  />\n  next"), "<br />next");
    }

    #[test]
    fn attribute_split_across_tokens() {
        let mut normalizer = Normalizer::new();
        assert_eq!(
            normalizer.normalize("<table><tr><th   class=\"", false).unwrap(),
            "<table><tr><th class=\""
        );
        assert_eq!(normalizer.normalize("a", false).unwrap(), "a");
        assert_eq!(
            normalizer.normalize("  b\">\n  Name  </th>", false).unwrap(),
            "  b\">Name</th>"
        );
        assert_eq!(
            normalizer.stack().iter().collect::<Vec<_>>(),
            ["table", "tr"]
        );
    }

    #[test]
    fn stray_angle_bracket_is_text() {
        assert_eq!(normalize("<b>a  >  b</b>"), "<b>a > b</b>");
        assert_eq!(
            normalize("<!DOCTYPE html>\n<html>\n</html>"),
            "<!DOCTYPE html><html></html>"
        );
    }

    #[test]
    fn leading_space_needs_permission() {
        let mut normalizer = Normalizer::new();
        assert_eq!(normalizer.normalize("  <b>x</b>", false).unwrap(), " <b>x</b>");
        assert_eq!(normalizer.normalize("  <b>x</b>", true).unwrap(), "<b>x</b>");
        assert_eq!(normalizer.normalize("  text  ", false).unwrap(), " text ");
        assert_eq!(normalizer.normalize("  text  ", true).unwrap(), "text ");
        assert_eq!(normalizer.normalize(" \n ", true).unwrap(), "");
    }

    #[test]
    fn leading_space_is_kept_inside_a_tag() {
        let mut normalizer = Normalizer::new();
        assert_eq!(normalizer.normalize("<td class=", false).unwrap(), "<td class=");
        assert_eq!(normalizer.normalize("  wide>x", true).unwrap(), "  wide>x");
    }

    #[test]
    fn only_html_whitespace_is_collapsed() {
        assert_eq!(
            normalize("<span>a\u{a0}\u{a0}b  \t c</span>"),
            "<span>a\u{a0}\u{a0}b c</span>"
        );
        assert_eq!(normalize("<a>b</a>\u{3000}\u{3000}c"), "<a>b</a>\u{3000}\u{3000}c");
        assert_eq!(normalize("<div>\u{a0}</div>\x0C<p>x</p>"), "<div>\u{a0}</div><p>x</p>");
    }

    #[test]
    fn unclosed_inline_tag_inside_pre() {
        let mut normalizer = Normalizer::new();
        assert_eq!(
            normalizer
                .normalize("<div><pre><b>x</pre>\n   <p>  more   text  </p>\n</div>", false)
                .unwrap(),
            "<div><pre><b>x</pre><p>more text</p></div>"
        );
        assert!(normalizer.stack().is_empty());
    }

    #[test]
    fn reports_boundaries() {
        let mut normalizer = Normalizer::new();
        normalizer.normalize("<div>\n   ", false).unwrap();
        assert!(normalizer.at_boundary());
        normalizer.normalize("</div> ", false).unwrap();
        assert!(normalizer.at_boundary());
        normalizer.normalize("<span>a</span>\n", false).unwrap();
        assert!(!normalizer.at_boundary());
    }

    #[test]
    fn implicit_close_of_list_items() {
        let mut normalizer = Normalizer::new();
        assert_eq!(
            normalizer.normalize("<li>one<li>two", false).unwrap(),
            "<li>one<li>two"
        );
        assert_eq!(normalizer.stack().iter().collect::<Vec<_>>(), ["li"]);
    }

    #[test]
    fn tag_names_are_case_insensitive() {
        let mut normalizer = Normalizer::new();
        assert_eq!(
            normalizer.normalize("<DIV>\n <PRE>  x  </pre> </Div>", false).unwrap(),
            "<DIV><PRE>  x  </pre></Div>"
        );
        assert!(normalizer.stack().is_empty());
    }

    #[test]
    fn unmatched_close_is_an_error() {
        let mut normalizer = Normalizer::new();
        let error = normalizer.normalize("<div></div></div>", false).unwrap_err();
        assert_eq!(error.tag, "div");
    }
}
