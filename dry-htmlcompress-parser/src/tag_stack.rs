//! Open element tracking
//!
//! A loose model of where in the HTML element tree the text being compressed sits.
//! This is not a validating parser: markup produced by template logic (conditionals,
//! loops) regularly opens and closes tags in ways a strict parser would reject even
//! though the rendered page is fine. The tracker applies the HTML optional end tag
//! rules on the way in and out, and quietly ignores close tags it cannot place.
//!
//! # Example
//!
//! ```rust
//! use dry_htmlcompress_parser::tag_stack::TagStack;
//!
//! let mut stack = TagStack::new();
//! stack.enter("ul");
//! stack.enter("li");
//! stack.enter("li");
//! assert_eq!(stack.iter().collect::<Vec<_>>(), ["ul", "li"]);
//! stack.leave("ul").unwrap();
//! assert!(stack.is_empty());
//! ```

use log::debug;

use crate::error::UnmatchedClose;
use crate::tags::{IMPLICIT_CLOSE, P_NO_IMPLICIT_CLOSE_INSIDE, is_isolated, is_void};

/// Whether `tag` may be closed implicitly when `next` opens after it
fn allow_implicit_close_before(tag: &str, next: &str) -> bool {
    IMPLICIT_CLOSE
        .get(tag)
        .is_some_and(|close| close.closed_by(next))
}

/// Whether `tag` may be closed implicitly by the end of its parent
fn allow_implicit_close_if_last_child(tag: &str, parent: Option<&str>) -> bool {
    if tag == "p" {
        return parent.is_none_or(|parent| !P_NO_IMPLICIT_CLOSE_INSIDE.contains(parent));
    }
    IMPLICIT_CLOSE.get(tag).is_some_and(|close| close.last_child)
}

/// Stack of currently open elements, outermost first
#[derive(Debug, Default, Clone)]
pub struct TagStack {
    stack: Vec<String>,
}

impl TagStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the opening of `tag`.
    ///
    /// Open elements that `tag` implicitly closes (an `li` followed by another `li`) are
    /// popped first. Void elements are never pushed.
    pub fn enter(&mut self, tag: &str) {
        while let Some(top) = self.stack.last() {
            if !allow_implicit_close_before(top, tag) {
                break;
            }
            debug!("<{}> implicitly closes <{}>", tag, top);
            self.stack.pop();
        }
        if !is_void(tag) {
            self.stack.push(tag.to_string());
        }
    }

    /// Registers the explicit closing of `tag`.
    ///
    /// Closing an element also closes everything opened inside it, so an unclosed inline
    /// tag does not outlive its block. When `tag` is not open, the stack is searched only
    /// through elements that could have been closed as a last child; the first element that
    /// could not stops the search and the close is ignored. Running out of elements means
    /// `tag` was already closed.
    pub fn leave(&mut self, tag: &str) -> Result<(), UnmatchedClose> {
        if let Some(index) = self.stack.iter().rposition(|open| open == tag) {
            self.stack.truncate(index);
            return Ok(());
        }
        for (end, other) in self.stack.iter().enumerate().rev() {
            let parent = end.checked_sub(1).map(|i| self.stack[i].as_str());
            if !allow_implicit_close_if_last_child(other, parent) {
                debug!("ignoring </{}> inside unclosed <{}>", tag, other);
                return Ok(());
            }
        }
        Err(UnmatchedClose {
            tag: tag.to_string(),
        })
    }

    /// True when any open element preserves its whitespace
    pub fn is_isolated(&self) -> bool {
        self.stack.iter().any(|tag| is_isolated(tag))
    }

    pub fn top(&self) -> Option<&str> {
        self.stack.last().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Open elements from outermost to innermost
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.stack.iter().map(String::as_str)
    }
}
