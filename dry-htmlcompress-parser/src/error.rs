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

//! Error handling for template compression
//!
//! Every error that aborts a traversal carries the location of the token that caused it,
//! so it can be reported against the template source.

use std::fmt::Display;

use thiserror::Error;

/// Returns the last 32 characters of a string for error context
pub(crate) fn rcap(src: &str) -> &str {
    const CAP_AT: usize = 32;

    if src.len() > CAP_AT {
        let mut start = src.len() - CAP_AT;
        while !src.is_char_boundary(start) {
            start += 1;
        }
        &src[start..]
    } else {
        src
    }
}

/// Returns the first 32 characters of a string for error context
pub(crate) fn lcap(src: &str) -> &str {
    const CAP_AT: usize = 32;

    if src.len() > CAP_AT {
        let mut end = CAP_AT;
        while !src.is_char_boundary(end) {
            end -= 1;
        }
        &src[..end]
    } else {
        src
    }
}

/// Where in a template an error happened
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    /// 1-based line of the offending token
    pub lineno: usize,
    /// Template name, when known
    pub name: Option<String>,
    /// File the template was loaded from, when known
    pub filename: Option<String>,
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}", self.lineno)?;
        match (&self.name, &self.filename) {
            (Some(name), _) => write!(f, " in \"{}\"", name),
            (None, Some(filename)) => write!(f, " in {}", filename),
            (None, None) => Ok(()),
        }
    }
}

/// A closing tag that could not be matched against the open element stack
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("tried to leave {tag:?} tag, but something closed it already")]
pub struct UnmatchedClose {
    pub tag: String,
}

/// Error type for template compression failures
#[derive(Debug, Error)]
pub enum Error {
    /// `endstrip` or `endunstrip` without a matching open directive of the same family
    #[error("unexpected tag {directive} at {location}")]
    UnexpectedDirective { directive: String, location: Location },

    /// A closing tag closed an element that was never open
    #[error("{source} at {location}")]
    TagClosed {
        source: UnmatchedClose,
        location: Location,
    },

    /// Malformed template or directive
    #[error("{message} at {location}")]
    Syntax { message: String, location: Location },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn syntax(message: impl Into<String>, location: Location) -> Self {
        Self::Syntax {
            message: message.into(),
            location,
        }
    }

    /// Creates an error for unclosed markers, `opening` starts at the marker
    pub(crate) fn unclosed(opening: &str, location: Location) -> Self {
        Self::syntax(format!("unclosed marker near {}", lcap(opening)), location)
    }

    /// The location of the offending token, if the error has one
    pub fn location(&self) -> Option<&Location> {
        match self {
            Self::UnexpectedDirective { location, .. }
            | Self::TagClosed { location, .. }
            | Self::Syntax { location, .. } => Some(location),
            Self::Io(_) => None,
        }
    }
}

/// Result type for compression operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_display() {
        let mut location = Location {
            lineno: 3,
            name: None,
            filename: None,
        };
        assert_eq!(location.to_string(), "line 3");
        location.filename = Some("templates/index.html".into());
        assert_eq!(location.to_string(), "line 3 in templates/index.html");
        location.name = Some("index".into());
        assert_eq!(location.to_string(), "line 3 in \"index\"");
    }

    #[test]
    fn tag_closed_message() {
        let error = Error::TagClosed {
            source: UnmatchedClose { tag: "div".into() },
            location: Location {
                lineno: 7,
                name: Some("page".into()),
                filename: None,
            },
        };
        assert_eq!(
            error.to_string(),
            "tried to leave \"div\" tag, but something closed it already at line 7 in \"page\""
        );
        assert_eq!(error.location().map(|l| l.lineno), Some(7));
    }

    #[test]
    fn rcap_respects_char_boundaries() {
        let src = format!("{}é{}", "a".repeat(10), "b".repeat(31));
        assert_eq!(rcap(&src), "b".repeat(31));
        assert_eq!(rcap("short"), "short");
        assert_eq!(lcap(&src), format!("{}é{}", "a".repeat(10), "b".repeat(20)));
    }
}
