//! HTML tag classification tables
//!
//! Static lookup tables describing how elements behave with respect to whitespace
//! and optional end tags. The sets follow the element categories and the optional
//! tags section of the HTML5 syntax, with a few additions (noted inline) that make
//! tracking more forgiving of the odd orderings template logic produces.
//!
//! All tables are built once per process and shared read-only.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// Marker used in the implicit close definitions for "closed when it is the last child
/// of its parent"
const LAST_CHILD: &str = "#last-child";

fn word_set(words: &'static str) -> HashSet<&'static str> {
    words.split_whitespace().collect()
}

/// Elements whose content is never compressed.
///
/// The raw text and escapable raw text elements, plus `pre`.
pub static ISOLATED: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| word_set("script style textarea title pre"));

/// Isolated elements whose content is text only.
///
/// Nothing but their own end tag is markup inside them.
pub static RAW_TEXT: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| word_set("script style textarea title"));

/// Elements that never have content or an end tag
pub static VOID: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    word_set("area base br col embed hr img input link meta param source track wbr")
});

/// Elements that need no whitespace preserved around them.
///
/// Block level elements, table parts, `html`, `head`, `title`, `script` and every void element.
/// Anything not listed here is treated as inline, where one space must survive.
pub static SPACELESS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    let mut set = word_set(
        "address article aside blockquote body canvas dd div dl dt fieldset \
         figcaption figure footer form h1 h2 h3 h4 h5 h6 head header hgroup hr \
         html li main nav noscript ol output p pre section script \
         table thead title tbody tfoot tr td th ul video",
    );
    set.extend(VOID.iter().copied());
    set
});

/// Parents inside which a `p` may not be closed implicitly as their last child
pub static P_NO_IMPLICIT_CLOSE_INSIDE: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| word_set("a audio del ins map noscript video"));

/// The conditions under which an open element may be closed without an end tag
#[derive(Debug, Default)]
pub struct ImplicitClose {
    /// Tags that close the element when they open as its next sibling
    pub followers: HashSet<&'static str>,
    /// Whether the element closes when its parent closes
    pub last_child: bool,
}

impl ImplicitClose {
    pub fn closed_by(&self, next: &str) -> bool {
        self.followers.contains(next)
    }
}

/// Expands `("a b", "c d #last-child")` style definitions into one entry per key
fn compile_implicit_close_map(
    source: &[(&'static str, &'static str)],
) -> HashMap<&'static str, ImplicitClose> {
    let mut map = HashMap::new();
    for (keys, value) in source {
        for key in keys.split_whitespace() {
            let mut close = ImplicitClose::default();
            for word in value.split_whitespace() {
                if word == LAST_CHILD {
                    close.last_child = true;
                } else {
                    close.followers.insert(word);
                }
            }
            map.insert(key, close);
        }
    }
    map
}

/// Elements with optional end tags, keyed by tag name
pub static IMPLICIT_CLOSE: LazyLock<HashMap<&'static str, ImplicitClose>> = LazyLock::new(|| {
    compile_implicit_close_map(&[
        ("li", "li #last-child"),
        // HTML gives dt no last child rule
        ("dt dd", "dt dd #last-child"),
        // p may also close as last child, restricted by P_NO_IMPLICIT_CLOSE_INSIDE
        (
            "p",
            "address article aside blockquote details div dl fieldset figcaption \
             figure footer form h1 h2 h3 h4 h5 h6 header hr main menu nav ol \
             p pre section table ul",
        ),
        ("rt rp", "rt rp #last-child"),
        ("option", "option optgroup #last-child"),
        ("optgroup", "optgroup #last-child"),
        ("menuitem", "menuitem hr menu #last-child"),
        // colgroup really closes when not followed by space or a comment,
        // the common table elements stand in for that rule
        ("colgroup", "thead tfoot tbody tr th td #last-child"),
        ("thead tbody tfoot", "thead tbody tfoot #last-child"),
        // tbody, thead and tfoot are additions for tr, th and td
        ("tr", "tbody thead tfoot tr #last-child"),
        ("th td", "tbody thead tfoot td th #last-child"),
    ])
});

#[inline]
pub fn is_isolated(tag: &str) -> bool {
    ISOLATED.contains(tag)
}

#[inline]
pub fn is_raw_text(tag: &str) -> bool {
    RAW_TEXT.contains(tag)
}

#[inline]
pub fn is_void(tag: &str) -> bool {
    VOID.contains(tag)
}

#[inline]
pub fn is_spaceless(tag: &str) -> bool {
    SPACELESS.contains(tag)
}
