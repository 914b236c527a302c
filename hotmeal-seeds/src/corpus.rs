//! Snippets and the deduplicated corpus they are pooled into.

use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;
use std::ops::Deref;

/// Snippets must be strictly longer than this many characters.
pub const MIN_SNIPPET_LEN: usize = 10;

/// Default upper bound (inclusive) on snippet length, in characters.
pub const DEFAULT_MAX_SNIPPET_LEN: usize = 2000;

/// A substring of a fixture that looked like a complete element.
///
/// Snippets compare, order and hash by their text only; where they came from
/// is not retained.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Snippet(String);

impl Snippet {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters (not bytes).
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Deref for Snippet {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Borrow<str> for Snippet {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Snippet {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Snippet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Snippet {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Whether a span of `len` characters is kept as a snippet.
pub fn within_bounds(len: usize, max_len: usize) -> bool {
    len > MIN_SNIPPET_LEN && len <= max_len
}

/// Unique snippets pooled across every fixture.
///
/// Backed by an ordered set, so iteration is sorted by text. Anything that
/// takes "the first N" snippets gets the same N on every run.
#[derive(Debug, Clone, Default)]
pub struct SnippetCorpus {
    snippets: BTreeSet<Snippet>,
}

impl SnippetCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a snippet. Returns `false` if an identical one was already present.
    pub fn insert(&mut self, snippet: Snippet) -> bool {
        self.snippets.insert(snippet)
    }

    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }

    pub fn contains(&self, text: &str) -> bool {
        self.snippets.contains(text)
    }

    /// Snippets in sorted order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Snippet> {
        self.snippets.iter()
    }

    /// Freeze into a sorted slice-backed view for indexed sampling.
    pub fn to_sorted_vec(&self) -> Vec<&Snippet> {
        self.snippets.iter().collect()
    }
}

impl Extend<Snippet> for SnippetCorpus {
    fn extend<I: IntoIterator<Item = Snippet>>(&mut self, iter: I) {
        self.snippets.extend(iter);
    }
}

impl FromIterator<Snippet> for SnippetCorpus {
    fn from_iter<I: IntoIterator<Item = Snippet>>(iter: I) -> Self {
        Self {
            snippets: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a SnippetCorpus {
    type Item = &'a Snippet;
    type IntoIter = std::collections::btree_set::Iter<'a, Snippet>;

    fn into_iter(self) -> Self::IntoIter {
        self.snippets.iter()
    }
}
