//! Snippet extraction.
//!
//! This is a syntactic scan, not a parse: it looks for tag-shaped text and
//! cuts out whatever lies between an opening tag and its closing tag. The
//! result is frequently not well-formed markup, which is fine (and often
//! useful) for seeding a fuzzer.

use crate::corpus::{DEFAULT_MAX_SNIPPET_LEN, Snippet, within_bounds};
use tracing::trace;

/// How a paired shape finds the end of its span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Nesting {
    /// End at the nearest closing tag of the same name.
    ///
    /// `<div><div>x</div></div>` yields `<div><div>x</div>`: the outer
    /// opening tag binds to the inner closing tag, and the true outer
    /// closing tag is skipped. The closing tag must be exactly `</name>`,
    /// with no whitespace before `>`. Kept for parity with corpora generated
    /// by the older regex-based seeder.
    Nearest,

    /// End at the closing tag that balances the opening tag, counting
    /// same-name tags in between.
    ///
    /// A span that is too long (or never closes) is not consumed, so
    /// elements nested inside it still get a chance.
    #[default]
    Balanced,
}

/// Whether a shape has content and a closing tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Paired,
    Void,
}

/// A family of tag names matched together.
#[derive(Debug, Clone, Copy)]
pub struct Shape {
    pub names: &'static [&'static str],
    pub kind: ShapeKind,
}

impl Shape {
    const fn paired(names: &'static [&'static str]) -> Self {
        Self {
            names,
            kind: ShapeKind::Paired,
        }
    }

    const fn void(names: &'static [&'static str]) -> Self {
        Self {
            names,
            kind: ShapeKind::Void,
        }
    }
}

/// Shapes, in the order they are applied.
pub const SHAPES: &[Shape] = &[
    Shape::paired(&["div"]),
    Shape::paired(&["p"]),
    Shape::paired(&["ul"]),
    Shape::paired(&["ol"]),
    Shape::paired(&["li"]),
    Shape::paired(&["span"]),
    Shape::paired(&["a"]),
    Shape::paired(&["table"]),
    Shape::paired(&["tr"]),
    Shape::paired(&["td"]),
    Shape::paired(&["th"]),
    Shape::paired(&["section"]),
    Shape::paired(&["article"]),
    Shape::paired(&["nav"]),
    Shape::paired(&["header"]),
    Shape::paired(&["footer"]),
    Shape::paired(&["h1", "h2", "h3", "h4", "h5", "h6"]),
    Shape::paired(&["form"]),
    Shape::void(&["input"]),
    Shape::paired(&["button"]),
];

/// Extracts snippets from fixture text.
#[derive(Debug, Clone, Copy)]
pub struct Extractor {
    /// Inclusive upper bound on snippet length, in characters.
    pub max_len: usize,
    pub nesting: Nesting,
}

impl Default for Extractor {
    fn default() -> Self {
        Self {
            max_len: DEFAULT_MAX_SNIPPET_LEN,
            nesting: Nesting::default(),
        }
    }
}

impl Extractor {
    pub fn new(max_len: usize, nesting: Nesting) -> Self {
        Self { max_len, nesting }
    }

    /// All snippets in `text`, shape by shape in [`SHAPES`] order, left to
    /// right within a shape. May contain duplicates.
    pub fn extract(&self, text: &str) -> Vec<Snippet> {
        let mut out = Vec::new();
        for shape in SHAPES {
            let before = out.len();
            self.scan_shape(text, shape, &mut out);
            trace!("shape {:?}: {} snippets", shape.names, out.len() - before);
        }
        out
    }

    fn scan_shape(&self, text: &str, shape: &Shape, out: &mut Vec<Snippet>) {
        let bytes = text.as_bytes();
        // Past this many bytes a span is certainly over `max_len` characters.
        let byte_budget = self.max_len.saturating_mul(4);

        let mut pos = 0;
        while let Some(start) = find_byte(bytes, b'<', pos) {
            let Some((idx, open_end)) = open_tag_at(bytes, start, shape.names) else {
                pos = start + 1;
                continue;
            };

            let end = match (shape.kind, self.nesting) {
                (ShapeKind::Void, _) => Some(open_end),
                (ShapeKind::Paired, Nesting::Nearest) => {
                    find_nearest_close(bytes, open_end, shape.names)
                }
                (ShapeKind::Paired, Nesting::Balanced) => find_balanced_close(
                    bytes,
                    open_end,
                    shape.names[idx],
                    start.saturating_add(byte_budget),
                ),
            };

            let Some(end) = end else {
                pos = start + 1;
                continue;
            };

            // Both ends sit on ASCII bytes, so this is a char boundary.
            let candidate = &text[start..end];
            if within_bounds(candidate.chars().count(), self.max_len) {
                out.push(Snippet::new(candidate));
                pos = end;
            } else {
                pos = match self.nesting {
                    Nesting::Nearest => end,
                    Nesting::Balanced => open_end,
                };
            }
        }
    }
}

/// Extract snippets with the default settings.
pub fn extract_snippets(text: &str) -> Vec<Snippet> {
    Extractor::default().extract(text)
}

fn find_byte(bytes: &[u8], needle: u8, from: usize) -> Option<usize> {
    bytes
        .get(from..)?
        .iter()
        .position(|&b| b == needle)
        .map(|i| from + i)
}

fn is_name_boundary(b: u8) -> bool {
    b == b'>' || b == b'/' || b.is_ascii_whitespace()
}

/// Match `<name ...>` at `pos` for one of `names`, ignoring ASCII case.
///
/// Returns the index of the matched name and the offset just past `>`.
fn open_tag_at(bytes: &[u8], pos: usize, names: &[&str]) -> Option<(usize, usize)> {
    let rest = bytes.get(pos..)?.strip_prefix(b"<")?;
    let (idx, name) = names.iter().enumerate().find(|(_, name)| {
        let name = name.as_bytes();
        rest.len() > name.len()
            && rest[..name.len()].eq_ignore_ascii_case(name)
            && is_name_boundary(rest[name.len()])
    })?;
    let after_name = pos + 1 + name.len();
    let gt = find_byte(bytes, b'>', after_name)?;
    Some((idx, gt + 1))
}

/// Match `</name>` at `pos`, ignoring ASCII case. With `trailing_space`,
/// whitespace is allowed before `>`. Returns the offset just past `>`.
fn close_tag_at(bytes: &[u8], pos: usize, name: &str, trailing_space: bool) -> Option<usize> {
    let rest = bytes.get(pos..)?.strip_prefix(b"</")?;
    let name = name.as_bytes();
    if rest.len() < name.len() || !rest[..name.len()].eq_ignore_ascii_case(name) {
        return None;
    }
    let mut i = name.len();
    while trailing_space && rest.get(i).is_some_and(|b| b.is_ascii_whitespace()) {
        i += 1;
    }
    (rest.get(i) == Some(&b'>')).then_some(pos + 2 + i + 1)
}

fn find_nearest_close(bytes: &[u8], from: usize, names: &[&str]) -> Option<usize> {
    let mut pos = from;
    while let Some(lt) = find_byte(bytes, b'<', pos) {
        if let Some(end) = names.iter().find_map(|name| close_tag_at(bytes, lt, name, false)) {
            return Some(end);
        }
        pos = lt + 1;
    }
    None
}

fn find_balanced_close(bytes: &[u8], from: usize, name: &str, limit: usize) -> Option<usize> {
    let mut depth = 1usize;
    let mut pos = from;
    while let Some(lt) = find_byte(bytes, b'<', pos) {
        if lt >= limit {
            return None;
        }
        if let Some(end) = close_tag_at(bytes, lt, name, true) {
            depth -= 1;
            if depth == 0 {
                return (end <= limit).then_some(end);
            }
            pos = end;
        } else if let Some((_, end)) = open_tag_at(bytes, lt, &[name]) {
            depth += 1;
            pos = end;
        } else {
            pos = lt + 1;
        }
    }
    None
}
