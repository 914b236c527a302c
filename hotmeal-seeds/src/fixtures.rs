//! Fixture loading.
//!
//! Fixtures are the real-world HTML documents under `tests/fixtures`. They are
//! listed eagerly (names only) and read lazily, one file per iteration step.

use crate::SeedError;
use std::fs;
use std::path::{Path, PathBuf};

/// Extension a file must carry to count as a fixture.
pub const FIXTURE_EXTENSION: &str = "html";

/// One fixture's text, decoded leniently.
#[derive(Debug, Clone)]
pub struct FixtureDocument {
    /// File name, used for progress reporting.
    pub name: String,
    /// Full text. Invalid UTF-8 sequences are replaced with U+FFFD.
    pub text: String,
}

impl FixtureDocument {
    /// Read a fixture from disk.
    pub fn read(path: &Path) -> Result<Self, SeedError> {
        let bytes = fs::read(path).map_err(|e| SeedError::fixture_read(path, e))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self {
            name,
            text: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

/// Lazy sequence of fixtures found directly inside a directory.
///
/// Subdirectories are not descended into. Paths are sorted by name so that
/// progress output is stable across platforms.
#[derive(Debug)]
pub struct Fixtures {
    paths: std::vec::IntoIter<PathBuf>,
}

impl Fixtures {
    /// List the fixtures in `dir`.
    pub fn open(dir: &Path) -> Result<Self, SeedError> {
        let entries = fs::read_dir(dir).map_err(|e| SeedError::fixture_dir(dir, e))?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SeedError::fixture_dir(dir, e))?;
            let path = entry.path();
            if is_fixture(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        Ok(Self {
            paths: paths.into_iter(),
        })
    }

    /// Number of fixtures not yet read.
    pub fn remaining(&self) -> usize {
        self.paths.len()
    }
}

impl Iterator for Fixtures {
    type Item = (PathBuf, Result<FixtureDocument, SeedError>);

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.paths.next()?;
        let doc = FixtureDocument::read(&path);
        Some((path, doc))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.paths.size_hint()
    }
}

fn is_fixture(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(FIXTURE_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    #[test]
    fn test_lists_only_html_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.html"), "<p>b</p>").unwrap();
        fs::write(dir.path().join("a.HTML"), "<p>a</p>").unwrap();
        fs::write(dir.path().join("notes.txt"), "<p>nope</p>").unwrap();
        fs::create_dir(dir.path().join("nested.html")).unwrap();

        let names: Vec<String> = Fixtures::open(dir.path())
            .unwrap()
            .map(|(_, doc)| doc.unwrap().name)
            .collect();
        assert_eq!(names, vec!["a.HTML", "b.html"]);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.html");
        fs::write(&path, b"<p>caf\xe9</p>").unwrap();

        let doc = FixtureDocument::read(&path).unwrap();
        assert_eq!(doc.text, "<p>caf\u{FFFD}</p>");
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Fixtures::open(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, SeedError::FixtureDir { .. }));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_vanished_file_yields_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.html");
        fs::write(&path, "<p>soon gone</p>").unwrap();

        let mut fixtures = Fixtures::open(dir.path()).unwrap();
        fs::remove_file(&path).unwrap();

        let (_, doc) = fixtures.next().unwrap();
        let err = doc.unwrap_err();
        assert!(err.is_recoverable());
        assert!(fixtures.next().is_none());
    }
}
