//! Errors raised while building a seed corpus.

use facet::Facet;
use std::path::Path;

/// Errors that can occur while loading fixtures or writing seeds.
///
/// Only [`SeedError::FixtureRead`] is recovered from: the fixture is skipped
/// and the run continues. Everything else aborts the run.
#[derive(Facet, Debug)]
#[facet(derive(Error))]
#[repr(u8)]
pub enum SeedError {
    /// cannot list fixture directory {path}: {reason}
    FixtureDir { path: String, reason: String },

    /// cannot read fixture {path}: {reason}
    FixtureRead { path: String, reason: String },

    /// cannot create corpus directory {path}: {reason}
    CorpusDir { path: String, reason: String },

    /// cannot write seed {path}: {reason}
    SeedWrite { path: String, reason: String },

    /// cannot serialize run report: {reason}
    Report { reason: String },
}

impl SeedError {
    pub(crate) fn fixture_dir(path: &Path, err: std::io::Error) -> Self {
        Self::FixtureDir {
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }

    pub(crate) fn fixture_read(path: &Path, err: std::io::Error) -> Self {
        Self::FixtureRead {
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }

    pub(crate) fn corpus_dir(path: &Path, err: std::io::Error) -> Self {
        Self::CorpusDir {
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }

    pub(crate) fn seed_write(path: &Path, err: std::io::Error) -> Self {
        Self::SeedWrite {
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }

    /// Whether the run can carry on after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::FixtureRead { .. })
    }
}
