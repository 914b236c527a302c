//! Seed encoding and content-addressed writing.
//!
//! A seed is `before ++ 0xFF ++ after`. The fuzz target splits on the first
//! `0xFF`, which never occurs in UTF-8 text, so no length prefix is needed.

use crate::SeedError;
use crate::pairs::Strategy;
use sha1::{Digest, Sha1};
use std::cell::RefCell;
use std::collections::HashSet;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Separates the two halves of a seed.
pub const SEPARATOR: u8 = 0xFF;

/// A before/after pair of HTML fragments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeedPair {
    pub before: String,
    pub after: String,
}

impl SeedPair {
    pub fn new(before: impl Into<String>, after: impl Into<String>) -> Self {
        Self {
            before: before.into(),
            after: after.into(),
        }
    }

    /// Encode as `before ++ 0xFF ++ after`.
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.before.len() + 1 + self.after.len());
        bytes.extend_from_slice(self.before.as_bytes());
        bytes.push(SEPARATOR);
        bytes.extend_from_slice(self.after.as_bytes());
        bytes
    }

    /// Split raw seed bytes the way the fuzz target does: at the first
    /// `0xFF`, with both halves required to be valid UTF-8.
    pub fn decode(data: &[u8]) -> Option<Self> {
        let pos = data.iter().position(|&b| b == SEPARATOR)?;
        let before = std::str::from_utf8(&data[..pos]).ok()?;
        let after = std::str::from_utf8(&data[pos + 1..]).ok()?;
        Some(Self::new(before, after))
    }
}

/// Content-addressed seed file name: strategy prefix plus hex SHA-1.
pub fn seed_name(strategy: Strategy, bytes: &[u8]) -> String {
    format!("{}{}", strategy.prefix(), hex::encode(Sha1::digest(bytes)))
}

/// What happened when a seed was handed to the writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    /// A file with the same name and the same content exists.
    AlreadyPresent,
}

/// Writes seeds into a corpus directory, never twice under the same name.
///
/// Seeds are written to a temporary file in the corpus directory and renamed
/// into place, so a seed name never refers to a partially written file.
#[derive(Debug)]
pub struct SeedWriter {
    dir: PathBuf,
    dry_run: bool,
    /// Names counted as created during a dry run.
    planned: RefCell<HashSet<PathBuf>>,
}

impl SeedWriter {
    /// Create the corpus directory (and its parents) if needed.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self, SeedError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| SeedError::corpus_dir(&dir, e))?;
        Ok(Self {
            dir,
            dry_run: false,
            planned: RefCell::default(),
        })
    }

    /// A writer that only checks for existing files and never writes.
    ///
    /// The directory is not created; if it is missing every seed counts as
    /// new. Repeated seeds within the run count once, as they would when
    /// writing for real.
    pub fn dry_run(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            dry_run: true,
            planned: RefCell::default(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write one seed unless a file with its name and content already exists.
    ///
    /// A file under the seed's name with different content (left behind by an
    /// interrupted write, say) is replaced.
    pub fn write(&self, strategy: Strategy, pair: &SeedPair) -> Result<WriteOutcome, SeedError> {
        let bytes = pair.encode();
        let path = self.dir.join(seed_name(strategy, &bytes));

        if holds_seed(&path, &bytes)? {
            debug!("{} already present", path.display());
            return Ok(WriteOutcome::AlreadyPresent);
        }

        if self.dry_run {
            return Ok(if self.planned.borrow_mut().insert(path) {
                WriteOutcome::Created
            } else {
                WriteOutcome::AlreadyPresent
            });
        }

        let mut tmp =
            NamedTempFile::new_in(&self.dir).map_err(|e| SeedError::seed_write(&path, e))?;
        tmp.write_all(&bytes)
            .map_err(|e| SeedError::seed_write(&path, e))?;
        tmp.persist(&path)
            .map_err(|e| SeedError::seed_write(&path, e.error))?;
        debug!("wrote {} ({} bytes)", path.display(), bytes.len());
        Ok(WriteOutcome::Created)
    }
}

/// Whether `path` exists and holds exactly `bytes`.
fn holds_seed(path: &Path, bytes: &[u8]) -> Result<bool, SeedError> {
    match fs::read(path) {
        Ok(existing) if existing == bytes => Ok(true),
        Ok(_) => {
            warn!("{} does not match its name, rewriting", path.display());
            Ok(false)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(SeedError::seed_write(path, e)),
    }
}
