//! Run configuration.

use crate::corpus::DEFAULT_MAX_SNIPPET_LEN;
use crate::extract::{Extractor, Nesting};
use crate::pairs::{DEFAULT_CROSS_LIMIT, DEFAULT_MUTATE_LIMIT, PairSynthesizer};
use std::path::PathBuf;

/// Fixture directory, relative to the hotmeal crate.
pub const DEFAULT_FIXTURES_DIR: &str = "tests/fixtures";

/// Corpus directory of the `apply_parity` target, relative to the hotmeal crate.
pub const DEFAULT_CORPUS_DIR: &str = "fuzz/corpus/apply_parity";

/// Seed for the cross-pair random source.
pub const DEFAULT_RNG_SEED: u64 = 42;

/// Everything a seeding run needs to know.
#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub fixtures_dir: PathBuf,
    pub corpus_dir: PathBuf,
    pub max_len: usize,
    pub mutate_limit: usize,
    pub cross_limit: usize,
    pub rng_seed: u64,
    pub nesting: Nesting,
    /// Report what would be written without writing it.
    pub dry_run: bool,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            fixtures_dir: PathBuf::from(DEFAULT_FIXTURES_DIR),
            corpus_dir: PathBuf::from(DEFAULT_CORPUS_DIR),
            max_len: DEFAULT_MAX_SNIPPET_LEN,
            mutate_limit: DEFAULT_MUTATE_LIMIT,
            cross_limit: DEFAULT_CROSS_LIMIT,
            rng_seed: DEFAULT_RNG_SEED,
            nesting: Nesting::default(),
            dry_run: false,
        }
    }
}

impl SeedConfig {
    pub fn new(fixtures_dir: impl Into<PathBuf>, corpus_dir: impl Into<PathBuf>) -> Self {
        Self {
            fixtures_dir: fixtures_dir.into(),
            corpus_dir: corpus_dir.into(),
            ..Self::default()
        }
    }

    pub fn extractor(&self) -> Extractor {
        Extractor::new(self.max_len, self.nesting)
    }

    pub fn synthesizer(&self) -> PairSynthesizer {
        PairSynthesizer::new(self.mutate_limit, self.cross_limit)
    }
}
