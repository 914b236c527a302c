//! Seed corpus synthesis for hotmeal's `apply_parity` fuzzer.
//!
//! hotmeal-seeds turns real-world HTML fixtures into fuzzer seeds:
//! - **Extraction**: tag-shaped snippets are cut out of each fixture
//! - **Corpus**: snippets are deduplicated into a sorted set
//! - **Pairing**: snippets become before/after pairs (mutated, crossed, curated)
//! - **Writing**: each pair is stored as `before ++ 0xFF ++ after`, named by its SHA-1
//!
//! # Example
//!
//! ```rust
//! use hotmeal_seeds::{PairSynthesizer, SeedPair, SnippetCorpus, extract_snippets};
//!
//! let corpus: SnippetCorpus = extract_snippets("<ul><li>one item</li></ul>")
//!     .into_iter()
//!     .collect();
//! assert_eq!(corpus.len(), 2);
//!
//! let pairs = PairSynthesizer::default().mutated(&corpus);
//! let bytes = pairs[0].encode();
//! assert_eq!(SeedPair::decode(&bytes).as_ref(), Some(&pairs[0]));
//! ```

mod config;
mod error;

pub mod corpus;
pub mod extract;
pub mod fixtures;
pub mod pairs;
pub mod seed;

pub use config::{DEFAULT_CORPUS_DIR, DEFAULT_FIXTURES_DIR, DEFAULT_RNG_SEED, SeedConfig};
pub use corpus::{Snippet, SnippetCorpus};
pub use error::SeedError;
pub use extract::{Extractor, Nesting, extract_snippets};
pub use fixtures::{FixtureDocument, Fixtures};
pub use pairs::{PairSynthesizer, Strategy};
pub use seed::{SeedPair, SeedWriter, WriteOutcome, seed_name};

use facet::Facet;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use tracing::{info, warn};

/// Seeds produced and written for one strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Facet)]
pub struct StrategyCounts {
    /// Pairs the strategy produced.
    pub pairs: usize,
    /// Seed files newly written.
    pub created: usize,
    /// Seeds whose file already existed.
    pub existing: usize,
}

/// Summary of a seeding run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Facet)]
pub struct RunReport {
    pub fixtures_read: usize,
    pub fixtures_failed: usize,
    /// Snippets extracted, duplicates included.
    pub snippets_found: usize,
    pub unique_snippets: usize,
    pub mutated: StrategyCounts,
    pub crossed: StrategyCounts,
    pub curated: StrategyCounts,
}

impl RunReport {
    pub fn counts(&self, strategy: Strategy) -> &StrategyCounts {
        match strategy {
            Strategy::Mutated => &self.mutated,
            Strategy::Crossed => &self.crossed,
            Strategy::Curated => &self.curated,
        }
    }

    fn counts_mut(&mut self, strategy: Strategy) -> &mut StrategyCounts {
        match strategy {
            Strategy::Mutated => &mut self.mutated,
            Strategy::Crossed => &mut self.crossed,
            Strategy::Curated => &mut self.curated,
        }
    }

    /// Seed files written by this run, across strategies.
    pub fn seeds_created(&self) -> usize {
        Strategy::ALL.iter().map(|&s| self.counts(s).created).sum()
    }

    pub fn to_json(&self) -> Result<String, SeedError> {
        facet_json::to_string(self).map_err(|e| SeedError::Report {
            reason: e.to_string(),
        })
    }
}

/// Read every fixture and pool its snippets.
///
/// Unreadable fixtures are logged and skipped.
pub fn collect_corpus(
    config: &SeedConfig,
    report: &mut RunReport,
) -> Result<SnippetCorpus, SeedError> {
    let fixtures = Fixtures::open(&config.fixtures_dir)?;
    info!(
        "{} fixtures in {}",
        fixtures.remaining(),
        config.fixtures_dir.display()
    );
    Ok(pool_fixtures(&config.extractor(), fixtures, report))
}

/// Pool the snippets of already-loaded fixtures, counting the failures.
pub fn pool_fixtures<I>(
    extractor: &Extractor,
    fixtures: I,
    report: &mut RunReport,
) -> SnippetCorpus
where
    I: IntoIterator<Item = (PathBuf, Result<FixtureDocument, SeedError>)>,
{
    let mut corpus = SnippetCorpus::new();
    for (path, doc) in fixtures {
        let doc = match doc {
            Ok(doc) => doc,
            Err(err) => {
                warn!("skipping {}: {err}", path.display());
                report.fixtures_failed += 1;
                continue;
            }
        };
        let snippets = extractor.extract(&doc.text);
        info!("{}: found {} snippets", doc.name, snippets.len());
        report.fixtures_read += 1;
        report.snippets_found += snippets.len();
        corpus.extend(snippets);
    }

    report.unique_snippets = corpus.len();
    info!(
        "{} snippets total, {} unique",
        report.snippets_found, report.unique_snippets
    );
    corpus
}

/// Run the whole pipeline: fixtures in, seed files out.
pub fn run(config: &SeedConfig) -> Result<RunReport, SeedError> {
    let mut report = RunReport::default();

    let writer = if config.dry_run {
        SeedWriter::dry_run(&config.corpus_dir)
    } else {
        SeedWriter::create(&config.corpus_dir)?
    };

    let corpus = collect_corpus(config, &mut report)?;

    let mut rng = StdRng::seed_from_u64(config.rng_seed);
    for (strategy, pair) in config.synthesizer().synthesize(&corpus, &mut rng) {
        let outcome = writer.write(strategy, &pair)?;
        let counts = report.counts_mut(strategy);
        counts.pairs += 1;
        match outcome {
            WriteOutcome::Created => counts.created += 1,
            WriteOutcome::AlreadyPresent => counts.existing += 1,
        }
    }

    for strategy in Strategy::ALL {
        let counts = report.counts(strategy);
        info!(
            "{strategy}: {} pairs, {} new, {} already present",
            counts.pairs, counts.created, counts.existing
        );
    }
    info!(
        "created {} new seed files in {}",
        report.seeds_created(),
        writer.dir().display()
    );

    Ok(report)
}
