//! Generate `apply_parity` fuzzer seeds from HTML fixtures.
//!
//! Run from the hotmeal crate directory, or pass the directories explicitly:
//!
//! ```text
//! hotmeal-seeds tests/fixtures fuzz/corpus/apply_parity
//! ```
//!
//! Logging is controlled by `SEED_LOG` (a `tracing` targets filter, default `info`).

use clap::{Parser, ValueEnum};
use hotmeal_seeds::corpus::DEFAULT_MAX_SNIPPET_LEN;
use hotmeal_seeds::pairs::{DEFAULT_CROSS_LIMIT, DEFAULT_MUTATE_LIMIT};
use hotmeal_seeds::{
    DEFAULT_CORPUS_DIR, DEFAULT_FIXTURES_DIR, DEFAULT_RNG_SEED, Nesting, SeedConfig,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::fmt::time::Uptime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum NestingArg {
    /// Nearest closing tag of the same name (matches the legacy corpus)
    Nearest,
    /// Depth-balanced closing tag
    Balanced,
}

impl From<NestingArg> for Nesting {
    fn from(arg: NestingArg) -> Self {
        match arg {
            NestingArg::Nearest => Nesting::Nearest,
            NestingArg::Balanced => Nesting::Balanced,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "hotmeal-seeds",
    version,
    about = "Build apply_parity fuzzer seeds from real-world HTML fixtures"
)]
struct Cli {
    /// Directory of *.html fixtures
    #[arg(default_value = DEFAULT_FIXTURES_DIR)]
    fixtures_dir: PathBuf,

    /// Corpus directory to write seeds into (created if missing)
    #[arg(default_value = DEFAULT_CORPUS_DIR)]
    corpus_dir: PathBuf,

    /// Longest snippet kept, in characters
    #[arg(long, default_value_t = DEFAULT_MAX_SNIPPET_LEN)]
    max_len: usize,

    /// Number of snippets paired with a mutated copy of themselves
    #[arg(long, default_value_t = DEFAULT_MUTATE_LIMIT)]
    mutate_limit: usize,

    /// Maximum number of random cross-pair draws
    #[arg(long, default_value_t = DEFAULT_CROSS_LIMIT)]
    cross_limit: usize,

    /// Seed for the cross-pair random source
    #[arg(long, default_value_t = DEFAULT_RNG_SEED)]
    rng_seed: u64,

    /// How paired tags find their closing tag
    #[arg(long, value_enum, default_value_t = NestingArg::Balanced)]
    nesting: NestingArg,

    /// Count seeds without writing them
    #[arg(long)]
    dry_run: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    json: bool,
}

impl From<&Cli> for SeedConfig {
    fn from(cli: &Cli) -> Self {
        SeedConfig {
            fixtures_dir: cli.fixtures_dir.clone(),
            corpus_dir: cli.corpus_dir.clone(),
            max_len: cli.max_len,
            mutate_limit: cli.mutate_limit,
            cross_limit: cli.cross_limit,
            rng_seed: cli.rng_seed,
            nesting: cli.nesting.into(),
            dry_run: cli.dry_run,
        }
    }
}

fn setup_tracing() {
    let filter = std::env::var("SEED_LOG")
        .ok()
        .and_then(|s| s.parse::<Targets>().ok())
        .unwrap_or_else(|| Targets::new().with_default(LevelFilter::INFO));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_timer(Uptime::default())
                .with_target(false)
                .with_level(true)
                .compact(),
        )
        .with(filter)
        .try_init()
        .ok();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_tracing();

    let report = match hotmeal_seeds::run(&SeedConfig::from(&cli)) {
        Ok(report) => report,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    if cli.json {
        match report.to_json() {
            Ok(json) => println!("{json}"),
            Err(err) => {
                error!("{err}");
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
