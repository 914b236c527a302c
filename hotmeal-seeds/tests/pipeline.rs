//! End-to-end runs of the seeding pipeline against scratch directories.

use facet_testhelpers::test;
use hotmeal_seeds::{
    Extractor, Fixtures, Nesting, RunReport, SeedConfig, SeedError, SeedPair, Strategy,
    pool_fixtures, run, seed_name,
};
use sha1::{Digest, Sha1};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn seed_files(dir: &Path) -> BTreeSet<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

fn with_prefix(names: &BTreeSet<String>, prefix: &str) -> BTreeSet<String> {
    names
        .iter()
        .filter(|name| name.starts_with(prefix))
        .cloned()
        .collect()
}

#[test]
fn single_paragraph_fixture() {
    let scratch = tempfile::tempdir().unwrap();
    let fixtures = scratch.path().join("fixtures");
    let corpus = scratch.path().join("corpus");
    fs::create_dir(&fixtures).unwrap();
    fs::write(fixtures.join("hello.html"), "<p>Hello</p>").unwrap();

    let report = run(&SeedConfig::new(&fixtures, &corpus)).unwrap();
    assert_eq!(report.fixtures_read, 1);
    assert_eq!(report.unique_snippets, 1);
    assert_eq!(report.mutated.created, 1);
    // Both draws land on the only snippet.
    assert_eq!(report.crossed.pairs, 0);
    assert_eq!(report.curated.created, 8);

    let mut expected = b"<p>Hello</p>".to_vec();
    expected.push(0xFF);
    expected.extend_from_slice(b" <p> Hello </p> ");
    let name = format!("fixture_mod_{}", hex::encode(Sha1::digest(&expected)));

    assert_eq!(fs::read(corpus.join(&name)).unwrap(), expected);
    assert_eq!(
        with_prefix(&seed_files(&corpus), "fixture_mod_"),
        BTreeSet::from([name])
    );
}

#[test]
fn curated_seeds_do_not_depend_on_fixtures() {
    let scratch = tempfile::tempdir().unwrap();
    let fixtures = scratch.path().join("empty");
    let corpus = scratch.path().join("corpus");
    fs::create_dir(&fixtures).unwrap();

    let report = run(&SeedConfig::new(&fixtures, &corpus)).unwrap();
    assert_eq!(report.unique_snippets, 0);
    assert_eq!(report.seeds_created(), 8);

    let pair = SeedPair::new("<input type='text'>", "<input type='password'>");
    let name = seed_name(Strategy::Curated, &pair.encode());
    assert!(name.starts_with("fixture_hand_"));
    assert!(corpus.join(name).is_file());
}

#[test]
fn second_run_creates_nothing() {
    let scratch = tempfile::tempdir().unwrap();
    let corpus = scratch.path().join("nested").join("corpus");
    let config = SeedConfig::new(fixtures_dir(), &corpus);

    let first = run(&config).unwrap();
    assert!(first.seeds_created() > 0);
    let files = seed_files(&corpus);
    assert_eq!(files.len(), first.seeds_created());

    let second = run(&config).unwrap();
    assert_eq!(second.seeds_created(), 0);
    assert_eq!(
        second.mutated.existing + second.crossed.existing + second.curated.existing,
        second.mutated.pairs + second.crossed.pairs + second.curated.pairs
    );
    assert_eq!(seed_files(&corpus), files);
}

#[test]
fn cross_pairs_are_reproducible() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();

    run(&SeedConfig::new(fixtures_dir(), a.path())).unwrap();
    run(&SeedConfig::new(fixtures_dir(), b.path())).unwrap();

    let pairs_a = with_prefix(&seed_files(a.path()), "fixture_pair_");
    assert!(!pairs_a.is_empty());
    assert_eq!(pairs_a, with_prefix(&seed_files(b.path()), "fixture_pair_"));
}

#[test]
fn different_rng_seed_changes_cross_pairs() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();

    run(&SeedConfig::new(fixtures_dir(), a.path())).unwrap();
    run(&SeedConfig {
        rng_seed: 7,
        ..SeedConfig::new(fixtures_dir(), b.path())
    })
    .unwrap();

    assert_ne!(
        with_prefix(&seed_files(a.path()), "fixture_pair_"),
        with_prefix(&seed_files(b.path()), "fixture_pair_")
    );
}

#[test]
fn every_seed_splits_back_into_its_pair() {
    let scratch = tempfile::tempdir().unwrap();
    run(&SeedConfig {
        nesting: Nesting::Nearest,
        ..SeedConfig::new(fixtures_dir(), scratch.path())
    })
    .unwrap();

    for name in seed_files(scratch.path()) {
        let bytes = fs::read(scratch.path().join(&name)).unwrap();
        let pair = SeedPair::decode(&bytes).unwrap_or_else(|| panic!("{name} does not split"));
        assert_eq!(pair.encode(), bytes);

        let strategy = [Strategy::Mutated, Strategy::Crossed, Strategy::Curated]
            .into_iter()
            .find(|s| name.starts_with(s.prefix()))
            .unwrap();
        assert_eq!(seed_name(strategy, &bytes), name);
    }
}

#[test]
fn limits_bound_the_streams() {
    let scratch = tempfile::tempdir().unwrap();
    let report = run(&SeedConfig {
        mutate_limit: 3,
        cross_limit: 5,
        ..SeedConfig::new(fixtures_dir(), scratch.path())
    })
    .unwrap();

    assert!(report.unique_snippets > 3);
    assert_eq!(report.mutated.pairs, 3);
    assert!(report.crossed.pairs <= 5);
}

#[test]
fn dry_run_writes_nothing() {
    let scratch = tempfile::tempdir().unwrap();
    let corpus = scratch.path().join("corpus");
    let report = run(&SeedConfig {
        dry_run: true,
        ..SeedConfig::new(fixtures_dir(), &corpus)
    })
    .unwrap();

    assert!(report.seeds_created() > 0);
    assert!(!corpus.exists());
}

#[test]
fn dry_run_counts_match_a_real_run() {
    let scratch = tempfile::tempdir().unwrap();
    let dry = run(&SeedConfig {
        dry_run: true,
        ..SeedConfig::new(fixtures_dir(), scratch.path().join("dry"))
    })
    .unwrap();
    let real = run(&SeedConfig::new(fixtures_dir(), scratch.path().join("real"))).unwrap();

    assert_eq!(dry.seeds_created(), real.seeds_created());
    assert_eq!(seed_files(&scratch.path().join("real")).len(), real.seeds_created());
    for strategy in Strategy::ALL {
        assert_eq!(dry.counts(strategy), real.counts(strategy), "{strategy}");
    }
}

#[test]
fn unreadable_fixture_is_skipped_and_counted() {
    let scratch = tempfile::tempdir().unwrap();
    fs::write(scratch.path().join("a.html"), "<p>kept paragraph</p>").unwrap();
    fs::write(scratch.path().join("b.html"), "<p>gone paragraph</p>").unwrap();

    let fixtures = Fixtures::open(scratch.path()).unwrap();
    fs::remove_file(scratch.path().join("b.html")).unwrap();

    let mut report = RunReport::default();
    let corpus = pool_fixtures(&Extractor::default(), fixtures, &mut report);
    assert_eq!(report.fixtures_read, 1);
    assert_eq!(report.fixtures_failed, 1);
    assert_eq!(report.unique_snippets, 1);
    assert!(corpus.contains("<p>kept paragraph</p>"));
}

#[cfg(unix)]
#[test]
fn run_survives_a_fixture_without_read_permission() {
    use std::os::unix::fs::PermissionsExt;

    let scratch = tempfile::tempdir().unwrap();
    let fixtures = scratch.path().join("fixtures");
    fs::create_dir(&fixtures).unwrap();
    fs::write(fixtures.join("open.html"), "<p>Hello there</p>").unwrap();
    let locked = fixtures.join("locked.html");
    fs::write(&locked, "<p>Secret text</p>").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    // Permission bits do not stop a privileged user.
    let expect_failure = fs::read(&locked).is_err();

    let report = run(&SeedConfig::new(&fixtures, scratch.path().join("corpus"))).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

    if expect_failure {
        assert_eq!(report.fixtures_failed, 1);
        assert_eq!(report.fixtures_read, 1);
        assert_eq!(report.unique_snippets, 1);
    } else {
        assert_eq!(report.fixtures_failed, 0);
        assert_eq!(report.fixtures_read, 2);
    }
    assert_eq!(report.curated.created, 8);
}

#[test]
fn missing_fixture_dir_is_fatal() {
    let scratch = tempfile::tempdir().unwrap();
    let err = run(&SeedConfig::new(
        scratch.path().join("missing"),
        scratch.path().join("corpus"),
    ))
    .unwrap_err();
    assert!(matches!(err, SeedError::FixtureDir { .. }));
}

#[test]
fn report_serializes_to_json() {
    let report = RunReport {
        fixtures_read: 2,
        unique_snippets: 5,
        ..RunReport::default()
    };
    let json = report.to_json().unwrap();
    assert!(json.contains("\"fixtures_read\""));
    assert!(json.contains("\"unique_snippets\""));
    assert!(json.contains("\"curated\""));
}
