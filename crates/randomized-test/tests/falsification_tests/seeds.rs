//! Falsification tests: seed control and reproducibility (F001-F010)

use std::sync::Arc;

use parking_lot::Mutex;

use randomized_core::{RandomStream, SeedValue, SuiteConfig, TestConfig, derive_seed, resolve_seed};
use randomized_platform::ScriptedThreadLister;
use randomized_test::TestError;

use super::isolated_suite;

fn draws(seed: SeedValue, n: usize) -> Vec<i32> {
    let mut stream = RandomStream::new(seed);
    (0..n).map(|_| stream.next_i32()).collect()
}

/// F001: An explicit seed is returned unchanged
///
/// # Falsification Attempt
/// Resolve a spread of explicit seeds, including zero, negative and extreme
/// values, and look for any that changes.
#[test]
fn f001_explicit_seed_identity() {
    for raw in [0, 1, -1, 12345, i64::MIN, i64::MAX] {
        let seed = SeedValue::new(raw);
        assert_eq!(
            resolve_seed(Some(seed)),
            seed,
            "F001 FALSIFIED: explicit seed {raw} was altered"
        );
    }
}

/// F002: A fresh seed replays when re-supplied
///
/// # Falsification Attempt
/// Draw a fresh seed, consume a stream, then rebuild from the same seed.
#[test]
fn f002_fresh_seed_reproducible() {
    let fresh = resolve_seed(None);
    let replayed = resolve_seed(Some(fresh));
    assert_eq!(
        draws(fresh, 32),
        draws(replayed, 32),
        "F002 FALSIFIED: re-supplied seed {fresh} produced different draws"
    );
}

/// F003: Seed 12345 has a pinned first draw
///
/// # Falsification Attempt
/// Compare the first draw of seed 12345 with the golden value.
#[test]
fn f003_golden_first_draw() {
    assert_eq!(
        draws(SeedValue::new(12345), 3),
        vec![1_553_932_502, -2_090_749_135, -287_790_814],
        "F003 FALSIFIED: generator drifted from the golden sequence"
    );
}

/// F004: Zero and negative seeds are ordinary
///
/// # Falsification Attempt
/// Verify seeds 0 and -1 produce their own, distinct streams.
#[test]
fn f004_zero_and_negative_seeds() {
    assert_eq!(draws(SeedValue::new(0), 1), vec![-1_155_484_576]);
    assert_eq!(draws(SeedValue::new(-1), 1), vec![1_155_099_827]);
    assert_ne!(
        draws(SeedValue::new(0), 8),
        draws(SeedValue::new(-1), 8),
        "F004 FALSIFIED: seeds 0 and -1 collide"
    );
}

/// F005: A pinned seed is reused by every iteration
///
/// # Falsification Attempt
/// Repeat a pinned test and record the first draw of each iteration.
#[test]
fn f005_pinned_seed_every_iteration() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let report = isolated_suite("f005", &ScriptedThreadLister::new(), "1")
        .test_with(
            "pinned",
            TestConfig::new().seed(SeedValue::new(12345)).repeat(5),
            move |ctx| {
                sink.lock().push(ctx.random_int());
                Ok(())
            },
        )
        .build()
        .run()
        .unwrap();

    assert!(report.is_success());
    assert_eq!(
        *seen.lock(),
        vec![1_553_932_502; 5],
        "F005 FALSIFIED: a pinned iteration drew from another seed"
    );
}

/// F006: The master seed replays every derived seed
///
/// # Falsification Attempt
/// Run the same suite twice with one master seed and compare the draws of
/// every iteration; then change the master seed and expect new draws.
#[test]
fn f006_master_seed_replays_suite() {
    let run = |master: &str| {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        isolated_suite("f006", &ScriptedThreadLister::new(), master)
            .test_with("repeat", TestConfig::new().repeat(4), move |ctx| {
                sink.lock().push(ctx.random_int_between(0, 10)?);
                Ok(())
            })
            .build()
            .run()
            .unwrap();
        seen.lock().clone()
    };

    assert_eq!(run("42"), run("42"), "F006 FALSIFIED: same master seed, different draws");
    assert_ne!(
        (0..4).map(|i| derive_seed(SeedValue::new(42), "repeat", i)).collect::<Vec<_>>(),
        (0..4).map(|i| derive_seed(SeedValue::new(43), "repeat", i)).collect::<Vec<_>>(),
        "F006 FALSIFIED: master seed does not influence derived seeds"
    );
}

/// F007: Concurrent streams do not interfere
///
/// # Falsification Attempt
/// Draw from streams with distinct seeds on several threads at once and
/// compare with single-threaded draws.
#[test]
fn f007_concurrent_streams_isolated() {
    let handles: Vec<_> = (0..4_i64)
        .map(|raw| std::thread::spawn(move || draws(SeedValue::new(raw), 256)))
        .collect();
    for (raw, handle) in (0..4_i64).zip(handles) {
        assert_eq!(
            handle.join().unwrap(),
            draws(SeedValue::new(raw), 256),
            "F007 FALSIFIED: stream for seed {raw} disturbed by a sibling"
        );
    }
}

/// F008: Malformed seeds fail suite setup before any test runs
///
/// # Falsification Attempt
/// Supply a malformed master seed and check that no body executes.
#[test]
fn f008_malformed_seed_is_configuration_error() {
    let ran = Arc::new(Mutex::new(false));
    let flag = Arc::clone(&ran);
    let result = isolated_suite("f008", &ScriptedThreadLister::new(), "0xZZ")
        .test("body", move |_| {
            *flag.lock() = true;
            Ok(())
        })
        .build()
        .run();

    assert!(
        result.unwrap_err().is_configuration(),
        "F008 FALSIFIED: malformed seed not reported as configuration error"
    );
    assert!(!*ran.lock(), "F008 FALSIFIED: a test ran after setup failed");
}

/// F009: Failures report the seed needed to reproduce them
///
/// # Falsification Attempt
/// Fail a derived-seed test and a pinned-seed test; inspect the hints.
#[test]
fn f009_failure_carries_reproduction_hint() {
    let report = isolated_suite("f009", &ScriptedThreadLister::new(), "0x10")
        .test("derived", |_| Err(TestError::assertion("expected 5, got 10")))
        .test_with("pinned", TestConfig::new().seed(SeedValue::new(-7)), |_| {
            Err(TestError::assertion("expected 5, got 10"))
        })
        .build()
        .run()
        .unwrap();

    let hints: Vec<&str> = report.failures().map(|r| r.reproduce.as_str()).collect();
    assert_eq!(
        hints,
        vec!["TESTS_SEED=16", "seed pinned to -7"],
        "F009 FALSIFIED: reproduction hints missing or wrong"
    );
}

/// F010: A global iteration count overrides per-test repeat
///
/// # Falsification Attempt
/// Set `iterations` in the suite config and count results.
#[test]
fn f010_iterations_override() {
    let report = isolated_suite("f010", &ScriptedThreadLister::new(), "1")
        .config(SuiteConfig {
            seed: Some("1".into()),
            iterations: Some(3),
            ..SuiteConfig::default()
        })
        .test_with("a", TestConfig::new().repeat(10), |_| Ok(()))
        .test("b", |_| Ok(()))
        .build()
        .run()
        .unwrap();
    assert_eq!(
        report.summary().total,
        6,
        "F010 FALSIFIED: iterations override ignored"
    );
}
