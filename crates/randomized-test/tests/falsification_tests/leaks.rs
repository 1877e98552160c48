//! Falsification tests: thread-leak detection (F020-F031)

use std::sync::Arc;

use randomized_core::{FilterSpec, LeakScope, SuiteConfig, TestConfig};
use randomized_platform::{ScriptedThreadLister, ThreadRecord};
use randomized_test::{
    FailureKind, FnFilter, LeakDetector, LeakStatus, NameFilter, PrefixFilter, TestError,
};

use super::isolated_suite;

fn scripted_detector(lister: &ScriptedThreadLister) -> LeakDetector {
    LeakDetector::new(Arc::new(lister.clone()))
}

/// F020: A filtered friendly zombie is never reported
///
/// # Falsification Attempt
/// Start a "friendly-zombie" during a test and never stop it.
#[test]
fn f020_friendly_zombie_filtered() {
    let lister = ScriptedThreadLister::new();
    lister.start("main");
    let detector = scripted_detector(&lister).with_filter(NameFilter::new("friendly-zombie"));

    let before = detector.snapshot_threads_before().unwrap();
    lister.start("friendly-zombie");

    assert!(
        detector.detect_leaks(&before).unwrap().is_empty(),
        "F020 FALSIFIED: filtered thread reported as leak"
    );
}

/// F021: An unfiltered survivor is reported exactly once
///
/// # Falsification Attempt
/// Start a "rogue" thread and check the leak list.
#[test]
fn f021_rogue_reported() {
    let lister = ScriptedThreadLister::new();
    let detector = scripted_detector(&lister).with_filter(NameFilter::new("friendly-zombie"));

    let before = detector.snapshot_threads_before().unwrap();
    let rogue = lister.start("rogue");

    let leaked = detector.detect_leaks(&before).unwrap();
    assert_eq!(
        leaked,
        vec![ThreadRecord::new(rogue, "rogue")],
        "F021 FALSIFIED: rogue thread not reported exactly once"
    );
}

/// F022: Detection is idempotent
///
/// # Falsification Attempt
/// Detect twice with the same snapshot and no thread activity in between.
#[test]
fn f022_detection_idempotent() {
    let lister = ScriptedThreadLister::new();
    let detector = scripted_detector(&lister);
    let before = detector.snapshot_threads_before().unwrap();
    lister.start("rogue");
    lister.start("pool-1");

    assert_eq!(
        detector.detect_leaks(&before).unwrap(),
        detector.detect_leaks(&before).unwrap(),
        "F022 FALSIFIED: repeated detection disagreed"
    );
}

/// F023: Threads that finished are not leaks
///
/// # Falsification Attempt
/// Start and stop a worker inside the window.
#[test]
fn f023_joined_thread_not_leak() {
    let lister = ScriptedThreadLister::new();
    let detector = scripted_detector(&lister);
    let before = detector.snapshot_threads_before().unwrap();
    let worker = lister.start("worker");
    assert!(lister.stop(worker));
    assert_eq!(
        detector.check(&before),
        LeakStatus::Clean,
        "F023 FALSIFIED: stopped thread reported"
    );
}

/// F024: Arbitrary predicates are supported
///
/// # Falsification Attempt
/// Excuse threads via a prefix filter and a closure filter together.
#[test]
fn f024_arbitrary_predicates() {
    let lister = ScriptedThreadLister::new();
    let detector = scripted_detector(&lister)
        .with_filter(PrefixFilter::new("pool-"))
        .with_filter(FnFilter::new("name ends with -daemon", |t: &ThreadRecord| {
            t.name.ends_with("-daemon")
        }));
    let before = detector.snapshot_threads_before().unwrap();
    lister.start("pool-7");
    lister.start("gc-daemon");
    lister.start("rogue");

    let names: Vec<String> = detector
        .detect_leaks(&before)
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, vec!["rogue"], "F024 FALSIFIED: predicate filters ignored");
}

/// F025: A leak fails its own test only
///
/// # Falsification Attempt
/// Leak in one test and check the siblings before and after it.
#[test]
fn f025_leak_is_local() {
    let lister = ScriptedThreadLister::new();
    let spawner = lister.clone();
    let report = isolated_suite("f025", &lister, "5")
        .test("before", |_| Ok(()))
        .test("leaky", move |_| {
            spawner.start("rogue");
            Ok(())
        })
        .test("after", |_| Ok(()))
        .build()
        .run()
        .unwrap();

    let outcomes: Vec<(&str, bool)> = report
        .results
        .iter()
        .map(|r| (r.name.as_str(), r.failed()))
        .collect();
    assert_eq!(
        outcomes,
        vec![("before", false), ("leaky", true), ("after", false)],
        "F025 FALSIFIED: leak failure spread to siblings"
    );
    let leaky = report.results_for("leaky").next().unwrap();
    assert_eq!(leaky.failures()[0].kind, FailureKind::ThreadLeak);
    assert!(leaky.failures()[0].message.contains("rogue"));
}

/// F026: Every repeated iteration that leaks is reported
///
/// # Falsification Attempt
/// Leak one new thread per iteration.
#[test]
fn f026_each_iteration_checked() {
    let lister = ScriptedThreadLister::new();
    let spawner = lister.clone();
    let report = isolated_suite("f026", &lister, "5")
        .test_with("leaky", TestConfig::new().repeat(3), move |ctx| {
            spawner.start(format!("rogue-{}", ctx.iteration()));
            Ok(())
        })
        .build()
        .run()
        .unwrap();

    let leaked: Vec<Vec<String>> = report.results.iter().map(|r| r.leaks.thread_names()).collect();
    assert_eq!(
        leaked,
        vec![vec!["rogue-0"], vec!["rogue-1"], vec!["rogue-2"]],
        "F026 FALSIFIED: leaks double-reported or missed"
    );
}

/// F027: Configured filters compile to working predicates
///
/// # Falsification Attempt
/// Declare name and prefix filters in the suite config only.
#[test]
fn f027_configured_filters() {
    let lister = ScriptedThreadLister::new();
    let spawner = lister.clone();
    let report = isolated_suite("f027", &lister, "5")
        .config(SuiteConfig {
            seed: Some("5".into()),
            thread_filters: vec![
                FilterSpec::Name("friendly-zombie".into()),
                FilterSpec::Prefix("pool-".into()),
            ],
            ..SuiteConfig::default()
        })
        .test("spawns", move |_| {
            spawner.start("friendly-zombie");
            spawner.start("pool-3");
            Ok(())
        })
        .build()
        .run()
        .unwrap();
    assert!(report.is_success(), "F027 FALSIFIED: configured filters ignored");
}

/// F028: Suite scope reports once, on the suite
///
/// # Falsification Attempt
/// Leak under `LeakScope::Suite` and look for the report.
#[test]
fn f028_suite_scope() {
    let lister = ScriptedThreadLister::new();
    let spawner = lister.clone();
    let report = isolated_suite("f028", &lister, "5")
        .config(SuiteConfig {
            seed: Some("5".into()),
            leak_scope: LeakScope::Suite,
            ..SuiteConfig::default()
        })
        .test("leaky", move |_| {
            spawner.start("rogue");
            Ok(())
        })
        .build()
        .run()
        .unwrap();

    assert!(report.results[0].passed());
    assert_eq!(
        report.suite_leaks.thread_names(),
        vec!["rogue"],
        "F028 FALSIFIED: suite-scope leak not on the suite report"
    );
    assert!(!report.is_success());
}

/// F029: Disabled scope never looks at threads
///
/// # Falsification Attempt
/// Run with `LeakScope::None` and count lister calls.
#[test]
fn f029_scope_none() {
    let lister = ScriptedThreadLister::new();
    let spawner = lister.clone();
    let report = isolated_suite("f029", &lister, "5")
        .config(SuiteConfig {
            seed: Some("5".into()),
            leak_scope: LeakScope::None,
            ..SuiteConfig::default()
        })
        .test("leaky", move |_| {
            spawner.start("rogue");
            Ok(())
        })
        .build()
        .run()
        .unwrap();

    assert!(report.is_success());
    assert_eq!(lister.calls(), 0, "F029 FALSIFIED: lister consulted with detection disabled");
}

/// F030: Missing thread enumeration degrades to unchecked
///
/// # Falsification Attempt
/// Run on a platform without enumeration.
#[test]
fn f030_unsupported_platform() {
    let report = isolated_suite("f030", &ScriptedThreadLister::unsupported(), "5")
        .test("body", |_| Ok(()))
        .build()
        .run()
        .unwrap();
    assert!(report.results[0].passed());
    assert!(
        matches!(report.results[0].leaks, LeakStatus::Unchecked(_)),
        "F030 FALSIFIED: unsupported platform not marked unchecked"
    );
}

/// F031: A test failing and leaking reports both
///
/// # Falsification Attempt
/// Return an assertion error after leaking a thread.
#[test]
fn f031_assertion_and_leak() {
    let lister = ScriptedThreadLister::new();
    let spawner = lister.clone();
    let report = isolated_suite("f031", &lister, "5")
        .test("both", move |_| {
            spawner.start("rogue");
            Err(TestError::assertion("expected 5, got 10"))
        })
        .build()
        .run()
        .unwrap();

    let kinds: Vec<FailureKind> = report.results[0].failures().iter().map(|f| f.kind).collect();
    assert_eq!(
        kinds,
        vec![FailureKind::Assertion, FailureKind::ThreadLeak],
        "F031 FALSIFIED: one of the failures was dropped"
    );
}
