//! Falsification tests: suite locale (F040-F045)

use std::sync::{Arc, Barrier};
use std::thread;

use parking_lot::Mutex;

use randomized_core::locale::AVAILABLE_LOCALES;
use randomized_core::{Locale, LocaleRegistry, SuiteConfig};
use randomized_platform::ScriptedThreadLister;
use randomized_test::{Suite, TestError};

fn suite_with_locale(
    name: &str,
    locale: &str,
    registry: &Arc<LocaleRegistry>,
) -> randomized_test::SuiteBuilder {
    Suite::builder(name)
        .config(SuiteConfig {
            seed: Some("2024".into()),
            locale: locale.into(),
            ..SuiteConfig::default()
        })
        .thread_lister(Arc::new(ScriptedThreadLister::new()))
        .locale_registry(Arc::clone(registry))
}

/// F040: An explicit locale is installed exactly, then restored
///
/// # Falsification Attempt
/// Configure "en-US" over a "de-DE" default, observe it from inside a test
/// that fails, and check the default afterwards.
#[test]
fn f040_explicit_locale_installed_and_restored() {
    let registry = Arc::new(LocaleRegistry::new(Locale::parse("de-DE").unwrap()));
    let observed = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&observed);
    let reader = Arc::clone(&registry);

    let report = suite_with_locale("f040", "en-US", &registry)
        .test("fails", move |_| {
            *sink.lock() = Some(reader.current());
            Err(TestError::assertion("deliberate failure"))
        })
        .build()
        .run()
        .unwrap();

    assert_eq!(report.locale.to_string(), "en-US");
    assert_eq!(
        observed.lock().as_ref().map(ToString::to_string),
        Some("en-US".to_string()),
        "F040 FALSIFIED: locale not installed during the suite"
    );
    assert_eq!(
        registry.current().to_string(),
        "de-DE",
        "F040 FALSIFIED: prior default not restored after a failing suite"
    );
}

/// F041: The default is restored even when a test panics
///
/// # Falsification Attempt
/// Panic inside the only test of the suite.
#[test]
fn f041_restored_after_panic() {
    let registry = Arc::new(LocaleRegistry::new(Locale::parse("ja-JP").unwrap()));
    let report = suite_with_locale("f041", "fr-FR", &registry)
        .test("panics", |_| panic!("deliberate panic"))
        .build()
        .run()
        .unwrap();

    assert_eq!(report.summary().failed, 1);
    assert_eq!(
        registry.current().to_string(),
        "ja-JP",
        "F041 FALSIFIED: panic left the override installed"
    );
}

/// F042: A random locale is drawn from the available table
///
/// # Falsification Attempt
/// Resolve "random" under several master seeds.
#[test]
fn f042_random_locale_available() {
    for seed in ["1", "2", "3", "-99", "0x7f"] {
        let registry = Arc::new(LocaleRegistry::new(Locale::fallback()));
        let report = suite_with_locale("f042", "random", &registry)
            .config(SuiteConfig {
                seed: Some(seed.into()),
                ..SuiteConfig::default()
            })
            .build()
            .run()
            .unwrap();
        let tag = report.locale.to_string();
        assert!(
            AVAILABLE_LOCALES.contains(&tag.as_str()),
            "F042 FALSIFIED: {tag} is not an available locale"
        );
    }
}

/// F043: The random locale is reproducible from the master seed
///
/// # Falsification Attempt
/// Run twice with the same master seed and compare locales.
#[test]
fn f043_random_locale_reproducible() {
    let resolve = || {
        let registry = Arc::new(LocaleRegistry::new(Locale::fallback()));
        suite_with_locale("f043", "random", &registry)
            .build()
            .run()
            .unwrap()
            .locale
    };
    assert_eq!(resolve(), resolve(), "F043 FALSIFIED: locale not reproducible");
}

/// F044: Unparseable locale tags fail setup and leave the default alone
///
/// # Falsification Attempt
/// Configure a malformed tag.
#[test]
fn f044_malformed_locale() {
    let registry = Arc::new(LocaleRegistry::new(Locale::parse("it-IT").unwrap()));
    let err = suite_with_locale("f044", "en_US!!", &registry)
        .test("never", |_| Err(TestError::assertion("must not run")))
        .build()
        .run()
        .unwrap_err();

    assert!(err.is_configuration(), "F044 FALSIFIED: not a configuration error");
    assert_eq!(registry.current().to_string(), "it-IT");
}

/// F045: Parallel suites on one registry restore the prior default
///
/// # Falsification Attempt
/// Start a second suite while a first one is running on the same registry,
/// let the first finish while the second is still inside its test, then
/// check both the second suite's view and the final default.
#[test]
fn f045_parallel_suites_restore_default() {
    let registry = Arc::new(LocaleRegistry::new(Locale::parse("de-DE").unwrap()));
    let first_running = Arc::new(Barrier::new(2));
    let second_running = Arc::new(Barrier::new(2));
    let first_done = Arc::new(Barrier::new(2));

    let first = {
        let registry = Arc::clone(&registry);
        let first_running = Arc::clone(&first_running);
        let second_running = Arc::clone(&second_running);
        let first_done = Arc::clone(&first_done);
        thread::spawn(move || {
            let report = suite_with_locale("f045-first", "en-US", &registry)
                .test("waits-for-second", move |_| {
                    first_running.wait();
                    second_running.wait();
                    Ok(())
                })
                .build()
                .run()
                .unwrap();
            first_done.wait();
            report
        })
    };

    first_running.wait();

    let second = {
        let registry = Arc::clone(&registry);
        let reader = Arc::clone(&registry);
        thread::spawn(move || {
            suite_with_locale("f045-second", "fr-FR", &registry)
                .test("outlives-first", move |_| {
                    second_running.wait();
                    first_done.wait();
                    let current = reader.current().to_string();
                    if current == "fr-FR" {
                        Ok(())
                    } else {
                        Err(TestError::assertion(format!("default switched to {current}")))
                    }
                })
                .build()
                .run()
                .unwrap()
        })
    };

    assert!(first.join().unwrap().is_success());
    assert!(
        second.join().unwrap().is_success(),
        "F045 FALSIFIED: a finishing suite clobbered a running suite's locale"
    );
    assert_eq!(
        registry.current().to_string(),
        "de-DE",
        "F045 FALSIFIED: prior default not restored after parallel suites"
    );
}
