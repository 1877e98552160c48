//! Demo suite: seeded draws, repetition, a random locale, assumptions and a
//! filtered background thread.
//!
//! Run with:
//! ```bash
//! cargo run --example suite
//! TESTS_SEED=0xDEADBEEF TESTS_LOCALE=fr-FR cargo run --example suite
//! cargo run --example suite -- --json
//! ```

use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use randomized::prelude::*;
use randomized::test::logging;

/// First draw of a stream seeded with 12345.
const GOLDEN_12345: i32 = 1553932502;

fn main() -> Result<ExitCode, HarnessError> {
    logging::init();

    let json = std::env::args().any(|a| a == "--json");

    let report = Suite::builder("randomized-demo")
        .config(SuiteConfig::from_env()?)
        .filter(NameFilter::new("friendly-zombie"))
        .test("random00", |_| {
            let num = RandomStream::from_entropy().next_i32();
            tracing::info!(num, "drew from an entropy-seeded stream");
            check(num != GOLDEN_12345, format!("entropy stream drew the golden value {num}"))
        })
        .test("randomWithSeed01", |_| {
            let num = RandomStream::new(SeedValue::new(12345)).next_i32();
            tracing::info!(num, "drew from a stream seeded with 12345");
            check(num == GOLDEN_12345, format!("expected {GOLDEN_12345}, got {num}"))
        })
        .test("randomInteger02", |ctx| {
            let num = ctx.random_int();
            tracing::info!(num, seed = %ctx.seed(), "drew from the test stream");
            check(num != GOLDEN_12345, format!("derived seed drew the golden value {num}"))
        })
        .test_with(
            "randomIntegerWithSeed03",
            TestConfig::new().seed(SeedValue::new(12345)),
            |ctx| {
                let num = ctx.random_int();
                tracing::info!(num, "drew from the pinned test stream");
                check(num == GOLDEN_12345, format!("expected {GOLDEN_12345}, got {num}"))
            },
        )
        .test_with("randomIntegerWithRange04", TestConfig::new().repeat(5), |ctx| {
            let num = ctx.random_int_between(0, 10)?;
            tracing::info!(num, iteration = ctx.iteration(), "drew from [0, 10]");
            check((0..=10).contains(&num), format!("{num} is outside [0, 10]"))
        })
        .test("randomLocale10", |ctx| {
            tracing::info!(
                locale = %ctx.locale(),
                language = ctx.locale().language(),
                region = ctx.locale().region().unwrap_or("-"),
                "suite locale"
            );
            Ok(())
        })
        .test("ignoreIfUseless20", |ctx| {
            let b = ctx.random_bool();
            tracing::info!(b, "drew a boolean");
            ctx.assume(b, "random boolean was false")?;
            check(b, "assumption let a false boolean through")
        })
        .test("stopOrIdentifyYourThreads30", |_| {
            tracing::info!("starting a new thread");
            thread::Builder::new()
                .name("friendly-zombie".into())
                .spawn(linger)
                .map_err(|e| TestError::assertion(format!("failed to spawn thread: {e}")))?;
            Ok(())
        })
        .build()
        .run()?;

    if json {
        println!("{}", report.to_json()?);
    } else {
        for result in &report.results {
            println!(
                "{:<28} #{:<2} seed={:<21} {:?}",
                result.name, result.iteration, result.seed, result.outcome
            );
        }
        println!("{}", report.summary());
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Body of the friendly zombie: never returns.
fn linger() {
    loop {
        thread::sleep(Duration::from_secs(1));
    }
}

fn check(condition: bool, message: impl Into<String>) -> Result<(), TestError> {
    if condition {
        Ok(())
    } else {
        Err(TestError::assertion(message))
    }
}
