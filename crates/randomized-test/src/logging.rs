//! Log output setup.
//!
//! Suite and test lifecycle events, seeds and leaked threads are emitted as
//! `tracing` events. Installing a subscriber is the caller's choice; these
//! helpers install the usual `fmt` one.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Installs a `fmt` subscriber filtered by `RUST_LOG` (default `info`).
///
/// Safe to call multiple times; only the first call has an effect, and an
/// already installed global subscriber is left alone.
pub fn init() {
    init_with_level(tracing::Level::INFO);
}

/// Like [`init`], with `level` as the default directive.
pub fn init_with_level(level: tracing::Level) {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
            .with_target(true)
            .with_thread_names(true)
            .try_init();
    });
}

/// Installs a subscriber that writes through the test harness capture.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()))
            .with_test_writer()
            .with_ansi(false)
            .try_init();
    });
}
