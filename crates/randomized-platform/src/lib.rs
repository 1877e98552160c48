// Allow unwrap/expect/panic in tests for clear failure messages
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # randomized-platform
//!
//! Enumeration of the live threads of the current process, isolated behind
//! the [`ThreadLister`] capability so that leak detection stays pure.
//!
//! - **Linux**: [`ProcThreadLister`] reads `/proc/self/task`
//! - **Other platforms**: [`native_lister`] returns a lister that reports
//!   [`PlatformError::Unsupported`]
//! - **Tests**: [`ScriptedThreadLister`] holds a mutable in-memory thread set
//!
//! ## Example
//!
//! ```rust,no_run
//! use randomized_platform::{ThreadLister, native_lister};
//!
//! let lister = native_lister();
//! for thread in lister.list_live_threads()? {
//!     println!("{thread}");
//! }
//! # Ok::<(), randomized_platform::PlatformError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod procfs;
pub mod scripted;
pub mod thread;

use std::sync::Arc;

pub use error::{PlatformError, Result};
pub use procfs::ProcThreadLister;
pub use scripted::ScriptedThreadLister;
pub use thread::{ThreadId, ThreadLister, ThreadRecord, ThreadSnapshot};

/// Lister used when enumeration is not available.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedLister;

impl ThreadLister for UnsupportedLister {
    fn list_live_threads(&self) -> Result<Vec<ThreadRecord>> {
        Err(PlatformError::unsupported(format!(
            "thread enumeration on {}",
            std::env::consts::OS
        )))
    }
}

/// Returns the best thread lister for the current platform.
#[must_use]
pub fn native_lister() -> Arc<dyn ThreadLister> {
    #[cfg(target_os = "linux")]
    {
        Arc::new(ProcThreadLister::new())
    }

    #[cfg(not(target_os = "linux"))]
    {
        Arc::new(UnsupportedLister)
    }
}
