//! Thread identity and the enumeration capability.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::error::Result;

/// Identity of a live OS thread.
///
/// The start time disambiguates recycled OS thread ids: a new thread that
/// reuses the id of one that has exited is still a different thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ThreadId {
    /// Kernel thread id.
    pub tid: u64,
    /// Start time in clock ticks since boot (0 when unknown).
    pub start_ticks: u64,
}

impl ThreadId {
    /// Creates a thread id.
    #[must_use]
    pub const fn new(tid: u64, start_ticks: u64) -> Self {
        Self { tid, start_ticks }
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tid)
    }
}

/// A thread live at the time it was listed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ThreadRecord {
    /// Thread identity.
    pub id: ThreadId,
    /// Thread name as reported by the OS (Linux truncates to 15 bytes).
    pub name: String,
}

impl ThreadRecord {
    /// Creates a record.
    #[must_use]
    pub fn new(id: ThreadId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl fmt::Display for ThreadRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (tid {})", self.name, self.id)
    }
}

/// Set of thread ids captured at one instant.
pub type ThreadSnapshot = BTreeSet<ThreadId>;

/// Capability to enumerate the threads of the current process.
pub trait ThreadLister: Send + Sync {
    /// Lists every thread currently alive in this process.
    ///
    /// # Errors
    /// Returns [`crate::PlatformError::Unsupported`] when the platform offers no
    /// enumeration, or an I/O/parse error when it fails.
    fn list_live_threads(&self) -> Result<Vec<ThreadRecord>>;

    /// Captures the ids of all live threads.
    ///
    /// # Errors
    /// Propagates [`Self::list_live_threads`] failures.
    fn snapshot(&self) -> Result<ThreadSnapshot> {
        Ok(self
            .list_live_threads()?
            .into_iter()
            .map(|record| record.id)
            .collect())
    }
}
