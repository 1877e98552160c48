//! In-memory thread lister.
//!
//! Lets callers drive leak detection with a fixed, mutable set of threads
//! instead of the real process, so detector logic can be tested without
//! spawning anything.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::error::{PlatformError, Result};
use crate::thread::{ThreadId, ThreadLister, ThreadRecord};

/// [`ThreadLister`] over a scripted set of threads.
///
/// Clones share the same thread set, so a test can hand one clone to a
/// harness and keep another to simulate threads starting and stopping.
#[derive(Debug, Clone, Default)]
pub struct ScriptedThreadLister {
    state: Arc<ScriptedState>,
}

#[derive(Debug, Default)]
struct ScriptedState {
    threads: Mutex<Vec<ThreadRecord>>,
    next_tid: AtomicU64,
    unsupported: AtomicBool,
    calls: AtomicU64,
}

impl ScriptedThreadLister {
    /// Creates an empty lister.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a lister that reports enumeration as unsupported.
    #[must_use]
    pub fn unsupported() -> Self {
        let lister = Self::new();
        lister.state.unsupported.store(true, Ordering::SeqCst);
        lister
    }

    /// Adds a live thread and returns its id.
    pub fn start(&self, name: impl Into<String>) -> ThreadId {
        let tid = self.state.next_tid.fetch_add(1, Ordering::SeqCst) + 1;
        let id = ThreadId::new(tid, 0);
        self.state.threads.lock().push(ThreadRecord::new(id, name));
        id
    }

    /// Removes a thread. Returns false if it was not live.
    pub fn stop(&self, id: ThreadId) -> bool {
        let mut threads = self.state.threads.lock();
        let before = threads.len();
        threads.retain(|record| record.id != id);
        threads.len() != before
    }

    /// Removes every thread with the given name.
    pub fn stop_named(&self, name: &str) -> usize {
        let mut threads = self.state.threads.lock();
        let before = threads.len();
        threads.retain(|record| record.name != name);
        before - threads.len()
    }

    /// Number of times the thread set was listed.
    #[must_use]
    pub fn calls(&self) -> u64 {
        self.state.calls.load(Ordering::SeqCst)
    }
}

impl ThreadLister for ScriptedThreadLister {
    fn list_live_threads(&self) -> Result<Vec<ThreadRecord>> {
        self.state.calls.fetch_add(1, Ordering::SeqCst);
        if self.state.unsupported.load(Ordering::SeqCst) {
            return Err(PlatformError::unsupported("scripted lister"));
        }
        Ok(self.state.threads.lock().clone())
    }
}
