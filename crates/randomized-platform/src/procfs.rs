//! Thread enumeration via the /proc filesystem.
//!
//! # Implementation
//!
//! Each directory under `/proc/self/task` is one thread of this process:
//! - `/proc/self/task/{tid}/comm` - thread name
//! - `/proc/self/task/{tid}/stat` - field 22 is the start time in clock ticks
//!
//! Threads can exit while the directory is walked; entries that disappear
//! between listing and reading are skipped.

use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use crate::error::{PlatformError, Result};
use crate::thread::{ThreadId, ThreadLister, ThreadRecord};

/// Default task directory of the current process.
pub const SELF_TASK_DIR: &str = "/proc/self/task";

/// [`ThreadLister`] backed by a procfs task directory.
#[derive(Debug, Clone)]
pub struct ProcThreadLister {
    task_dir: PathBuf,
}

impl ProcThreadLister {
    /// Lists the threads of the current process.
    #[must_use]
    pub fn new() -> Self {
        Self::with_task_dir(SELF_TASK_DIR)
    }

    /// Lists threads from another task directory (e.g. `/proc/{pid}/task`).
    #[must_use]
    pub fn with_task_dir(task_dir: impl Into<PathBuf>) -> Self {
        Self {
            task_dir: task_dir.into(),
        }
    }

    /// Returns the task directory being read.
    #[must_use]
    pub fn task_dir(&self) -> &Path {
        &self.task_dir
    }

    fn read_thread(&self, tid: u64) -> Result<Option<ThreadRecord>> {
        let dir = self.task_dir.join(tid.to_string());

        let name = match read_optional(&dir.join("comm"))? {
            Some(comm) => comm.trim_end_matches('\n').to_string(),
            None => return Ok(None),
        };

        let stat_path = dir.join("stat");
        let start_ticks = match read_optional(&stat_path)? {
            Some(stat) => parse_start_ticks(&stat)
                .map_err(|reason| PlatformError::parse(stat_path.display().to_string(), reason))?,
            None => return Ok(None),
        };

        Ok(Some(ThreadRecord::new(ThreadId::new(tid, start_ticks), name)))
    }
}

impl Default for ProcThreadLister {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreadLister for ProcThreadLister {
    fn list_live_threads(&self) -> Result<Vec<ThreadRecord>> {
        let entries = std::fs::read_dir(&self.task_dir).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                PlatformError::unsupported(format!("{} does not exist", self.task_dir.display()))
            } else {
                PlatformError::Io(e)
            }
        })?;

        let mut threads = Vec::new();
        for entry in entries {
            let entry = entry?;
            let Some(tid) = entry
                .file_name()
                .to_str()
                .and_then(|name| name.parse::<u64>().ok())
            else {
                continue;
            };

            if let Some(record) = self.read_thread(tid)? {
                threads.push(record);
            }
        }

        threads.sort_by_key(|record| record.id);
        tracing::trace!(count = threads.len(), dir = %self.task_dir.display(), "listed threads");
        Ok(threads)
    }
}

/// Reads a file, mapping "thread already gone" to `None`.
fn read_optional(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound || thread_exited(&e) => Ok(None),
        Err(e) => Err(PlatformError::Io(e)),
    }
}

/// Reading a task file of a thread that exited after the directory was
/// listed fails with `ESRCH`.
#[cfg(unix)]
fn thread_exited(e: &io::Error) -> bool {
    e.raw_os_error() == Some(libc::ESRCH)
}

#[cfg(not(unix))]
fn thread_exited(_: &io::Error) -> bool {
    false
}

/// Extracts the start time (field 22) from a `stat` line.
///
/// The command name (field 2) is wrapped in parentheses and may itself
/// contain spaces or parentheses, so fields are counted from the last `)`.
fn parse_start_ticks(stat: &str) -> std::result::Result<u64, String> {
    let close = stat
        .rfind(')')
        .ok_or_else(|| "missing ')' after command name".to_string())?;
    // Fields after the command name start at field 3 (state).
    let field = stat[close + 1..]
        .split_whitespace()
        .nth(22 - 3)
        .ok_or_else(|| "too few fields".to_string())?;
    field
        .parse::<u64>()
        .map_err(|e| format!("bad starttime {field:?}: {e}"))
}
