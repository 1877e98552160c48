//! Thread filters.
//!
//! A filter names threads that are allowed to outlive a test, such as
//! intentional long-lived background workers ("friendly zombies"). A surviving
//! thread is excused if any registered filter accepts it.

use randomized_core::FilterSpec;
use randomized_platform::ThreadRecord;

/// Longest thread name Linux reports (`TASK_COMM_LEN` - 1).
pub const OS_THREAD_NAME_MAX: usize = 15;

/// Predicate deciding whether a surviving thread is an intentional exception.
pub trait ThreadFilter: Send + Sync {
    /// Human-readable description, used in logs.
    fn name(&self) -> &str;

    /// Returns true if `thread` may outlive the test.
    fn accepts(&self, thread: &ThreadRecord) -> bool;
}

/// Accepts threads whose name equals a target.
///
/// Linux truncates thread names to [`OS_THREAD_NAME_MAX`] bytes, so a thread
/// started with the full target name is also recognized by its truncated form.
///
/// For targets longer than [`OS_THREAD_NAME_MAX`] bytes this is not an exact
/// match: the OS reports the same name for every thread whose name shares the
/// first 15 bytes, so `NameFilter::new("background-compactor")` also excuses a
/// thread started as `"background-comp"` or `"background-compressor"`. Keep
/// filtered names within 15 bytes when the distinction matters.
#[derive(Debug, Clone)]
pub struct NameFilter {
    label: String,
    target: String,
    visible: String,
}

impl NameFilter {
    /// Creates a filter for threads named `target`.
    #[must_use]
    pub fn new(target: impl Into<String>) -> Self {
        let target = target.into();
        Self {
            label: format!("name == {target:?}"),
            visible: truncate_to_boundary(&target, OS_THREAD_NAME_MAX).to_string(),
            target,
        }
    }
}

impl ThreadFilter for NameFilter {
    fn name(&self) -> &str {
        &self.label
    }

    fn accepts(&self, thread: &ThreadRecord) -> bool {
        thread.name == self.target || thread.name == self.visible
    }
}

/// Accepts threads whose name starts with a prefix.
#[derive(Debug, Clone)]
pub struct PrefixFilter {
    label: String,
    prefix: String,
}

impl PrefixFilter {
    /// Creates a filter for threads named `prefix*`.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            label: format!("name starts with {prefix:?}"),
            prefix,
        }
    }
}

impl ThreadFilter for PrefixFilter {
    fn name(&self) -> &str {
        &self.label
    }

    fn accepts(&self, thread: &ThreadRecord) -> bool {
        thread.name.starts_with(&self.prefix)
    }
}

/// Filter backed by an arbitrary closure.
pub struct FnFilter<F> {
    label: String,
    predicate: F,
}

impl<F> FnFilter<F>
where
    F: Fn(&ThreadRecord) -> bool + Send + Sync,
{
    /// Creates a named predicate filter.
    pub fn new(label: impl Into<String>, predicate: F) -> Self {
        Self {
            label: label.into(),
            predicate,
        }
    }
}

impl<F> ThreadFilter for FnFilter<F>
where
    F: Fn(&ThreadRecord) -> bool + Send + Sync,
{
    fn name(&self) -> &str {
        &self.label
    }

    fn accepts(&self, thread: &ThreadRecord) -> bool {
        (self.predicate)(thread)
    }
}

impl<F> std::fmt::Debug for FnFilter<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnFilter").field("label", &self.label).finish()
    }
}

/// Builds the filter described by a configuration entry.
#[must_use]
pub fn from_spec(spec: &FilterSpec) -> Box<dyn ThreadFilter> {
    match spec {
        FilterSpec::Name(name) => Box::new(NameFilter::new(name.clone())),
        FilterSpec::Prefix(prefix) => Box::new(PrefixFilter::new(prefix.clone())),
    }
}

fn truncate_to_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
