use std::sync::{Mutex, MutexGuard, PoisonError};

/// The addressable location's query component (without the leading `?`).
pub trait LocationStore: Send + Sync {
    fn query(&self) -> String;
    fn replace_query(&self, query: &str);
}

#[derive(Default)]
struct Entry {
    current: String,
    writes: u64,
}

/// In-process location: the current query plus a count of replacements.
#[derive(Default)]
pub struct MemoryLocation {
    entry: Mutex<Entry>,
}

impl MemoryLocation {
    pub fn new(initial: impl Into<String>) -> Self {
        let initial = initial.into();
        let current = initial.strip_prefix('?').unwrap_or(&initial).to_string();
        Self {
            entry: Mutex::new(Entry { current, writes: 0 }),
        }
    }

    /// Number of `replace_query` calls so far.
    pub fn writes(&self) -> u64 {
        self.entry().writes
    }

    fn entry(&self) -> MutexGuard<'_, Entry> {
        self.entry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LocationStore for MemoryLocation {
    fn query(&self) -> String {
        self.entry().current.clone()
    }

    fn replace_query(&self, query: &str) {
        let mut entry = self.entry();
        entry.current.clear();
        entry.current.push_str(query);
        entry.writes += 1;
    }
}
