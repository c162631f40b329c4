//! Diagnostics journal
//!
//! Degraded behaviour (empty candidate lists, fields left open after a
//! rejected save) is invisible to the user by design. The journal keeps it
//! observable for embedding UIs and tests. Oldest entries are dropped once
//! the capacity is reached.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Default number of retained entries
const DEFAULT_CAPACITY: usize = 256;

/// Kind of degraded behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Autocomplete search failed; candidates were emptied
    SearchFailure,
    /// Partial update failed; field stayed open
    PatchFailure,
}

/// One journal entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticEntry {
    /// When it happened
    pub at: DateTime<Utc>,
    /// What happened
    pub kind: DiagnosticKind,
    /// Field it happened on
    pub field: String,
    /// Error detail
    pub message: String,
}

/// Shared, bounded journal of degraded behaviour
#[derive(Debug, Clone)]
pub struct DiagnosticLog {
    inner: Arc<Mutex<VecDeque<DiagnosticEntry>>>,
    capacity: usize,
}

impl DiagnosticLog {
    /// Create journal with the default capacity
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create journal keeping at most `capacity` entries
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)))),
            capacity: capacity.max(1),
        }
    }

    /// Append an entry
    pub fn record(&self, kind: DiagnosticKind, field: &str, message: impl Into<String>) {
        let mut entries = self.inner.lock();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(DiagnosticEntry {
            at: Utc::now(),
            kind,
            field: field.to_string(),
            message: message.into(),
        });
    }

    /// Snapshot of all entries, oldest first
    #[must_use]
    pub fn entries(&self) -> Vec<DiagnosticEntry> {
        self.inner.lock().iter().cloned().collect()
    }

    /// Entries of one kind
    #[must_use]
    pub fn of_kind(&self, kind: DiagnosticKind) -> Vec<DiagnosticEntry> {
        self.inner
            .lock()
            .iter()
            .filter(|e| e.kind == kind)
            .cloned()
            .collect()
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Drop all entries
    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

impl Default for DiagnosticLog {
    fn default() -> Self {
        Self::new()
    }
}
