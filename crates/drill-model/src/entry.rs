//! Scope entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Filters, ScopeLevel};

/// Filter-less scope descriptor.
///
/// This is what hosts hand in (root descriptor, push intents) and what the
/// query codec decodes out of a drill token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopeRef {
    pub level: ScopeLevel,
    pub id: String,
    pub label: String,
}

impl ScopeRef {
    pub fn new(level: ScopeLevel, id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            level,
            id: id.into(),
            label: label.into(),
        }
    }

    /// Attach filters, stamping the entry with the current time.
    pub fn enter(self, filters: Filters) -> ScopeEntry {
        ScopeEntry {
            level: self.level,
            id: self.id,
            label: self.label,
            filters,
            entered_at: Utc::now(),
        }
    }
}

/// One frame of the drill stack.
///
/// Equality uses `level` and `id` only. `label` is display text and
/// `entered_at` is bookkeeping; `filters` are compared separately by callers
/// that care about them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeEntry {
    pub level: ScopeLevel,
    pub id: String,
    pub label: String,
    /// Filters that were active while this entry was the top of the stack.
    pub filters: Filters,
    pub entered_at: DateTime<Utc>,
}

impl ScopeEntry {
    /// Strip filters and timestamp.
    pub fn scope_ref(&self) -> ScopeRef {
        ScopeRef::new(self.level, self.id.clone(), self.label.clone())
    }
}

impl PartialEq for ScopeEntry {
    fn eq(&self, other: &Self) -> bool {
        self.level == other.level && self.id == other.id
    }
}

impl Eq for ScopeEntry {}
