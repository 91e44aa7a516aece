//! The drill stack and its canonicalization rule.
//!
//! A [`NavigationStack`] is never empty, starts with the fixed root, and its
//! levels strictly increase from bottom to top. Every constructor and
//! transition goes through [`canonicalize`], so no other shape can be built.

use serde::Serialize;
use tracing::trace;

use crate::{FilterPatch, Filters, ScopeEntry, ScopeLevel, ScopeRef};

/// Anything that sits at a scope level.
pub trait Leveled {
    fn level(&self) -> ScopeLevel;
}

impl Leveled for ScopeEntry {
    fn level(&self) -> ScopeLevel {
        self.level
    }
}

impl Leveled for ScopeRef {
    fn level(&self) -> ScopeLevel {
        self.level
    }
}

/// Reduce an arbitrary ordered list to a strictly increasing-by-level list.
///
/// Entering an item at level `L` evicts every buffered item whose level is
/// not strictly less than `L`. The result is idempotent under a second pass.
pub fn canonicalize<T: Leveled>(items: Vec<T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        let level = item.level();
        while out.last().is_some_and(|last| last.level() >= level) {
            out.pop();
        }
        out.push(item);
    }
    out
}

/// Canonical, root-pinned drill path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationStack {
    entries: Vec<ScopeEntry>,
}

impl NavigationStack {
    /// Root-only stack.
    pub fn root_only(root: ScopeEntry) -> Self {
        Self {
            entries: vec![root],
        }
    }

    /// Build from a root and raw entries in order.
    ///
    /// Raw entries at or above the root's level are dropped before
    /// canonicalizing, so the root always survives.
    pub fn from_entries(root: ScopeEntry, raw: Vec<ScopeEntry>) -> Self {
        let root_level = root.level;
        let raw_len = raw.len();
        let mut items = Vec::with_capacity(raw_len + 1);
        items.push(root);
        items.extend(raw.into_iter().filter(|entry| entry.level > root_level));
        let entries = canonicalize(items);
        if entries.len() != raw_len + 1 {
            trace!(
                raw = raw_len,
                kept = entries.len() - 1,
                "canonicalization dropped entries"
            );
        }
        Self { entries }
    }

    /// Build from filter-less scopes, stamping every entry with `filters`.
    pub fn from_scopes<I>(root: ScopeRef, scopes: I, filters: &Filters) -> Self
    where
        I: IntoIterator<Item = ScopeRef>,
    {
        let raw = scopes
            .into_iter()
            .map(|scope| scope.enter(filters.clone()))
            .collect();
        Self::from_entries(root.enter(filters.clone()), raw)
    }

    pub fn root(&self) -> &ScopeEntry {
        &self.entries[0]
    }

    pub fn top(&self) -> &ScopeEntry {
        &self.entries[self.entries.len() - 1]
    }

    /// Filters of the top entry (the effective filters).
    pub fn filters(&self) -> &Filters {
        &self.top().filters
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn is_root_only(&self) -> bool {
        self.entries.len() == 1
    }

    pub fn entries(&self) -> &[ScopeEntry] {
        &self.entries
    }

    /// Entries below the root, in order.
    pub fn drill_entries(&self) -> &[ScopeEntry] {
        &self.entries[1..]
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScopeEntry> {
        self.entries.iter()
    }

    /// Labels from root to top.
    pub fn breadcrumbs(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }

    /// Same path and same effective filters.
    pub fn same_view(&self, other: &NavigationStack) -> bool {
        self == other && self.filters() == other.filters()
    }

    // =========================================================================
    // TRANSITIONS (pure; return the next stack)
    // =========================================================================

    /// Stack with `entry` entered on top.
    ///
    /// Returns `None` when the entry is not deeper than the root.
    pub fn pushed(&self, entry: ScopeEntry) -> Option<Self> {
        if entry.level <= self.root().level {
            return None;
        }
        let mut items: Vec<ScopeEntry> = self
            .entries
            .iter()
            .filter(|existing| existing.level < entry.level)
            .cloned()
            .collect();
        items.push(entry);
        Some(Self {
            entries: canonicalize(items),
        })
    }

    /// Stack without its top entry, or `None` at root.
    pub fn popped(&self) -> Option<Self> {
        if self.is_root_only() {
            return None;
        }
        Some(Self {
            entries: self.entries[..self.entries.len() - 1].to_vec(),
        })
    }

    /// Stack truncated to `[0..=index]`, or `None` when out of bounds.
    pub fn truncated(&self, index: usize) -> Option<Self> {
        if index >= self.entries.len() {
            return None;
        }
        Some(Self {
            entries: self.entries[..=index].to_vec(),
        })
    }

    /// Root-only stack carrying `filters`.
    pub fn collapsed(&self, filters: Filters) -> Self {
        let mut root = self.root().clone();
        root.filters = filters;
        Self::root_only(root)
    }

    /// Apply `patch` to every entry's filters.
    pub fn patch_filters(&mut self, patch: &FilterPatch) {
        for entry in &mut self.entries {
            entry.filters = entry.filters.apply(patch);
        }
    }
}
