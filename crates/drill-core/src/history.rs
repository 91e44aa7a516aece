//! History writer and the address-bar boundary.
//!
//! The address bar is the one shared, externally visible resource. Only
//! [`HistoryWriter`] calls [`AddressBar::push`] / [`AddressBar::replace`];
//! everything else reads stack and filter values handed to it.

use std::fmt;

use drill_model::{Filters, NavigationStack};
use tracing::{debug, info};

use crate::codec::{QueryCodec, QueryState, Signature};

/// Handle returned by [`AddressBar::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Platform adapter for the address bar and its history.
///
/// Implementations report external navigation (back/forward, typed URL)
/// to subscribed listeners out of band; the host then calls
/// [`crate::Navigator::reconcile`].
pub trait AddressBar {
    /// Current query string, without the leading `?`.
    fn query(&self) -> String;

    /// Write `query` as a new history entry.
    fn push(&mut self, query: &str);

    /// Overwrite the current history entry with `query`.
    fn replace(&mut self, query: &str);

    /// Register interest in external navigation notifications.
    fn subscribe(&mut self) -> ListenerId;

    /// Drop a registration made with [`AddressBar::subscribe`].
    fn unsubscribe(&mut self, id: ListenerId);
}

/// History write strategy.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteMode {
    /// New navigable entry (user-initiated navigation).
    #[default]
    Push,
    /// Overwrite the current entry (filter tweaks, normalization).
    Replace,
}

impl WriteMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::Replace => "replace",
        }
    }

    /// Combine two requested modes; a push anywhere in a burst wins.
    #[must_use]
    pub fn coalesce(self, other: WriteMode) -> WriteMode {
        match (self, other) {
            (Self::Replace, Self::Replace) => Self::Replace,
            _ => Self::Push,
        }
    }
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of [`HistoryWriter::write`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The address bar was mutated.
    Written { mode: WriteMode, signature: Signature },
    /// The address bar already showed this view; nothing was written.
    Unchanged,
}

impl WriteOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, Self::Written { .. })
    }
}

/// Owns the address bar and the last-write signature.
#[derive(Debug)]
pub struct HistoryWriter<A: AddressBar> {
    bar: A,
    codec: QueryCodec,
    defaults: Filters,
    last_written: Option<Signature>,
}

impl<A: AddressBar> HistoryWriter<A> {
    pub fn new(bar: A, codec: QueryCodec, defaults: Filters) -> Self {
        Self {
            bar,
            codec,
            defaults,
            last_written: None,
        }
    }

    pub fn codec(&self) -> &QueryCodec {
        &self.codec
    }

    pub fn defaults(&self) -> &Filters {
        &self.defaults
    }

    pub fn address_bar(&self) -> &A {
        &self.bar
    }

    /// Mutable access for hosts simulating external navigation.
    ///
    /// Writes made through this handle bypass the signature bookkeeping.
    pub fn address_bar_mut(&mut self) -> &mut A {
        &mut self.bar
    }

    /// Signature of the view the address bar last showed on our behalf:
    /// the most recent write, a skipped write, or adopted external state.
    pub fn last_written(&self) -> Option<&Signature> {
        self.last_written.as_ref()
    }

    pub fn signature(&self, stack: &NavigationStack, filters: &Filters) -> Signature {
        self.codec.signature(stack, filters, &self.defaults)
    }

    /// Decode whatever the address bar currently shows.
    pub fn read(&self) -> QueryState {
        self.codec.decode(&self.bar.query(), &self.defaults)
    }

    /// Record `signature` as reflected without writing.
    ///
    /// Used when the address bar comes to show the held view without our
    /// write (adopted or matching external navigation), so that a later
    /// notification for a view we wrote earlier is not mistaken for our own
    /// echo.
    pub fn mark_reflected(&mut self, signature: Signature) {
        self.last_written = Some(signature);
    }

    /// Write `(stack, filters)` if the address bar does not already show it.
    ///
    /// Either way the view's signature becomes [`HistoryWriter::last_written`].
    pub fn write(
        &mut self,
        stack: &NavigationStack,
        filters: &Filters,
        mode: WriteMode,
    ) -> WriteOutcome {
        let managed = self.codec.managed_pairs(stack, filters, &self.defaults);
        let current = self.bar.query();
        let target = self.codec.merge(&current, managed);
        let signature = self.signature(stack, filters);
        if target == current {
            debug!(query = %target, "address bar already current; skipping write");
            self.last_written = Some(signature);
            return WriteOutcome::Unchanged;
        }

        match mode {
            WriteMode::Push => self.bar.push(&target),
            WriteMode::Replace => self.bar.replace(&target),
        }
        info!(%mode, query = %target, depth = stack.len(), "history write");
        self.last_written = Some(signature.clone());
        WriteOutcome::Written { mode, signature }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryHistory;
    use drill_model::{ScopeLevel, ScopeRef};

    fn writer(initial: &str) -> HistoryWriter<MemoryHistory> {
        HistoryWriter::new(
            MemoryHistory::new(initial),
            QueryCodec::default(),
            Filters::new("power"),
        )
    }

    fn stack_with(scopes: Vec<ScopeRef>, filters: &Filters) -> NavigationStack {
        let root = ScopeRef::new(ScopeLevel::Root, "N", "Nation");
        NavigationStack::from_scopes(root, scopes, filters)
    }

    #[test]
    fn test_default_view_on_clean_bar_is_noop() {
        let mut writer = writer("");
        let filters = Filters::new("power");
        let stack = stack_with(Vec::new(), &filters);
        assert_eq!(
            writer.write(&stack, &filters, WriteMode::Push),
            WriteOutcome::Unchanged
        );
        assert_eq!(writer.address_bar().write_count(), 0);
        assert_eq!(writer.last_written().map(Signature::as_str), Some(""));
    }

    #[test]
    fn test_skipped_write_records_signature() {
        let filters = Filters::new("load");
        let query = "metric=load&range=30d&view=map";
        let mut writer = writer(query);
        let stack = stack_with(Vec::new(), &filters);
        assert_eq!(
            writer.write(&stack, &filters, WriteMode::Replace),
            WriteOutcome::Unchanged
        );
        assert_eq!(writer.last_written().map(Signature::as_str), Some(query));
    }

    #[test]
    fn test_push_then_same_write_is_noop() {
        let mut writer = writer("");
        let filters = Filters::new("power");
        let region = ScopeRef::new(ScopeLevel::Region, "R1", "North");
        let stack = stack_with(vec![region], &filters);

        let first = writer.write(&stack, &filters, WriteMode::Push);
        assert!(first.is_written());
        assert_eq!(writer.write(&stack, &filters, WriteMode::Push), WriteOutcome::Unchanged);

        let bar = writer.address_bar();
        assert_eq!(bar.push_count(), 1);
        assert_eq!(bar.entries().len(), 2);
    }

    #[test]
    fn test_replace_overwrites_current_entry() {
        let mut writer = writer("");
        let filters = Filters::new("load");
        let stack = stack_with(Vec::new(), &filters);
        let outcome = writer.write(&stack, &filters, WriteMode::Replace);
        assert!(matches!(
            outcome,
            WriteOutcome::Written {
                mode: WriteMode::Replace,
                ..
            }
        ));

        let bar = writer.address_bar();
        assert_eq!(bar.entries().len(), 1);
        assert_eq!(bar.query(), "metric=load&range=30d&view=map");
    }

    #[test]
    fn test_returning_to_default_clears_managed_keys() {
        let mut writer = writer("metric=load&range=30d&view=map&tab=kpi");
        let filters = Filters::new("power");
        let stack = stack_with(Vec::new(), &filters);
        writer.write(&stack, &filters, WriteMode::Replace);
        assert_eq!(writer.address_bar().query(), "tab=kpi");
        assert_eq!(writer.last_written().map(Signature::as_str), Some(""));
    }

    #[test]
    fn test_coalesce_prefers_push() {
        assert_eq!(WriteMode::Replace.coalesce(WriteMode::Replace), WriteMode::Replace);
        assert_eq!(WriteMode::Replace.coalesce(WriteMode::Push), WriteMode::Push);
        assert_eq!(WriteMode::Push.coalesce(WriteMode::Replace), WriteMode::Push);
    }
}
