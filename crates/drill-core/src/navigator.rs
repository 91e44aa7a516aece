//! Drill navigation state machine.
//!
//! The stack is the state. Intents (`push`, `back`, `jump_to`, `reset`,
//! `sync_filters`) compute the next canonical stack and hand it to the
//! [`HistoryWriter`]; `reconcile` folds externally triggered navigation
//! back into the stack.
//!
//! # Event loop contract
//!
//! The host drives time and notifications:
//!
//! ```ignore
//! // on every tick
//! navigator.poll();
//! // on every "address bar changed externally" notification
//! navigator.reconcile();
//! // on unmount
//! navigator.teardown();
//! ```
//!
//! # Filters per entry
//!
//! Filters are global (a sync patches every entry), yet each entry keeps
//! its own copy so that `back` and `jump_to` restore the filters that were
//! active at that depth, e.g. after a push with filter overrides.

use std::fmt;
use std::time::Duration;

use drill_model::{FilterPatch, Filters, NavigationStack, ScopeEntry, ScopeLevel, ScopeRef};
use tracing::{debug, info};

use crate::codec::{QueryCodec, Signature};
use crate::config::NavigatorConfig;
use crate::debounce::{Clock, DebounceTimer, SystemClock};
use crate::history::{AddressBar, HistoryWriter, ListenerId, WriteMode, WriteOutcome};

// =============================================================================
// OUTCOMES
// =============================================================================

/// Why an intent was refused. The stack is unchanged in every case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Pushed scope is at or above the root's level.
    NotDeeperThanRoot { level: ScopeLevel, root: ScopeLevel },
    /// Pushed scope has an empty id.
    EmptyId,
    /// `jump_to` index past the top of the stack.
    IndexOutOfBounds { index: usize, len: usize },
    /// The navigator was torn down.
    TornDown,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotDeeperThanRoot { level, root } => {
                write!(f, "{level} is not below the root level {root}")
            }
            Self::EmptyId => f.write_str("empty scope id"),
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for depth {len}")
            }
            Self::TornDown => f.write_str("navigator torn down"),
        }
    }
}

/// Result of a navigation intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavOutcome {
    /// State changed and the address bar was written.
    Committed(WriteMode),
    /// State changed; the address bar already showed it.
    Reflected,
    /// State changed; the history write waits for the debounce timer.
    Scheduled,
    /// Nothing to do: the requested state is the current one.
    Unchanged,
    /// Invalid request; treated as a no-op.
    Rejected(RejectReason),
}

impl NavOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }
}

impl fmt::Display for NavOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Committed(mode) => write!(f, "committed ({mode})"),
            Self::Reflected => f.write_str("reflected"),
            Self::Scheduled => f.write_str("scheduled"),
            Self::Unchanged => f.write_str("unchanged"),
            Self::Rejected(reason) => write!(f, "rejected: {reason}"),
        }
    }
}

/// Result of [`Navigator::reconcile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The address bar shows what we last wrote or adopted.
    SelfCaused,
    /// The address bar shows the state we already hold.
    AlreadyCurrent,
    /// The address bar showed a different state; it is now ours.
    Adopted,
    /// The navigator was torn down.
    Inactive,
}

impl fmt::Display for ReconcileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SelfCaused => "self-caused",
            Self::AlreadyCurrent => "already current",
            Self::Adopted => "adopted",
            Self::Inactive => "inactive",
        })
    }
}

// =============================================================================
// NAVIGATOR
// =============================================================================

pub struct Navigator<A: AddressBar, C: Clock = SystemClock> {
    root: ScopeRef,
    stack: NavigationStack,
    writer: HistoryWriter<A>,
    clock: C,
    debounce: DebounceTimer,
    pending_mode: Option<WriteMode>,
    listener: Option<ListenerId>,
}

impl<A: AddressBar> Navigator<A, SystemClock> {
    /// Mount on `bar` using the wall clock.
    pub fn new(root: ScopeRef, defaults: Filters, bar: A, config: &NavigatorConfig) -> Self {
        Self::with_clock(root, defaults, bar, config, SystemClock)
    }
}

impl<A: AddressBar, C: Clock> Navigator<A, C> {
    /// Mount on `bar`: subscribe, then build the stack from whatever the
    /// address bar encodes (root alone if absent or malformed).
    pub fn with_clock(
        root: ScopeRef,
        defaults: Filters,
        mut bar: A,
        config: &NavigatorConfig,
        clock: C,
    ) -> Self {
        let listener = bar.subscribe();
        let mut writer = HistoryWriter::new(bar, QueryCodec::new(config.keys.clone()), defaults);
        let stack = writer.read().into_stack(root.clone());
        if config.normalize_on_mount {
            let filters = stack.filters().clone();
            writer.write(&stack, &filters, WriteMode::Replace);
        }
        info!(depth = stack.len(), top = %stack.top().id, "navigator mounted");
        Self {
            root,
            stack,
            writer,
            clock,
            debounce: DebounceTimer::new(config.debounce()),
            pending_mode: None,
            listener: Some(listener),
        }
    }

    // =========================================================================
    // OUTBOUND STATE
    // =========================================================================

    pub fn stack(&self) -> &NavigationStack {
        &self.stack
    }

    pub fn top(&self) -> &ScopeEntry {
        self.stack.top()
    }

    /// Effective filters (those of the top entry).
    pub fn filters(&self) -> &Filters {
        self.stack.filters()
    }

    pub fn can_go_back(&self) -> bool {
        !self.stack.is_root_only()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn breadcrumbs(&self) -> Vec<&str> {
        self.stack.breadcrumbs()
    }

    pub fn root(&self) -> &ScopeRef {
        &self.root
    }

    pub fn defaults(&self) -> &Filters {
        self.writer.defaults()
    }

    /// Signature of the state currently held.
    pub fn signature(&self) -> Signature {
        self.writer.signature(&self.stack, self.stack.filters())
    }

    pub fn has_pending_sync(&self) -> bool {
        self.pending_mode.is_some()
    }

    /// Time until a pending sync is written.
    pub fn pending_remaining(&self) -> Option<Duration> {
        self.debounce.remaining(self.clock.now())
    }

    pub fn is_active(&self) -> bool {
        self.listener.is_some()
    }

    pub fn address_bar(&self) -> &A {
        self.writer.address_bar()
    }

    /// Mutable access for hosts that simulate external navigation.
    pub fn address_bar_mut(&mut self) -> &mut A {
        self.writer.address_bar_mut()
    }

    // =========================================================================
    // INTENTS
    // =========================================================================

    /// Drill into `scope`, inheriting the top entry's filters.
    pub fn push(&mut self, scope: ScopeRef) -> NavOutcome {
        self.push_with(scope, &FilterPatch::default(), WriteMode::Push)
    }

    /// Drill into `scope` with filter overrides for the new entry.
    ///
    /// Entries at or below the scope's level are evicted first. Pushing the
    /// current top again only rewrites its label, with replace, when the
    /// label changed.
    pub fn push_with(
        &mut self,
        scope: ScopeRef,
        overrides: &FilterPatch,
        mode: WriteMode,
    ) -> NavOutcome {
        if !self.is_active() {
            return NavOutcome::Rejected(RejectReason::TornDown);
        }
        if scope.id.trim().is_empty() {
            debug!(level = %scope.level, "rejecting push with empty id");
            return NavOutcome::Rejected(RejectReason::EmptyId);
        }
        let level = scope.level;
        let entry = scope.enter(self.stack.filters().apply(overrides));
        let Some(next) = self.stack.pushed(entry) else {
            debug!(%level, root = %self.root.level, "rejecting push above root level");
            return NavOutcome::Rejected(RejectReason::NotDeeperThanRoot {
                level,
                root: self.root.level,
            });
        };
        if next.same_view(&self.stack) {
            if next.top().label == self.stack.top().label {
                debug!("push targets the current view");
                return NavOutcome::Unchanged;
            }
            debug!(label = %next.top().label, "refreshing top label");
            return self.commit(next, WriteMode::Replace);
        }
        self.commit(next, mode)
    }

    /// Drop the top entry. No-op at root.
    pub fn back(&mut self) -> NavOutcome {
        if !self.is_active() {
            return NavOutcome::Rejected(RejectReason::TornDown);
        }
        match self.stack.popped() {
            Some(next) => self.commit(next, WriteMode::Push),
            None => NavOutcome::Unchanged,
        }
    }

    /// Truncate to `[0..=index]` (breadcrumb click).
    pub fn jump_to(&mut self, index: usize) -> NavOutcome {
        if !self.is_active() {
            return NavOutcome::Rejected(RejectReason::TornDown);
        }
        let Some(next) = self.stack.truncated(index) else {
            debug!(index, len = self.stack.len(), "jump index out of bounds");
            return NavOutcome::Rejected(RejectReason::IndexOutOfBounds {
                index,
                len: self.stack.len(),
            });
        };
        if next.len() == self.stack.len() {
            return NavOutcome::Unchanged;
        }
        self.commit(next, WriteMode::Push)
    }

    /// Collapse to the root, keeping the current filters.
    pub fn reset(&mut self) -> NavOutcome {
        if !self.is_active() {
            return NavOutcome::Rejected(RejectReason::TornDown);
        }
        let next = self.stack.collapsed(self.stack.filters().clone());
        if next.same_view(&self.stack) {
            return NavOutcome::Unchanged;
        }
        self.commit(next, WriteMode::Push)
    }

    /// Patch filters on every entry; write with replace once the burst settles.
    pub fn sync_filters(&mut self, patch: &FilterPatch) -> NavOutcome {
        self.sync_filters_with(patch, WriteMode::Replace)
    }

    /// Patch filters on every entry; write with `mode` once the burst settles.
    ///
    /// The stack is updated immediately so consumers see the new filters;
    /// only the history write is deferred.
    pub fn sync_filters_with(&mut self, patch: &FilterPatch, mode: WriteMode) -> NavOutcome {
        if !self.is_active() {
            return NavOutcome::Rejected(RejectReason::TornDown);
        }
        let mut next = self.stack.clone();
        next.patch_filters(patch);
        let changed = next
            .iter()
            .zip(self.stack.iter())
            .any(|(after, before)| after.filters != before.filters);
        if !changed {
            return NavOutcome::Unchanged;
        }
        self.stack = next;
        self.pending_mode = Some(match self.pending_mode {
            Some(pending) => pending.coalesce(mode),
            None => mode,
        });
        if self.debounce.delay().is_zero() {
            return self.flush();
        }
        self.debounce.schedule(self.clock.now());
        debug!(delay_ms = self.debounce.delay().as_millis() as u64, "filter sync scheduled");
        NavOutcome::Scheduled
    }

    // =========================================================================
    // TIMER
    // =========================================================================

    /// Write a pending sync if its debounce has elapsed.
    pub fn poll(&mut self) -> NavOutcome {
        if self.pending_mode.is_none() {
            return NavOutcome::Unchanged;
        }
        if self.debounce.fire_if_due(self.clock.now()) {
            self.flush()
        } else {
            NavOutcome::Scheduled
        }
    }

    /// Write a pending sync now.
    pub fn flush(&mut self) -> NavOutcome {
        self.debounce.cancel();
        let Some(mode) = self.pending_mode.take() else {
            return NavOutcome::Unchanged;
        };
        let filters = self.stack.filters().clone();
        match self.writer.write(&self.stack, &filters, mode) {
            WriteOutcome::Written { mode, .. } => NavOutcome::Committed(mode),
            WriteOutcome::Unchanged => NavOutcome::Reflected,
        }
    }

    // =========================================================================
    // EXTERNAL NAVIGATION
    // =========================================================================

    /// Fold the address bar's current state into the stack.
    ///
    /// Call once per external-change notification. Reads the address bar as
    /// it is now, so late or repeated notifications are harmless.
    pub fn reconcile(&mut self) -> ReconcileOutcome {
        if !self.is_active() {
            return ReconcileOutcome::Inactive;
        }
        let observed = self.writer.read().into_stack(self.root.clone());
        let signature = self.writer.signature(&observed, observed.filters());
        if self.writer.last_written() == Some(&signature) {
            debug!("ignoring notification for our own write");
            return ReconcileOutcome::SelfCaused;
        }
        if signature == self.signature() {
            debug!("address bar already matches current state");
            self.writer.mark_reflected(signature);
            return ReconcileOutcome::AlreadyCurrent;
        }
        self.cancel_pending();
        info!(
            depth = observed.len(),
            top = %observed.top().id,
            "adopting external navigation"
        );
        self.stack = observed;
        self.writer.mark_reflected(signature);
        ReconcileOutcome::Adopted
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Cancel the debounce and unsubscribe. Later intents are rejected.
    ///
    /// A pending sync is dropped, not written.
    pub fn teardown(&mut self) {
        self.cancel_pending();
        if let Some(id) = self.listener.take() {
            self.writer.address_bar_mut().unsubscribe(id);
            debug!("navigator torn down");
        }
    }

    fn cancel_pending(&mut self) {
        self.debounce.cancel();
        self.pending_mode = None;
    }

    fn commit(&mut self, next: NavigationStack, mode: WriteMode) -> NavOutcome {
        self.cancel_pending();
        let filters = next.filters().clone();
        let outcome = self.writer.write(&next, &filters, mode);
        self.stack = next;
        match outcome {
            WriteOutcome::Written { mode, .. } => NavOutcome::Committed(mode),
            WriteOutcome::Unchanged => NavOutcome::Reflected,
        }
    }
}

impl<A: AddressBar, C: Clock> Drop for Navigator<A, C> {
    fn drop(&mut self) {
        self.teardown();
    }
}
