//! Decode, encode, and replay against a fixed root.

use drill_core::{
    AddressBar, ManualClock, MemoryHistory, Navigator, NavigatorConfig, QueryCodec,
};
use drill_model::{FilterPatch, Filters, NavigationStack, ScopeRef};
use serde::Serialize;
use tracing::{debug, info_span};

use crate::script::Step;

/// Root scope, default filters, and navigator settings shared by every command.
#[derive(Debug, Clone)]
pub struct Session {
    pub root: ScopeRef,
    pub defaults: Filters,
    pub config: NavigatorConfig,
}

#[derive(Debug, Serialize)]
pub struct DecodeReport {
    pub query: String,
    /// Managed keys as the navigator would write them.
    pub canonical: String,
    pub stack: NavigationStack,
    pub filters: Filters,
}

#[derive(Debug, Serialize)]
pub struct EncodeReport {
    pub query: String,
    pub stack: NavigationStack,
    pub filters: Filters,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub index: usize,
    pub step: String,
    pub outcome: String,
    pub depth: usize,
    pub query: String,
    pub pending_sync: bool,
}

#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub steps: Vec<StepRecord>,
    pub stack: NavigationStack,
    pub filters: Filters,
    pub history: Vec<String>,
    pub cursor: usize,
    pub pending_sync: bool,
    pub pushes: usize,
    pub replaces: usize,
}

impl Session {
    pub fn new(root: ScopeRef, defaults: Filters, config: NavigatorConfig) -> Self {
        Self {
            root,
            defaults,
            config,
        }
    }

    fn codec(&self) -> QueryCodec {
        QueryCodec::new(self.config.keys.clone())
    }

    pub fn decode(&self, query: &str) -> DecodeReport {
        let codec = self.codec();
        let state = codec.decode(query, &self.defaults);
        let filters = state.filters.clone();
        let stack = state.into_stack(self.root.clone());
        DecodeReport {
            query: query.to_string(),
            canonical: codec.encode(&stack, &filters, &self.defaults),
            stack,
            filters,
        }
    }

    /// Canonicalize `scopes` under the root and encode them with
    /// `patch` applied over the defaults.
    pub fn encode(&self, scopes: Vec<ScopeRef>, patch: &FilterPatch) -> EncodeReport {
        let filters = self.defaults.apply(patch);
        let stack = NavigationStack::from_scopes(self.root.clone(), scopes, &filters);
        EncodeReport {
            query: self.codec().encode(&stack, &filters, &self.defaults),
            stack,
            filters,
        }
    }

    pub fn replay(&self, initial: &str, steps: &[Step]) -> ReplayReport {
        let mut replayer = Replayer::new(self, initial);
        let records = steps
            .iter()
            .enumerate()
            .map(|(index, step)| replayer.apply(index + 1, step))
            .collect();
        replayer.finish(records)
    }
}

/// Drives a navigator over a [`MemoryHistory`] with a manual clock.
pub struct Replayer<'a> {
    session: &'a Session,
    clock: ManualClock,
    navigator: Navigator<MemoryHistory, ManualClock>,
}

impl<'a> Replayer<'a> {
    pub fn new(session: &'a Session, initial: &str) -> Self {
        let clock = ManualClock::new();
        let navigator = mount(session, MemoryHistory::new(initial), clock.clone());
        Self {
            session,
            clock,
            navigator,
        }
    }

    pub fn navigator(&self) -> &Navigator<MemoryHistory, ManualClock> {
        &self.navigator
    }

    /// Apply one step, then deliver any queued address-bar notifications.
    pub fn apply(&mut self, index: usize, step: &Step) -> StepRecord {
        let span = info_span!("step", index, step = %step);
        let _guard = span.enter();

        let mut outcome = match step {
            Step::Push(scope) => self.navigator.push(scope.clone()).to_string(),
            Step::Back => self.navigator.back().to_string(),
            Step::Jump(target) => self.navigator.jump_to(*target).to_string(),
            Step::Reset => self.navigator.reset().to_string(),
            Step::Filter(patch) => self.navigator.sync_filters(patch).to_string(),
            Step::Wait(delay) => {
                self.clock.advance(*delay);
                self.navigator.poll().to_string()
            }
            Step::Flush => self.navigator.flush().to_string(),
            Step::BrowserBack => {
                if self.navigator.address_bar_mut().back() {
                    String::new()
                } else {
                    "no earlier entry".to_string()
                }
            }
            Step::BrowserForward => {
                if self.navigator.address_bar_mut().forward() {
                    String::new()
                } else {
                    "no later entry".to_string()
                }
            }
            Step::Reload => {
                self.navigator.teardown();
                let bar = self.navigator.address_bar().clone();
                self.navigator = mount(self.session, bar, self.clock.clone());
                "remounted".to_string()
            }
        };

        let reconciled = self.pump();
        if !reconciled.is_empty() {
            if !outcome.is_empty() {
                outcome.push_str("; ");
            }
            outcome.push_str(&reconciled.join(", "));
        }
        debug!(%outcome, depth = self.navigator.depth(), "step applied");

        StepRecord {
            index,
            step: step.to_string(),
            outcome,
            depth: self.navigator.depth(),
            query: self.navigator.address_bar().query(),
            pending_sync: self.navigator.has_pending_sync(),
        }
    }

    fn pump(&mut self) -> Vec<String> {
        let count = self.navigator.address_bar_mut().take_notifications();
        (0..count)
            .map(|_| self.navigator.reconcile().to_string())
            .collect()
    }

    pub fn finish(self, steps: Vec<StepRecord>) -> ReplayReport {
        let bar = self.navigator.address_bar();
        ReplayReport {
            steps,
            stack: self.navigator.stack().clone(),
            filters: self.navigator.filters().clone(),
            history: bar.entries().to_vec(),
            cursor: bar.cursor(),
            pending_sync: self.navigator.has_pending_sync(),
            pushes: bar.push_count(),
            replaces: bar.replace_count(),
        }
    }
}

fn mount(
    session: &Session,
    bar: MemoryHistory,
    clock: ManualClock,
) -> Navigator<MemoryHistory, ManualClock> {
    Navigator::with_clock(
        session.root.clone(),
        session.defaults.clone(),
        bar,
        &session.config,
        clock,
    )
}
