//! Drill navigation core.
//!
//! Layers, leaves first:
//!
//! - [`codec`]: stack + filters to and from a query string
//! - [`history`]: the [`AddressBar`] boundary and the [`HistoryWriter`]
//! - [`debounce`]: the filter-sync timer and clocks
//! - [`navigator`]: the [`Navigator`] state machine
//!
//! [`MemoryHistory`] is an in-process [`AddressBar`] for tests and replays.

pub mod codec;
pub mod config;
pub mod debounce;
pub mod error;
pub mod history;
pub mod memory;
pub mod navigator;

pub use codec::{QueryCodec, QueryKeys, QueryState, Signature, parse_pairs};
pub use config::{DEFAULT_DEBOUNCE_MS, NavigatorConfig};
pub use debounce::{Clock, DebounceTimer, ManualClock, SystemClock};
pub use error::{CodecError, ConfigError};
pub use history::{AddressBar, HistoryWriter, ListenerId, WriteMode, WriteOutcome};
pub use memory::MemoryHistory;
pub use navigator::{NavOutcome, Navigator, ReconcileOutcome, RejectReason};

pub use drill_model::{
    FilterPatch, Filters, NavigationStack, ScopeEntry, ScopeLevel, ScopeRef, TimeRange, ViewMode,
};
