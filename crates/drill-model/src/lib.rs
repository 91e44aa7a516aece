//! Data model for scope drill navigation.
//!
//! - [`ScopeLevel`]: the fixed level order
//! - [`Filters`] / [`FilterPatch`]: cross-cutting view filters
//! - [`ScopeRef`] / [`ScopeEntry`]: scope descriptors and stack frames
//! - [`NavigationStack`] / [`canonicalize`]: the canonical drill path

pub mod entry;
pub mod error;
pub mod filters;
pub mod level;
pub mod stack;

pub use entry::{ScopeEntry, ScopeRef};
pub use error::{ModelError, Result};
pub use filters::{FilterPatch, Filters, TimeRange, ViewMode};
pub use level::ScopeLevel;
pub use stack::{Leveled, NavigationStack, canonicalize};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_serializes_for_display() {
        let stack = NavigationStack::from_scopes(
            ScopeRef::new(ScopeLevel::Root, "N", "Nation"),
            vec![ScopeRef::new(ScopeLevel::Region, "R1", "North")],
            &Filters::new("load"),
        );
        let json = serde_json::to_value(&stack).expect("serialize stack");
        assert_eq!(json["entries"][1]["level"], "region");
        assert_eq!(json["entries"][1]["filters"]["metric"], "load");
    }
}
