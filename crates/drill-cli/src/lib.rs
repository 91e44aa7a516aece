//! CLI library components for scope drill navigation.

pub mod logging;
pub mod script;
pub mod session;
