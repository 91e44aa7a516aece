//! Error types for the navigation core.
//!
//! None of these cross the navigator's public boundary: codec failures are
//! logged and degrade to "no drill state", and configuration errors only
//! surface from [`crate::NavigatorConfig::load_from`].

use std::path::PathBuf;
use thiserror::Error;

/// Reason a drill token could not be decoded.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Token is not a JSON array of string arrays.
    #[error("drill token is not a list of string triples: {0}")]
    Json(#[from] serde_json::Error),

    /// An entry has the wrong number of fields.
    #[error("drill entry {index} has {len} fields (expected 2 or 3)")]
    Arity { index: usize, len: usize },

    /// An entry names a level that does not exist.
    #[error("drill entry {index} has unknown level '{tag}'")]
    UnknownLevel { index: usize, tag: String },

    /// An entry has an empty id.
    #[error("drill entry {index} has an empty id")]
    EmptyId { index: usize },
}

/// Failure loading a navigator configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Two filter fields (or the drill token) share a query key.
    #[error("query key '{0}' is used more than once")]
    DuplicateKey(String),

    #[error("query key for {field} must not be empty")]
    EmptyKey { field: &'static str },
}
