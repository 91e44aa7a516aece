//! Navigator configuration.
//!
//! ```toml
//! debounce_ms = 250
//! normalize_on_mount = true
//!
//! [keys]
//! drill = "drill"
//! metric = "metric"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::codec::QueryKeys;
use crate::error::ConfigError;

/// Default debounce for filter syncs.
pub const DEFAULT_DEBOUNCE_MS: u64 = 250;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Query-string key names.
    pub keys: QueryKeys,

    /// Delay before a burst of filter syncs is written.
    ///
    /// Each sync within the window restarts it. Zero writes immediately.
    pub debounce_ms: u64,

    /// Rewrite a non-canonical address bar (with replace) at mount.
    pub normalize_on_mount: bool,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            keys: QueryKeys::default(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            normalize_on_mount: true,
        }
    }
}

impl NavigatorConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    #[must_use]
    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(path: &Path, content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.keys.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(path, &content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = NavigatorConfig::default();
        assert_eq!(config.debounce(), Duration::from_millis(250));
        assert_eq!(config.keys.drill, "drill");
        assert!(config.normalize_on_mount);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = NavigatorConfig::from_toml_str(
            Path::new("nav.toml"),
            "debounce_ms = 50\n[keys]\ndrill = \"d\"\n",
        )
        .unwrap();
        assert_eq!(config.debounce_ms, 50);
        assert_eq!(config.keys.drill, "d");
        assert_eq!(config.keys.metric, "metric");
    }

    #[test]
    fn test_rejects_duplicate_keys() {
        let result = NavigatorConfig::from_toml_str(
            Path::new("nav.toml"),
            "[keys]\nrange = \"view\"\n",
        );
        assert!(matches!(result, Err(ConfigError::DuplicateKey(_))));
    }

    #[test]
    fn test_parse_error_names_path() {
        let result = NavigatorConfig::from_toml_str(Path::new("bad.toml"), "debounce_ms = \"x\"");
        let error = result.unwrap_err();
        assert!(error.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "debounce_ms = 0\nnormalize_on_mount = false").unwrap();
        let config = NavigatorConfig::load_from(file.path()).unwrap();
        assert_eq!(config.debounce(), Duration::ZERO);
        assert!(!config.normalize_on_mount);
    }

    #[test]
    fn test_missing_file() {
        let result = NavigatorConfig::load_from(Path::new("/nonexistent/drill/nav.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
