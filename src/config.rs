//! Network configuration, loadable from TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Runtime options of a [`crate::network::Network`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Keep a registry of every propagator ever alerted so the whole network
    /// can be replayed with `Network::alert_all_propagators`.
    #[serde(default = "default_true")]
    pub track_alert_history: bool,
    /// Emit a `warn` event when a cell's content becomes contradictory.
    #[serde(default = "default_true")]
    pub warn_on_contradiction: bool,
}

fn default_true() -> bool {
    true
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            track_alert_history: default_true(),
            warn_on_contradiction: default_true(),
        }
    }
}

impl NetworkConfig {
    /// Parse a config from TOML text. Missing fields take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Read and parse a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Render {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_uses_defaults() {
        let config = NetworkConfig::from_toml_str("").unwrap();
        assert_eq!(config, NetworkConfig::default());
        assert!(config.track_alert_history);
        assert!(config.warn_on_contradiction);
    }

    #[test]
    fn fields_override_defaults() {
        let config = NetworkConfig::from_toml_str("track_alert_history = false").unwrap();
        assert!(!config.track_alert_history);
        assert!(config.warn_on_contradiction);
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let err = NetworkConfig::from_toml_str("track_alert_history = maybe").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("network.toml");
        let config = NetworkConfig {
            warn_on_contradiction: false,
            ..Default::default()
        };
        std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();
        assert_eq!(NetworkConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = NetworkConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
