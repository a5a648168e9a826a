//! Configuration loading

use anyhow::Result;
use fieldlab_core::{GenericSensorProvider, ProviderRegistry};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default, rename = "provider")]
    pub providers: Vec<ProviderConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the JSON store snapshot
    #[serde(default = "default_store_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> String {
    "./fieldlab.json".to_string()
}

/// Enables a sensor provider for one kind tag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub kind: String,
}

impl Config {
    /// Build the provider registry from configuration. With no providers
    /// configured, the built-in kinds are enabled.
    pub fn provider_registry(&self) -> ProviderRegistry {
        let mut registry = ProviderRegistry::new();
        if self.providers.is_empty() {
            for kind in ["ble", "usb"] {
                registry.register(kind, Box::new(GenericSensorProvider::new(kind)));
            }
        } else {
            for provider in &self.providers {
                registry.register(
                    provider.kind.clone(),
                    Box::new(GenericSensorProvider::new(provider.kind.clone())),
                );
            }
        }
        registry
    }
}

/// Load configuration from file, falling back to defaults when absent
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_providers() {
        let config = Config::default();
        let registry = config.provider_registry();
        assert!(registry.contains("ble"));
        assert!(registry.contains("usb"));
    }

    #[test]
    fn test_configured_providers_replace_defaults() {
        let config: Config = toml::from_str(
            r#"
[store]
path = "/tmp/store.json"

[[provider]]
kind = "i2c"
"#,
        )
        .unwrap();

        assert_eq!(config.store.path, "/tmp/store.json");
        let registry = config.provider_registry();
        assert!(registry.contains("i2c"));
        assert!(!registry.contains("ble"));
    }
}
