//! Provider lookup for sensor spec construction
//!
//! The metadata store never keeps a caller's spec directly: when a new
//! sensor is registered, the spec is rebuilt through the provider for its
//! kind so the store owns an independent copy.

use std::collections::HashMap;

use crate::sensor::SensorSpec;

/// Builds store-owned sensor specs for one sensor kind
pub trait SensorProvider {
    /// Rebuild a spec from its parts
    fn build_spec(&self, name: &str, address: &str, config: &[u8]) -> SensorSpec;
}

/// Provider that carries the configuration payload through unchanged,
/// suitable for kinds with no config interpretation of their own
#[derive(Debug, Clone)]
pub struct GenericSensorProvider {
    kind: String,
}

impl GenericSensorProvider {
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into() }
    }
}

impl SensorProvider for GenericSensorProvider {
    fn build_spec(&self, name: &str, address: &str, config: &[u8]) -> SensorSpec {
        SensorSpec::new(self.kind.clone(), name, address).with_config(config.to_vec())
    }
}

/// Registry mapping sensor kind tags to providers
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Box<dyn SensorProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider for a kind, replacing any existing one
    pub fn register(&mut self, kind: impl Into<String>, provider: Box<dyn SensorProvider>) {
        self.providers.insert(kind.into(), provider);
    }

    pub fn get(&self, kind: &str) -> Option<&dyn SensorProvider> {
        self.providers.get(kind).map(|p| p.as_ref())
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.providers.contains_key(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_provider_builds_owned_copy() {
        let provider = GenericSensorProvider::new("ble");
        let spec = provider.build_spec("thermo", "AA:BB:CC", &[1, 2, 3]);
        assert_eq!(spec.kind, "ble");
        assert_eq!(spec.name, "thermo");
        assert_eq!(spec.address, "AA:BB:CC");
        assert_eq!(spec.config, vec![1, 2, 3]);
    }

    #[test]
    fn test_registry_lookup() {
        let mut registry = ProviderRegistry::new();
        registry.register("ble", Box::new(GenericSensorProvider::new("ble")));

        assert!(registry.contains("ble"));
        assert!(registry.get("ble").is_some());
        assert!(registry.get("usb").is_none());
    }
}
