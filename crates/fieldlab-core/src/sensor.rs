//! Sensor identity and connection spec types

use serde::{Deserialize, Serialize};

/// Stable identifier under which a sensor's spec is stored
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SensorId(pub String);

impl SensorId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SensorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An external sensor's identity plus connection spec
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorSpec {
    /// Sensor type tag, used to look up a provider
    pub kind: String,
    /// Human-readable sensor name
    pub name: String,
    /// Connection address (e.g. BLE MAC, USB path)
    pub address: String,
    /// Opaque type-specific configuration payload
    #[serde(default)]
    pub config: Vec<u8>,
}

impl SensorSpec {
    /// Create a spec with an empty configuration payload
    pub fn new(
        kind: impl Into<String>,
        name: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            address: address.into(),
            config: Vec::new(),
        }
    }

    /// Attach a configuration payload
    pub fn with_config(mut self, config: Vec<u8>) -> Self {
        self.config = config;
        self
    }

    /// Domain equivalence used for registration dedup: same kind, address
    /// and name. The configuration payload does not participate, so two
    /// specs that differ only in config are the same sensor.
    pub fn is_same_sensor_and_spec(&self, other: &SensorSpec) -> bool {
        self.kind == other.kind && self.address == other.address && self.name == other.name
    }

    /// Derive the store id for this spec at a given numeric suffix
    pub fn sensor_id(&self, suffix: u32) -> SensorId {
        SensorId(format!("{}-{}-{}", self.kind, self.name, suffix))
    }
}

/// A sensor as seen by a group: a spec plus, once registered with the
/// metadata store, the id it is connected under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectableSensor {
    spec: SensorSpec,
    connected_id: Option<SensorId>,
}

impl ConnectableSensor {
    /// A sensor registered with the store under `id`
    pub fn connected(spec: SensorSpec, id: SensorId) -> Self {
        Self {
            spec,
            connected_id: Some(id),
        }
    }

    /// A sensor that has been seen but not yet registered
    pub fn disconnected(spec: SensorSpec) -> Self {
        Self {
            spec,
            connected_id: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected_id.is_some()
    }

    pub fn spec(&self) -> &SensorSpec {
        &self.spec
    }

    pub fn connected_id(&self) -> Option<&SensorId> {
        self.connected_id.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equivalence_ignores_config() {
        let a = SensorSpec::new("ble", "thermo", "AA:BB:CC").with_config(vec![1, 2]);
        let b = SensorSpec::new("ble", "thermo", "AA:BB:CC").with_config(vec![9]);
        assert!(a.is_same_sensor_and_spec(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_equivalence_requires_same_address() {
        let a = SensorSpec::new("ble", "thermo", "AA:BB:CC");
        let b = SensorSpec::new("ble", "thermo", "DD:EE:FF");
        assert!(!a.is_same_sensor_and_spec(&b));
    }

    #[test]
    fn test_sensor_id_suffix() {
        let spec = SensorSpec::new("ble", "thermo", "AA:BB:CC");
        assert_eq!(spec.sensor_id(0).as_str(), "ble-thermo-0");
        assert_eq!(spec.sensor_id(3).as_str(), "ble-thermo-3");
    }

    #[test]
    fn test_connectable_sensor() {
        let spec = SensorSpec::new("ble", "thermo", "AA:BB:CC");
        let connected =
            ConnectableSensor::connected(spec.clone(), SensorId("ble-thermo-0".to_string()));
        assert!(connected.is_connected());
        assert_eq!(connected.connected_id().unwrap().as_str(), "ble-thermo-0");

        let disconnected = ConnectableSensor::disconnected(spec);
        assert!(!disconnected.is_connected());
        assert!(disconnected.connected_id().is_none());
    }
}
