//! Sensor groups: named collections of sensor entries keyed by
//! caller-supplied sensor keys
//!
//! Group keys come from the callers that feed the group (scan results,
//! pairing flows) and are not necessarily the metadata store's sensor
//! ids. Registration happens across concurrent asynchronous sources, so
//! the contract absorbs the races in meaning: removing an absent key is a
//! no-op and replacing an absent key inserts.

use fieldlab_core::ConnectableSensor;
use tracing::debug;

/// Capability set shared by every group backend
pub trait SensorGroup {
    fn has_sensor_key(&self, key: &str) -> bool;

    /// Insert `sensor` at `key`, overwriting any existing entry
    fn add_sensor(&mut self, key: &str, sensor: ConnectableSensor);

    /// Returns whether `key` existed and was removed
    fn remove_sensor(&mut self, key: &str) -> bool;

    /// Replace the sensor (if any) at `key` with `sensor`.
    ///
    /// A concurrent scan can remove `key` before this executes, so an
    /// absent key behaves exactly like `add_sensor`. Callers must not
    /// rely on replace failing for missing keys.
    fn replace_sensor(&mut self, key: &str, sensor: ConnectableSensor) {
        self.add_sensor(key, sensor);
    }

    /// Number of live entries; equals the number of keys for which
    /// `has_sensor_key` is true
    fn sensor_count(&self) -> usize;
}

/// Plain insertion-ordered group backend.
///
/// Entries are held in a `Vec` with a linear key scan: groups hold at
/// most a few dozen sensors and the stable local ordering is what the
/// composite registry addresses into.
#[derive(Debug, Default)]
pub struct SensorKeyGroup {
    entries: Vec<(String, ConnectableSensor)>,
    global_start: usize,
}

impl SensorKeyGroup {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    pub fn get_sensor(&self, key: &str) -> Option<&ConnectableSensor> {
        self.position(key).map(|i| &self.entries[i].1)
    }

    /// Entry at a local position, in insertion order
    pub fn sensor_at(&self, index: usize) -> Option<&ConnectableSensor> {
        self.entries.get(index).map(|(_, sensor)| sensor)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub(crate) fn set_global_start(&mut self, offset: usize) {
        self.global_start = offset;
    }

    pub(crate) fn global_start(&self) -> usize {
        self.global_start
    }
}

impl SensorGroup for SensorKeyGroup {
    fn has_sensor_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    fn add_sensor(&mut self, key: &str, sensor: ConnectableSensor) {
        match self.position(key) {
            // Overwrite in place so the local ordering is stable
            Some(i) => self.entries[i].1 = sensor,
            None => self.entries.push((key.to_string(), sensor)),
        }
    }

    fn remove_sensor(&mut self, key: &str) -> bool {
        match self.position(key) {
            Some(i) => {
                self.entries.remove(i);
                true
            }
            None => false,
        }
    }

    fn sensor_count(&self) -> usize {
        self.entries.len()
    }
}

/// Scan results that have not been paired yet.
///
/// Keys claimed as paired are suppressed: a late-arriving scan result for
/// an already-paired sensor is dropped instead of showing the sensor in
/// both views. Unpairing a key makes it insertable again.
#[derive(Debug, Default)]
pub struct AvailableDevicesGroup {
    inner: SensorKeyGroup,
    paired_keys: Vec<String>,
}

impl AvailableDevicesGroup {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_paired(&self, key: &str) -> bool {
        self.paired_keys.iter().any(|k| k == key)
    }

    /// Claim a key as paired, dropping any live entry for it
    pub fn mark_paired(&mut self, key: &str) {
        if !self.is_paired(key) {
            self.paired_keys.push(key.to_string());
        }
        self.inner.remove_sensor(key);
    }

    pub fn mark_unpaired(&mut self, key: &str) {
        self.paired_keys.retain(|k| k != key);
    }

    pub fn get_sensor(&self, key: &str) -> Option<&ConnectableSensor> {
        self.inner.get_sensor(key)
    }

    pub(crate) fn inner(&self) -> &SensorKeyGroup {
        &self.inner
    }

    pub(crate) fn inner_mut(&mut self) -> &mut SensorKeyGroup {
        &mut self.inner
    }
}

impl SensorGroup for AvailableDevicesGroup {
    fn has_sensor_key(&self, key: &str) -> bool {
        self.inner.has_sensor_key(key)
    }

    fn add_sensor(&mut self, key: &str, sensor: ConnectableSensor) {
        if self.is_paired(key) {
            debug!(key, "Ignoring scan result for paired sensor key");
            return;
        }
        self.inner.add_sensor(key, sensor);
    }

    fn remove_sensor(&mut self, key: &str) -> bool {
        self.inner.remove_sensor(key)
    }

    fn sensor_count(&self) -> usize {
        self.inner.sensor_count()
    }
}

/// Sensors the user has paired
#[derive(Debug, Default)]
pub struct PairedDevicesGroup {
    inner: SensorKeyGroup,
}

impl PairedDevicesGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair a sensor under `key`; equivalent to `add_sensor`, named for
    /// the pairing flow
    pub fn pair(&mut self, key: &str, sensor: ConnectableSensor) {
        debug!(key, "Paired sensor");
        self.inner.add_sensor(key, sensor);
    }

    pub fn get_sensor(&self, key: &str) -> Option<&ConnectableSensor> {
        self.inner.get_sensor(key)
    }

    pub(crate) fn inner(&self) -> &SensorKeyGroup {
        &self.inner
    }

    pub(crate) fn inner_mut(&mut self) -> &mut SensorKeyGroup {
        &mut self.inner
    }
}

impl SensorGroup for PairedDevicesGroup {
    fn has_sensor_key(&self, key: &str) -> bool {
        self.inner.has_sensor_key(key)
    }

    fn add_sensor(&mut self, key: &str, sensor: ConnectableSensor) {
        self.inner.add_sensor(key, sensor);
    }

    fn remove_sensor(&mut self, key: &str) -> bool {
        self.inner.remove_sensor(key)
    }

    fn sensor_count(&self) -> usize {
        self.inner.sensor_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldlab_core::SensorSpec;

    fn sensor(name: &str) -> ConnectableSensor {
        ConnectableSensor::disconnected(SensorSpec::new("ble", name, name))
    }

    #[test]
    fn test_add_and_count() {
        let mut group = SensorKeyGroup::new();
        group.add_sensor("a", sensor("a"));
        group.add_sensor("b", sensor("b"));
        assert_eq!(group.sensor_count(), 2);
        assert!(group.has_sensor_key("a"));
        assert!(!group.has_sensor_key("c"));
    }

    #[test]
    fn test_add_overwrites_in_place() {
        let mut group = SensorKeyGroup::new();
        group.add_sensor("a", sensor("first"));
        group.add_sensor("b", sensor("b"));
        group.add_sensor("a", sensor("second"));

        assert_eq!(group.sensor_count(), 2);
        assert_eq!(group.get_sensor("a").unwrap().spec().name, "second");
        // Overwriting must not reorder
        assert_eq!(group.sensor_at(0).unwrap().spec().name, "second");
        assert_eq!(group.sensor_at(1).unwrap().spec().name, "b");
    }

    #[test]
    fn test_remove_absent_key_is_noop() {
        let mut group = SensorKeyGroup::new();
        group.add_sensor("a", sensor("a"));
        assert!(!group.remove_sensor("missing"));
        assert_eq!(group.sensor_count(), 1);
        assert!(group.remove_sensor("a"));
        assert_eq!(group.sensor_count(), 0);
    }

    #[test]
    fn test_replace_absent_key_acts_as_add() {
        let mut added = SensorKeyGroup::new();
        added.add_sensor("a", sensor("a"));

        let mut replaced = SensorKeyGroup::new();
        replaced.replace_sensor("a", sensor("a"));

        assert_eq!(replaced.sensor_count(), added.sensor_count());
        assert!(replaced.has_sensor_key("a"));
        assert_eq!(
            replaced.get_sensor("a").unwrap().spec().name,
            added.get_sensor("a").unwrap().spec().name
        );
    }

    #[test]
    fn test_replace_present_key_swaps_entry() {
        let mut group = SensorKeyGroup::new();
        group.add_sensor("a", sensor("old"));
        group.replace_sensor("a", sensor("new"));
        assert_eq!(group.sensor_count(), 1);
        assert_eq!(group.get_sensor("a").unwrap().spec().name, "new");
    }

    #[test]
    fn test_available_group_suppresses_paired_keys() {
        let mut group = AvailableDevicesGroup::new();
        group.add_sensor("a", sensor("a"));
        group.mark_paired("a");

        assert!(!group.has_sensor_key("a"));
        // Late scan result for the paired key is dropped
        group.add_sensor("a", sensor("a"));
        assert_eq!(group.sensor_count(), 0);

        group.mark_unpaired("a");
        group.add_sensor("a", sensor("a"));
        assert_eq!(group.sensor_count(), 1);
    }

    #[test]
    fn test_paired_group_pair() {
        let mut group = PairedDevicesGroup::new();
        group.pair("a", sensor("a"));
        assert!(group.has_sensor_key("a"));
        assert_eq!(group.sensor_count(), 1);
        assert!(group.remove_sensor("a"));
    }
}
