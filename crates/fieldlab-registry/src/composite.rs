//! Composite registry: composes ordered sensor groups into one logical
//! addressable sequence
//!
//! Each child carries a global start offset, the count of all entries in
//! children ordered strictly before it. Offsets are pushed to children
//! synchronously at the end of every size-changing mutation, so reads
//! always observe fully-consistent offsets and translating a local
//! position to a global one is a single addition.

use fieldlab_core::ConnectableSensor;
use tracing::warn;

use crate::group::{AvailableDevicesGroup, PairedDevicesGroup, SensorGroup, SensorKeyGroup};

/// A sensor group that can take part in a [`CompositeRegistry`]
pub trait RegistryMember: SensorGroup {
    /// Store the offset at which this member's first local entry appears
    /// in the flattened global sequence
    fn inform_global_start(&mut self, offset: usize);

    fn global_start(&self) -> usize;

    /// Translate a local position into a global one
    fn global_position(&self, local: usize) -> usize {
        self.global_start() + local
    }
}

impl RegistryMember for SensorKeyGroup {
    fn inform_global_start(&mut self, offset: usize) {
        self.set_global_start(offset);
    }

    fn global_start(&self) -> usize {
        SensorKeyGroup::global_start(self)
    }
}

impl RegistryMember for AvailableDevicesGroup {
    fn inform_global_start(&mut self, offset: usize) {
        self.inner_mut().set_global_start(offset);
    }

    fn global_start(&self) -> usize {
        self.inner().global_start()
    }
}

impl RegistryMember for PairedDevicesGroup {
    fn inform_global_start(&mut self, offset: usize) {
        self.inner_mut().set_global_start(offset);
    }

    fn global_start(&self) -> usize {
        self.inner().global_start()
    }
}

/// Ordered composition of independently-mutable sensor groups.
///
/// Children keep their composition order; no reordering happens as a side
/// effect of add/remove. After every public call returns, the invariant
/// `offset(child[i+1]) == offset(child[i]) + size(child[i])` holds.
#[derive(Default)]
pub struct CompositeRegistry {
    children: Vec<Box<dyn RegistryMember>>,
    global_start: usize,
}

impl CompositeRegistry {
    /// Build a registry over `children`, assigning initial offsets
    /// left-to-right by running sum of preceding sizes
    pub fn compose(children: Vec<Box<dyn RegistryMember>>) -> Self {
        let mut registry = Self {
            children,
            global_start: 0,
        };
        registry.push_offsets(0);
        registry
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn child(&self, index: usize) -> Option<&dyn RegistryMember> {
        self.children.get(index).map(|c| c.as_ref())
    }

    /// Add (or overwrite) a sensor in the child at `index`
    pub fn add_sensor_at(&mut self, index: usize, key: &str, sensor: ConnectableSensor) {
        let child = match self.children.get_mut(index) {
            Some(child) => child,
            None => {
                warn!(child = index, key, "No such child in composite");
                return;
            }
        };
        let before = child.sensor_count();
        child.add_sensor(key, sensor);
        if child.sensor_count() != before {
            self.push_offsets(index + 1);
        }
    }

    /// Remove a sensor from the child at `index`; absent keys are a no-op
    pub fn remove_sensor_at(&mut self, index: usize, key: &str) -> bool {
        let child = match self.children.get_mut(index) {
            Some(child) => child,
            None => {
                warn!(child = index, key, "No such child in composite");
                return false;
            }
        };
        let removed = child.remove_sensor(key);
        if removed {
            self.push_offsets(index + 1);
        }
        removed
    }

    /// Replace a sensor in the child at `index`; an absent key inserts
    pub fn replace_sensor_at(&mut self, index: usize, key: &str, sensor: ConnectableSensor) {
        let child = match self.children.get_mut(index) {
            Some(child) => child,
            None => {
                warn!(child = index, key, "No such child in composite");
                return;
            }
        };
        let before = child.sensor_count();
        child.replace_sensor(key, sensor);
        if child.sensor_count() != before {
            self.push_offsets(index + 1);
        }
    }

    /// Recompute offsets for children `first..` and push each one its new
    /// value. Children before `first` are unaffected by construction and
    /// are not re-notified.
    fn push_offsets(&mut self, first: usize) {
        let mut offset = self.global_start;
        for child in self.children.iter().take(first) {
            offset += child.sensor_count();
        }
        for child in self.children.iter_mut().skip(first) {
            child.inform_global_start(offset);
            offset += child.sensor_count();
        }
    }
}

impl SensorGroup for CompositeRegistry {
    fn has_sensor_key(&self, key: &str) -> bool {
        self.children.iter().any(|c| c.has_sensor_key(key))
    }

    /// Routes to the child that owns `key`, or the last child for new keys
    fn add_sensor(&mut self, key: &str, sensor: ConnectableSensor) {
        if self.children.is_empty() {
            warn!(key, "Composite has no children to add to");
            return;
        }
        let index = self
            .children
            .iter()
            .position(|c| c.has_sensor_key(key))
            .unwrap_or(self.children.len() - 1);
        self.add_sensor_at(index, key, sensor);
    }

    fn remove_sensor(&mut self, key: &str) -> bool {
        match self.children.iter().position(|c| c.has_sensor_key(key)) {
            Some(index) => self.remove_sensor_at(index, key),
            None => false,
        }
    }

    fn sensor_count(&self) -> usize {
        self.children.iter().map(|c| c.sensor_count()).sum()
    }
}

impl RegistryMember for CompositeRegistry {
    /// A nested composite re-biases all of its children from the offset
    /// its parent pushed
    fn inform_global_start(&mut self, offset: usize) {
        self.global_start = offset;
        self.push_offsets(0);
    }

    fn global_start(&self) -> usize {
        self.global_start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldlab_core::SensorSpec;
    use std::cell::Cell;
    use std::rc::Rc;

    fn sensor(name: &str) -> ConnectableSensor {
        ConnectableSensor::disconnected(SensorSpec::new("ble", name, name))
    }

    fn group_of(count: usize, prefix: &str) -> SensorKeyGroup {
        let mut group = SensorKeyGroup::new();
        for i in 0..count {
            let key = format!("{}{}", prefix, i);
            group.add_sensor(&key, sensor(&key));
        }
        group
    }

    /// Group wrapper that counts offset notifications
    struct CountingGroup {
        inner: SensorKeyGroup,
        informs: Rc<Cell<usize>>,
    }

    impl CountingGroup {
        fn new(inner: SensorKeyGroup) -> (Self, Rc<Cell<usize>>) {
            let informs = Rc::new(Cell::new(0));
            (
                Self {
                    inner,
                    informs: informs.clone(),
                },
                informs,
            )
        }
    }

    impl SensorGroup for CountingGroup {
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

    impl RegistryMember for CountingGroup {
        fn inform_global_start(&mut self, offset: usize) {
            self.informs.set(self.informs.get() + 1);
            self.inner.set_global_start(offset);
        }
        fn global_start(&self) -> usize {
            self.inner.global_start()
        }
    }

    #[test]
    fn test_initial_offsets_are_running_sums() {
        let registry = CompositeRegistry::compose(vec![
            Box::new(group_of(3, "a")),
            Box::new(group_of(0, "b")),
            Box::new(group_of(5, "c")),
        ]);

        assert_eq!(registry.child(0).unwrap().global_start(), 0);
        assert_eq!(registry.child(1).unwrap().global_start(), 3);
        assert_eq!(registry.child(2).unwrap().global_start(), 3);
        assert_eq!(registry.sensor_count(), 8);
    }

    #[test]
    fn test_growth_shifts_later_children_only() {
        let (counting0, informs0) = CountingGroup::new(group_of(3, "a"));
        let (counting2, informs2) = CountingGroup::new(group_of(5, "c"));

        let mut registry = CompositeRegistry::compose(vec![
            Box::new(counting0),
            Box::new(group_of(0, "b")),
            Box::new(counting2),
        ]);
        let informed_before_0 = informs0.get();
        let informed_before_2 = informs2.get();

        registry.add_sensor_at(1, "b0", sensor("b0"));
        registry.add_sensor_at(1, "b1", sensor("b1"));

        assert_eq!(registry.child(0).unwrap().global_start(), 0);
        assert_eq!(registry.child(1).unwrap().global_start(), 3);
        assert_eq!(registry.child(2).unwrap().global_start(), 5);

        // Child 2 heard about both insertions, child 0 about neither
        assert_eq!(informs2.get(), informed_before_2 + 2);
        assert_eq!(informs0.get(), informed_before_0);
    }

    #[test]
    fn test_remove_shrinks_later_offsets() {
        let mut registry = CompositeRegistry::compose(vec![
            Box::new(group_of(3, "a")),
            Box::new(group_of(2, "b")),
            Box::new(group_of(5, "c")),
        ]);

        assert!(registry.remove_sensor_at(0, "a0"));
        assert_eq!(registry.child(1).unwrap().global_start(), 2);
        assert_eq!(registry.child(2).unwrap().global_start(), 4);

        // Removing an absent key changes nothing
        assert!(!registry.remove_sensor_at(0, "a0"));
        assert_eq!(registry.child(1).unwrap().global_start(), 2);
    }

    #[test]
    fn test_replace_present_key_does_not_renotify() {
        let (counting, informs) = CountingGroup::new(group_of(2, "b"));
        let mut registry = CompositeRegistry::compose(vec![
            Box::new(group_of(1, "a")),
            Box::new(counting),
        ]);
        let informed_before = informs.get();

        registry.replace_sensor_at(0, "a0", sensor("swap"));
        assert_eq!(informs.get(), informed_before);

        // Replace of an absent key inserts and does shift the sibling
        registry.replace_sensor_at(0, "a9", sensor("a9"));
        assert_eq!(informs.get(), informed_before + 1);
        assert_eq!(registry.child(1).unwrap().global_start(), 2);
    }

    #[test]
    fn test_global_position_is_offset_plus_local() {
        let registry = CompositeRegistry::compose(vec![
            Box::new(group_of(3, "a")),
            Box::new(group_of(4, "b")),
        ]);
        let child = registry.child(1).unwrap();
        assert_eq!(child.global_position(0), 3);
        assert_eq!(child.global_position(2), 5);
    }

    #[test]
    fn test_nested_composite_rebias() {
        let inner = CompositeRegistry::compose(vec![
            Box::new(group_of(2, "x")),
            Box::new(group_of(1, "y")),
        ]);
        let mut outer = CompositeRegistry::compose(vec![
            Box::new(group_of(3, "a")),
            Box::new(inner),
        ]);

        // Inner composite sits after the 3-entry leading group, so its own
        // children are biased from 3
        assert_eq!(outer.child(1).unwrap().global_start(), 3);
        assert_eq!(outer.sensor_count(), 6);

        // Growing the leading group cascades through the nested composite
        outer.add_sensor_at(0, "a9", sensor("a9"));
        assert_eq!(outer.child(1).unwrap().global_start(), 4);
    }

    #[test]
    fn test_composite_as_group_routes_by_key() {
        let mut registry = CompositeRegistry::compose(vec![
            Box::new(group_of(2, "a")),
            Box::new(group_of(1, "b")),
        ]);

        // Unknown keys go to the last child
        registry.add_sensor("new", sensor("new"));
        assert_eq!(registry.child(1).unwrap().sensor_count(), 2);

        // Known keys overwrite where they live
        registry.add_sensor("a0", sensor("swap"));
        assert_eq!(registry.child(0).unwrap().sensor_count(), 2);

        assert!(registry.remove_sensor("a1"));
        assert!(!registry.remove_sensor("a1"));
        assert_eq!(registry.sensor_count(), 3);
        assert_eq!(registry.child(1).unwrap().global_start(), 1);
    }
}
