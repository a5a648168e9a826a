//! Fieldlab Registry - Sensor group collections and composite addressing
//!
//! This crate provides:
//! - The [`SensorGroup`] contract and its concrete backends (plain keyed
//!   groups, available-devices and paired-devices views)
//! - [`CompositeRegistry`], which composes independently-resizable groups
//!   into one logically contiguous, globally addressable sequence

pub mod composite;
pub mod group;

pub use composite::{CompositeRegistry, RegistryMember};
pub use group::{AvailableDevicesGroup, PairedDevicesGroup, SensorGroup, SensorKeyGroup};
