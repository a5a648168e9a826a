//! Fieldlab Core - Shared types for the sensor metadata system
//!
//! This crate provides the foundational types for Fieldlab:
//! - Sensor identity and connection specs with domain equivalence
//! - Provider lookup for rebuilding store-owned spec copies
//! - Experiments and per-experiment sensor layouts

pub mod experiment;
pub mod provider;
pub mod sensor;

pub use experiment::{Experiment, ExperimentId, SensorLayout};
pub use provider::{GenericSensorProvider, ProviderRegistry, SensorProvider};
pub use sensor::{ConnectableSensor, SensorId, SensorSpec};
