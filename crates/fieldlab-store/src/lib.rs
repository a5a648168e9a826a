//! Fieldlab Store - Sensor identity and experiment metadata
//!
//! The store is the single source of truth for external sensor identity:
//! registration deduplicates equivalent specs, assigns collision-free ids
//! with the lowest free numeric suffix, and tracks which sensors each
//! experiment has attached or explicitly detached.
//!
//! Two implementations share the [`MetadataStore`] contract:
//! - [`MemoryMetadataStore`] - the in-memory reference implementation
//! - [`FileMetadataStore`] - a JSON-snapshot-backed implementation

pub mod file;
pub mod memory;
pub mod store;

pub use file::{FileMetadataStore, PersistError, StoreSnapshot};
pub use memory::MemoryMetadataStore;
pub use store::{ExperimentSensors, MetadataStore, StoreError};
