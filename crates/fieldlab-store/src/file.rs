//! JSON-snapshot-backed metadata store
//!
//! The file store keeps the full in-memory store and writes a versioned
//! JSON snapshot after every mutation. A failed save is logged and the
//! in-memory state stays authoritative; `save` is also public so callers
//! can surface persistence failures explicitly.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use fieldlab_core::{
    Experiment, ExperimentId, ProviderRegistry, SensorId, SensorLayout, SensorSpec,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::memory::MemoryMetadataStore;
use crate::store::{ExperimentSensors, MetadataStore, StoreError};

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// On-disk representation of the full store state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Version of the snapshot format
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub sensors: HashMap<String, SensorSpec>,
    #[serde(default)]
    pub experiments: Vec<Experiment>,
    #[serde(default)]
    pub included: HashMap<String, Vec<SensorId>>,
    #[serde(default)]
    pub excluded: HashMap<String, Vec<SensorId>>,
    #[serde(default)]
    pub layouts: HashMap<String, Vec<SensorLayout>>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl StoreSnapshot {
    pub(crate) fn current_version() -> String {
        default_version()
    }
}

/// Metadata store persisted as a JSON snapshot file
pub struct FileMetadataStore {
    path: PathBuf,
    inner: MemoryMetadataStore,
}

impl FileMetadataStore {
    /// Open the store at `path`, creating an empty one if the file does
    /// not exist
    pub fn load_or_create(path: impl Into<PathBuf>) -> Result<Self, PersistError> {
        let path = path.into();
        let inner = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let snapshot: StoreSnapshot = serde_json::from_str(&content)?;
            info!(path = %path.display(), "Loaded metadata store");
            MemoryMetadataStore::from_snapshot(snapshot)
        } else {
            info!(path = %path.display(), "Metadata store not found, starting empty");
            MemoryMetadataStore::new()
        };
        Ok(Self { path, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the current snapshot to disk
    pub fn save(&self) -> Result<(), PersistError> {
        let content = serde_json::to_string_pretty(&self.inner.to_snapshot())?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    fn autosave(&self) {
        if let Err(e) = self.save() {
            warn!(path = %self.path.display(), error = %e, "Failed to save metadata store");
        }
    }
}

impl MetadataStore for FileMetadataStore {
    fn add_or_get_external_sensor(
        &mut self,
        spec: &SensorSpec,
        providers: &ProviderRegistry,
    ) -> Result<SensorId, StoreError> {
        let id = self.inner.add_or_get_external_sensor(spec, providers)?;
        self.autosave();
        Ok(id)
    }

    fn get_external_sensor(&self, id: &SensorId) -> Option<SensorSpec> {
        self.inner.get_external_sensor(id)
    }

    fn external_sensors(&self) -> Vec<(SensorId, SensorSpec)> {
        self.inner.external_sensors()
    }

    fn remove_external_sensor(&mut self, id: &SensorId) {
        self.inner.remove_external_sensor(id);
        self.autosave();
    }

    fn add_sensor_to_experiment(&mut self, id: &SensorId, experiment: &ExperimentId) {
        self.inner.add_sensor_to_experiment(id, experiment);
        self.autosave();
    }

    fn remove_sensor_from_experiment(&mut self, id: &SensorId, experiment: &ExperimentId) {
        self.inner.remove_sensor_from_experiment(id, experiment);
        self.autosave();
    }

    fn experiment_sensors(&self, experiment: &ExperimentId) -> ExperimentSensors {
        self.inner.experiment_sensors(experiment)
    }

    fn new_experiment(&mut self) -> Experiment {
        let experiment = self.inner.new_experiment();
        self.autosave();
        experiment
    }

    fn get_experiment(&self, id: &ExperimentId) -> Option<Experiment> {
        self.inner.get_experiment(id)
    }

    fn delete_experiment(&mut self, id: &ExperimentId) {
        self.inner.delete_experiment(id);
        self.autosave();
    }

    fn set_last_used_experiment(&mut self, id: &ExperimentId) {
        self.inner.set_last_used_experiment(id);
        self.autosave();
    }

    fn last_used_unarchived_experiment(&self) -> Option<Experiment> {
        self.inner.last_used_unarchived_experiment()
    }

    fn set_experiment_archived(&mut self, id: &ExperimentId, archived: bool) {
        self.inner.set_experiment_archived(id, archived);
        self.autosave();
    }

    fn experiments(&self) -> Vec<Experiment> {
        self.inner.experiments()
    }

    fn set_experiment_sensor_layouts(
        &mut self,
        experiment: &ExperimentId,
        layouts: Vec<SensorLayout>,
    ) {
        self.inner.set_experiment_sensor_layouts(experiment, layouts);
        self.autosave();
    }

    fn experiment_sensor_layouts(&self, experiment: &ExperimentId) -> Vec<SensorLayout> {
        self.inner.experiment_sensor_layouts(experiment)
    }
}
