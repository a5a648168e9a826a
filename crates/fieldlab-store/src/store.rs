//! The metadata store contract

use fieldlab_core::{
    ConnectableSensor, Experiment, ExperimentId, ProviderRegistry, SensorId, SensorLayout,
    SensorSpec,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("no provider registered for sensor kind {0}")]
    NoProvider(String),
}

/// Sensors attached to and explicitly detached from one experiment.
///
/// `excluded` holds raw ids rather than resolved sensors: an id stays in
/// the excluded set even after its backing record is deleted, so that the
/// sensor is not auto-attached again if it reappears.
#[derive(Debug, Clone, Default)]
pub struct ExperimentSensors {
    pub included: Vec<ConnectableSensor>,
    pub excluded: Vec<SensorId>,
}

/// Contract shared by all metadata store implementations.
///
/// Reads never fail on missing keys: lookups return `Option` or empty
/// collections. Removals and experiment set moves are idempotent so
/// concurrent callers racing on the same key degrade to no-ops.
pub trait MetadataStore {
    /// Register a sensor spec, returning the id of an equivalent existing
    /// record if there is one. A new record is cloned through the provider
    /// for its kind and assigned the lowest free numeric suffix.
    fn add_or_get_external_sensor(
        &mut self,
        spec: &SensorSpec,
        providers: &ProviderRegistry,
    ) -> Result<SensorId, StoreError>;

    fn get_external_sensor(&self, id: &SensorId) -> Option<SensorSpec>;

    /// All registered sensors, sorted by id
    fn external_sensors(&self) -> Vec<(SensorId, SensorSpec)>;

    /// Delete a sensor record; absent ids are a no-op
    fn remove_external_sensor(&mut self, id: &SensorId);

    /// Attach a sensor to an experiment, clearing any exclusion
    fn add_sensor_to_experiment(&mut self, id: &SensorId, experiment: &ExperimentId);

    /// Detach a sensor from an experiment, recording the exclusion
    fn remove_sensor_from_experiment(&mut self, id: &SensorId, experiment: &ExperimentId);

    /// Resolved included sensors plus raw excluded ids. Included ids whose
    /// record has been deleted are silently skipped.
    fn experiment_sensors(&self, experiment: &ExperimentId) -> ExperimentSensors;

    /// Create an experiment with a timestamp-derived id at the front of
    /// the most-recently-used ordering
    fn new_experiment(&mut self) -> Experiment;

    fn get_experiment(&self, id: &ExperimentId) -> Option<Experiment>;

    /// Delete an experiment along with its layouts and sensor sets
    fn delete_experiment(&mut self, id: &ExperimentId);

    /// Move an experiment to the front of the most-recently-used ordering
    fn set_last_used_experiment(&mut self, id: &ExperimentId);

    /// Most recently used experiment that is not archived
    fn last_used_unarchived_experiment(&self) -> Option<Experiment>;

    fn set_experiment_archived(&mut self, id: &ExperimentId, archived: bool);

    /// All experiments, most recently used first
    fn experiments(&self) -> Vec<Experiment>;

    /// Replace the full ordered layout sequence for an experiment
    fn set_experiment_sensor_layouts(
        &mut self,
        experiment: &ExperimentId,
        layouts: Vec<SensorLayout>,
    );

    /// Layouts for an experiment; never-written experiments yield an
    /// empty sequence
    fn experiment_sensor_layouts(&self, experiment: &ExperimentId) -> Vec<SensorLayout>;
}
