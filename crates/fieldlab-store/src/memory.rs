//! In-memory reference implementation of the metadata store

use std::collections::HashMap;

use chrono::Utc;
use fieldlab_core::{
    ConnectableSensor, Experiment, ExperimentId, ProviderRegistry, SensorId, SensorLayout,
    SensorSpec,
};
use tracing::{debug, info};

use crate::file::StoreSnapshot;
use crate::store::{ExperimentSensors, MetadataStore, StoreError};

/// In-memory metadata store.
///
/// Experiments are kept in a plain `Vec` in most-recently-used order:
/// the front is the most recent, and `set_last_used_experiment` reorders
/// the list rather than keeping a separate recency structure. Expected
/// cardinality is tens of entries.
#[derive(Debug, Default)]
pub struct MemoryMetadataStore {
    /// Sensor records keyed by id string
    sensors: HashMap<String, SensorSpec>,
    /// Experiments, most recently used first
    experiments: Vec<Experiment>,
    /// Per-experiment attached sensor ids, insertion order
    included: HashMap<String, Vec<SensorId>>,
    /// Per-experiment explicitly detached sensor ids
    excluded: HashMap<String, Vec<SensorId>>,
    /// Per-experiment sensor card layouts
    layouts: HashMap<String, Vec<SensorLayout>>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            sensors: snapshot.sensors,
            experiments: snapshot.experiments,
            included: snapshot.included,
            excluded: snapshot.excluded,
            layouts: snapshot.layouts,
        }
    }

    pub(crate) fn to_snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            version: StoreSnapshot::current_version(),
            sensors: self.sensors.clone(),
            experiments: self.experiments.clone(),
            included: self.included.clone(),
            excluded: self.excluded.clone(),
            layouts: self.layouts.clone(),
        }
    }

    fn experiment_position(&self, id: &ExperimentId) -> Option<usize> {
        self.experiments.iter().position(|e| &e.id == id)
    }
}

impl MetadataStore for MemoryMetadataStore {
    fn add_or_get_external_sensor(
        &mut self,
        spec: &SensorSpec,
        providers: &ProviderRegistry,
    ) -> Result<SensorId, StoreError> {
        for (id, existing) in &self.sensors {
            if spec.is_same_sensor_and_spec(existing) {
                debug!(sensor = %id, "Spec already registered");
                return Ok(SensorId(id.clone()));
            }
        }

        let provider = providers
            .get(&spec.kind)
            .ok_or_else(|| StoreError::NoProvider(spec.kind.clone()))?;
        let owned = provider.build_spec(&spec.name, &spec.address, &spec.config);

        let mut suffix = 0;
        while self.sensors.contains_key(spec.sensor_id(suffix).as_str()) {
            suffix += 1;
        }
        let id = spec.sensor_id(suffix);
        self.sensors.insert(id.0.clone(), owned);
        info!(sensor = %id, kind = %spec.kind, "Registered external sensor");
        Ok(id)
    }

    fn get_external_sensor(&self, id: &SensorId) -> Option<SensorSpec> {
        self.sensors.get(id.as_str()).cloned()
    }

    fn external_sensors(&self) -> Vec<(SensorId, SensorSpec)> {
        let mut sensors: Vec<(SensorId, SensorSpec)> = self
            .sensors
            .iter()
            .map(|(id, spec)| (SensorId(id.clone()), spec.clone()))
            .collect();
        sensors.sort_by(|a, b| a.0 .0.cmp(&b.0 .0));
        sensors
    }

    fn remove_external_sensor(&mut self, id: &SensorId) {
        if self.sensors.remove(id.as_str()).is_some() {
            info!(sensor = %id, "Removed external sensor");
        }
    }

    fn add_sensor_to_experiment(&mut self, id: &SensorId, experiment: &ExperimentId) {
        if let Some(excluded) = self.excluded.get_mut(experiment.as_str()) {
            excluded.retain(|s| s != id);
        }
        let included = self.included.entry(experiment.0.clone()).or_default();
        if !included.contains(id) {
            included.push(id.clone());
        }
    }

    fn remove_sensor_from_experiment(&mut self, id: &SensorId, experiment: &ExperimentId) {
        if let Some(included) = self.included.get_mut(experiment.as_str()) {
            included.retain(|s| s != id);
        }
        let excluded = self.excluded.entry(experiment.0.clone()).or_default();
        if !excluded.contains(id) {
            excluded.push(id.clone());
        }
    }

    fn experiment_sensors(&self, experiment: &ExperimentId) -> ExperimentSensors {
        let mut sensors = ExperimentSensors::default();
        if let Some(ids) = self.included.get(experiment.as_str()) {
            for id in ids {
                // Ids can outlive their record; skip unresolved ones.
                match self.sensors.get(id.as_str()) {
                    Some(spec) => sensors
                        .included
                        .push(ConnectableSensor::connected(spec.clone(), id.clone())),
                    None => debug!(sensor = %id, "Skipping dangling sensor id"),
                }
            }
        }
        if let Some(ids) = self.excluded.get(experiment.as_str()) {
            sensors.excluded = ids.clone();
        }
        sensors
    }

    fn new_experiment(&mut self) -> Experiment {
        let now = Utc::now();
        let mut id = now.timestamp_millis().to_string();
        let mut n = 1;
        while self.experiments.iter().any(|e| e.id.as_str() == id) {
            id = format!("{}-{}", now.timestamp_millis(), n);
            n += 1;
        }
        let experiment = Experiment::new(ExperimentId(id), now);
        info!(experiment = %experiment.id, "Created experiment");
        self.experiments.insert(0, experiment.clone());
        experiment
    }

    fn get_experiment(&self, id: &ExperimentId) -> Option<Experiment> {
        self.experiments.iter().find(|e| &e.id == id).cloned()
    }

    fn delete_experiment(&mut self, id: &ExperimentId) {
        if let Some(position) = self.experiment_position(id) {
            self.experiments.remove(position);
            self.included.remove(id.as_str());
            self.excluded.remove(id.as_str());
            self.layouts.remove(id.as_str());
            info!(experiment = %id, "Deleted experiment");
        }
    }

    fn set_last_used_experiment(&mut self, id: &ExperimentId) {
        if let Some(position) = self.experiment_position(id) {
            let experiment = self.experiments.remove(position);
            self.experiments.insert(0, experiment);
        }
    }

    fn last_used_unarchived_experiment(&self) -> Option<Experiment> {
        self.experiments.iter().find(|e| !e.archived).cloned()
    }

    fn set_experiment_archived(&mut self, id: &ExperimentId, archived: bool) {
        if let Some(position) = self.experiment_position(id) {
            self.experiments[position].archived = archived;
        }
    }

    fn experiments(&self) -> Vec<Experiment> {
        self.experiments.clone()
    }

    fn set_experiment_sensor_layouts(
        &mut self,
        experiment: &ExperimentId,
        layouts: Vec<SensorLayout>,
    ) {
        self.layouts.insert(experiment.0.clone(), layouts);
    }

    fn experiment_sensor_layouts(&self, experiment: &ExperimentId) -> Vec<SensorLayout> {
        self.layouts
            .get(experiment.as_str())
            .cloned()
            .unwrap_or_default()
    }
}
