//! Experiments and per-experiment sensor layouts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier for an experiment, derived from its creation timestamp
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExperimentId(pub String);

impl ExperimentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ExperimentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A recording session that sensors are attached to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experiment {
    pub id: ExperimentId,
    pub created_at: DateTime<Utc>,
    /// User-assigned title, empty until set
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub archived: bool,
}

impl Experiment {
    pub fn new(id: ExperimentId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            created_at,
            title: String::new(),
            archived: false,
        }
    }
}

/// Display configuration for one sensor card within an experiment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorLayout {
    /// Store id of the sensor this layout shows
    pub sensor_id: String,
    /// Card accent color
    #[serde(default)]
    pub color: i32,
    /// Whether audio feedback is enabled for this card
    #[serde(default)]
    pub audio_enabled: bool,
    /// Whether the stats overlay is shown
    #[serde(default)]
    pub show_stats: bool,
}

impl SensorLayout {
    pub fn new(sensor_id: impl Into<String>) -> Self {
        Self {
            sensor_id: sensor_id.into(),
            color: 0,
            audio_enabled: false,
            show_stats: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_experiment_defaults() {
        let experiment = Experiment::new(ExperimentId("1700000000000".to_string()), Utc::now());
        assert!(experiment.title.is_empty());
        assert!(!experiment.archived);
    }

    #[test]
    fn test_layout_defaults() {
        let layout = SensorLayout::new("ble-thermo-0");
        assert_eq!(layout.sensor_id, "ble-thermo-0");
        assert_eq!(layout.color, 0);
        assert!(!layout.audio_enabled);
    }
}
