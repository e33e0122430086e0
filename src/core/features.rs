//! Per-window feature computation.
//!
//! Each non-empty window becomes one model-ready feature row: mean, standard
//! deviation, minimum and maximum of every sensor's non-null readings, plus
//! the window's phase label.

use crate::core::frame::SensorFrame;
use crate::core::labeling::SeizurePhase;
use crate::core::windowing::Window;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Summary statistics of one sensor within one window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorStats {
    pub mean: f64,
    /// Sample standard deviation (n-1); 0 when fewer than two readings
    pub std: f64,
    pub min: f64,
    pub max: f64,
    /// Number of non-null readings the stats were computed from
    pub count: usize,
}

/// One feature row of the output table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowFeatures {
    /// Sequential window number
    pub window: usize,
    /// Window start (epoch ms)
    pub start: i64,
    /// Window end (epoch ms, exclusive)
    pub end: i64,
    /// Window phase label
    pub phase: SeizurePhase,
    /// Numeric label code (0 = non-seizure, 1 = ictal, 2 = preictal)
    pub label: u8,
    /// Per-sensor stats; `None` when the sensor had no readings in the window
    pub sensors: BTreeMap<String, Option<SensorStats>>,
}

/// Compute the feature row for one window.
pub fn compute_features(frame: &SensorFrame, window: &Window) -> WindowFeatures {
    let mut sensors = BTreeMap::new();
    for (idx, sensor) in frame.sensors().iter().enumerate() {
        let values: Vec<f64> = window
            .rows
            .clone()
            .filter_map(|row| frame.value(idx, row))
            .collect();
        sensors.insert(sensor.clone(), sensor_stats(&values));
    }

    WindowFeatures {
        window: window.index,
        start: window.start,
        end: window.end,
        phase: window.phase,
        label: window.phase.code(),
        sensors,
    }
}

fn sensor_stats(values: &[f64]) -> Option<SensorStats> {
    if values.is_empty() {
        return None;
    }
    let std = if values.len() < 2 {
        0.0
    } else {
        values.iter().std_dev()
    };
    Some(SensorStats {
        mean: values.iter().mean(),
        std,
        min: Statistics::min(values.iter()),
        max: Statistics::max(values.iter()),
        count: values.len(),
    })
}

/// The exported feature table: one row per non-empty window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureTable {
    /// Unique identifier of this pipeline run
    pub run_id: Uuid,
    /// Study the recordings came from
    pub study: String,
    /// When the table was computed (RFC3339)
    pub generated_at_utc: String,
    /// Window size used for bucketing (ms)
    pub window_ms: i64,
    /// Preictal horizon used for labeling (ms)
    pub preictal_ms: i64,
    /// Sensor (column) names
    pub sensors: Vec<String>,
    pub windows: Vec<WindowFeatures>,
}

impl FeatureTable {
    pub fn new(
        study: impl Into<String>,
        window_ms: i64,
        preictal_ms: i64,
        sensors: Vec<String>,
        windows: Vec<WindowFeatures>,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            study: study.into(),
            generated_at_utc: Utc::now().to_rfc3339(),
            window_ms,
            preictal_ms,
            sensors,
            windows,
        }
    }

    /// Number of windows per phase (non-seizure, ictal, preictal).
    pub fn phase_counts(&self) -> (usize, usize, usize) {
        let mut counts = (0, 0, 0);
        for row in &self.windows {
            match row.phase {
                SeizurePhase::NonSeizure => counts.0 += 1,
                SeizurePhase::Ictal => counts.1 += 1,
                SeizurePhase::Preictal => counts.2 += 1,
            }
        }
        counts
    }
}
