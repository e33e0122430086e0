//! Time-indexed sensor table shared by all pipeline stages.
//!
//! A `SensorFrame` holds one column of optional readings per sensor over a
//! single sorted timestamp index (vendor epoch milliseconds), plus a seizure
//! phase label per row. All pipeline stages transform it in place.

use crate::core::labeling::SeizurePhase;
use std::collections::BTreeMap;
use std::ops::Range;

/// One sensor's raw samples as fetched from the platform, before alignment.
#[derive(Debug, Clone)]
pub struct SensorSeries {
    /// Channel name as reported by the platform (e.g. "Acc Mag")
    pub sensor: String,
    /// (epoch ms, reading) pairs; `None` marks a null sample
    pub samples: Vec<(i64, Option<f64>)>,
}

impl SensorSeries {
    pub fn new(sensor: impl Into<String>, samples: Vec<(i64, Option<f64>)>) -> Self {
        Self {
            sensor: sensor.into(),
            samples,
        }
    }
}

/// Columnar table of co-recorded sensor readings.
///
/// Invariant: timestamps are strictly increasing and shared by all columns.
/// A sensor with no reading at a given timestamp holds `None` there.
#[derive(Debug, Clone)]
pub struct SensorFrame {
    sensors: Vec<String>,
    times: Vec<i64>,
    columns: Vec<Vec<Option<f64>>>,
    labels: Vec<SeizurePhase>,
}

impl SensorFrame {
    /// Outer-merge per-sensor series on their timestamps.
    ///
    /// Every timestamp seen in any series becomes a row; sensors without a
    /// sample at that timestamp get `None`. Duplicate timestamps within one
    /// series resolve to the last sample. All rows start unlabeled
    /// (non-seizure).
    pub fn from_series(series: Vec<SensorSeries>) -> Self {
        let sensors: Vec<String> = series.iter().map(|s| s.sensor.clone()).collect();

        // time -> per-sensor value, BTreeMap keeps the index sorted
        let mut rows: BTreeMap<i64, Vec<Option<f64>>> = BTreeMap::new();
        for (idx, s) in series.iter().enumerate() {
            for &(time, value) in &s.samples {
                let row = rows.entry(time).or_insert_with(|| vec![None; sensors.len()]);
                row[idx] = value;
            }
        }

        let mut times = Vec::with_capacity(rows.len());
        let mut columns = vec![Vec::with_capacity(rows.len()); sensors.len()];
        for (time, row) in rows {
            times.push(time);
            for (idx, value) in row.into_iter().enumerate() {
                columns[idx].push(value);
            }
        }

        let labels = vec![SeizurePhase::NonSeizure; times.len()];
        Self {
            sensors,
            times,
            columns,
            labels,
        }
    }

    /// Sensor (column) names, in column order.
    pub fn sensors(&self) -> &[String] {
        &self.sensors
    }

    /// The shared timestamp index (epoch ms, strictly increasing).
    pub fn times(&self) -> &[i64] {
        &self.times
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Column index for a sensor name.
    pub fn sensor_index(&self, sensor: &str) -> Option<usize> {
        self.sensors.iter().position(|s| s == sensor)
    }

    /// One sensor's full column.
    pub fn column(&self, sensor_idx: usize) -> &[Option<f64>] {
        &self.columns[sensor_idx]
    }

    /// Reading for a sensor at a row.
    pub fn value(&self, sensor_idx: usize, row: usize) -> Option<f64> {
        self.columns[sensor_idx][row]
    }

    /// Overwrite a reading (used by normalization).
    pub fn set_value(&mut self, sensor_idx: usize, row: usize, value: Option<f64>) {
        self.columns[sensor_idx][row] = value;
    }

    /// Phase label for a row.
    pub fn label(&self, row: usize) -> SeizurePhase {
        self.labels[row]
    }

    pub fn set_label(&mut self, row: usize, phase: SeizurePhase) {
        self.labels[row] = phase;
    }

    /// All row labels, in index order.
    pub fn labels(&self) -> &[SeizurePhase] {
        &self.labels
    }

    /// Earliest timestamp, if any rows exist.
    pub fn min_time(&self) -> Option<i64> {
        self.times.first().copied()
    }

    /// Latest timestamp, if any rows exist.
    pub fn max_time(&self) -> Option<i64> {
        self.times.last().copied()
    }

    /// Row index range covering timestamps in `[start, end)`.
    pub fn row_range(&self, start: i64, end: i64) -> Range<usize> {
        let lo = self.times.partition_point(|&t| t < start);
        let hi = self.times.partition_point(|&t| t < end);
        lo..hi
    }

    /// Keep only rows for which `keep` returns true. Returns the number of
    /// rows removed.
    pub fn retain_rows<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(usize) -> bool,
    {
        let before = self.times.len();
        let kept: Vec<usize> = (0..before).filter(|&row| keep(row)).collect();
        if kept.len() == before {
            return 0;
        }

        self.times = kept.iter().map(|&row| self.times[row]).collect();
        self.labels = kept.iter().map(|&row| self.labels[row]).collect();
        for column in &mut self.columns {
            *column = kept.iter().map(|&row| column[row]).collect();
        }
        before - self.times.len()
    }
}
