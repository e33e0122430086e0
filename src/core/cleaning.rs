//! Null and outlier screening of the labeled series.
//!
//! Per sensor, rows are flagged as null or as IQR outliers (Tukey fences over
//! the non-null readings). A row is only dropped when its timestamp is
//! flagged for *every* sensor and the row is labeled non-seizure; abnormal
//! readings during ictal or preictal spans are kept as signal.

use crate::core::frame::SensorFrame;
use crate::core::labeling::SeizurePhase;
use statrs::statistics::{Data, OrderStatistics, Statistics};
use std::collections::HashSet;
use std::fmt;

/// Basic distribution summary of one sensor's non-null readings.
#[derive(Debug, Clone, Copy)]
pub struct SummaryStats {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Outlier rows broken down by phase label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseCounts {
    pub non_seizure: usize,
    pub ictal: usize,
    pub preictal: usize,
}

impl PhaseCounts {
    fn record(&mut self, phase: SeizurePhase) {
        match phase {
            SeizurePhase::NonSeizure => self.non_seizure += 1,
            SeizurePhase::Ictal => self.ictal += 1,
            SeizurePhase::Preictal => self.preictal += 1,
        }
    }
}

/// Screening result for one sensor column.
#[derive(Debug, Clone)]
pub struct SensorReport {
    pub sensor: String,
    pub total_rows: usize,
    /// Timestamps of null readings, in index order
    pub null_times: Vec<i64>,
    /// Timestamps of IQR outliers, in index order
    pub outlier_times: Vec<i64>,
    /// Phase breakdown of the outlier rows
    pub outlier_phases: PhaseCounts,
    /// `None` when the column has no non-null readings
    pub stats: Option<SummaryStats>,
}

/// Screening result for the whole frame.
#[derive(Debug, Clone)]
pub struct CleaningReport {
    pub sensors: Vec<SensorReport>,
}

impl CleaningReport {
    /// Timestamps that are null for every sensor.
    pub fn common_null_times(&self) -> Vec<i64> {
        intersect_times(self.sensors.iter().map(|s| &s.null_times))
    }

    /// Timestamps that are outliers for every sensor.
    pub fn common_outlier_times(&self) -> Vec<i64> {
        intersect_times(self.sensors.iter().map(|s| &s.outlier_times))
    }
}

fn intersect_times<'a>(mut sets: impl Iterator<Item = &'a Vec<i64>>) -> Vec<i64> {
    let mut common: HashSet<i64> = match sets.next() {
        Some(first) => first.iter().copied().collect(),
        None => return Vec::new(),
    };
    for times in sets {
        let other: HashSet<i64> = times.iter().copied().collect();
        common.retain(|t| other.contains(t));
    }
    let mut out: Vec<i64> = common.into_iter().collect();
    out.sort_unstable();
    out
}

impl fmt::Display for CleaningReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for report in &self.sensors {
            writeln!(f, "sensor {}:", report.sensor)?;
            writeln!(
                f,
                "  nulls: {}/{}",
                report.null_times.len(),
                report.total_rows
            )?;
            writeln!(f, "  outliers: {}", report.outlier_times.len())?;
            let phases = report.outlier_phases;
            writeln!(
                f,
                "  outlier labels: non_seizure={} ictal={} preictal={}",
                phases.non_seizure, phases.ictal, phases.preictal
            )?;
            match report.stats {
                Some(s) => writeln!(
                    f,
                    "  stats: count={} mean={:.4} std={:.4} min={:.4} q1={:.4} median={:.4} q3={:.4} max={:.4}",
                    s.count, s.mean, s.std, s.min, s.q1, s.median, s.q3, s.max
                )?,
                None => writeln!(f, "  stats: no non-null readings")?,
            }
        }
        Ok(())
    }
}

/// What `remove_common` actually dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemovalSummary {
    pub common_null_times: usize,
    pub common_outlier_times: usize,
    pub rows_removed: usize,
}

/// Scan every sensor column for nulls and IQR outliers.
pub fn scan(frame: &SensorFrame) -> CleaningReport {
    let sensors = frame
        .sensors()
        .iter()
        .enumerate()
        .map(|(idx, sensor)| scan_sensor(frame, idx, sensor))
        .collect();
    CleaningReport { sensors }
}

fn scan_sensor(frame: &SensorFrame, sensor_idx: usize, sensor: &str) -> SensorReport {
    let times = frame.times();
    let column = frame.column(sensor_idx);

    let mut null_times = Vec::new();
    let mut values = Vec::new();
    for (row, value) in column.iter().enumerate() {
        match value {
            Some(v) => values.push(*v),
            None => null_times.push(times[row]),
        }
    }

    let mut outlier_times = Vec::new();
    let mut outlier_phases = PhaseCounts::default();
    let stats = summarize(&values);

    if let Some(s) = stats {
        let iqr = s.q3 - s.q1;
        let upper = s.q3 + 1.5 * iqr;
        let lower = s.q1 - 1.5 * iqr;
        for (row, value) in column.iter().enumerate() {
            if let Some(v) = value {
                // Upper fence inclusive, lower fence exclusive (study convention)
                if *v >= upper || *v < lower {
                    outlier_times.push(times[row]);
                    outlier_phases.record(frame.label(row));
                }
            }
        }
    }

    SensorReport {
        sensor: sensor.to_string(),
        total_rows: frame.len(),
        null_times,
        outlier_times,
        outlier_phases,
        stats,
    }
}

fn summarize(values: &[f64]) -> Option<SummaryStats> {
    if values.is_empty() {
        return None;
    }
    let mean = values.iter().mean();
    let std = if values.len() < 2 {
        0.0
    } else {
        values.iter().std_dev()
    };
    let mut data = Data::new(values.to_vec());
    Some(SummaryStats {
        count: values.len(),
        mean,
        std,
        min: Statistics::min(values.iter()),
        q1: data.lower_quartile(),
        median: data.median(),
        q3: data.upper_quartile(),
        max: Statistics::max(values.iter()),
    })
}

/// Drop non-seizure rows whose timestamp is null for all sensors or an
/// outlier for all sensors.
pub fn remove_common(frame: &mut SensorFrame, report: &CleaningReport) -> RemovalSummary {
    let common_nulls = report.common_null_times();
    let common_outliers = report.common_outlier_times();

    let mut drop_times: HashSet<i64> = common_nulls.iter().copied().collect();
    drop_times.extend(common_outliers.iter().copied());

    let times = frame.times().to_vec();
    let labels = frame.labels().to_vec();
    let rows_removed = frame.retain_rows(|row| {
        !(drop_times.contains(&times[row]) && labels[row] == SeizurePhase::NonSeizure)
    });

    RemovalSummary {
        common_null_times: common_nulls.len(),
        common_outlier_times: common_outliers.len(),
        rows_removed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frame::SensorSeries;
    use crate::core::labeling::{apply_labels, SeizureEvent};

    fn spread_with_spike() -> Vec<(i64, Option<f64>)> {
        // 1..=9 plus one far outlier at t=9000
        let mut samples: Vec<(i64, Option<f64>)> = (1..=9)
            .map(|i| (i as i64 * 1_000, Some(i as f64)))
            .collect();
        samples.push((9_000 + 1_000, Some(100.0)));
        samples
    }

    #[test]
    fn test_scan_flags_iqr_outlier() {
        let frame = SensorFrame::from_series(vec![SensorSeries::new("EDA", spread_with_spike())]);
        let report = scan(&frame);

        assert_eq!(report.sensors.len(), 1);
        let eda = &report.sensors[0];
        assert_eq!(eda.outlier_times, vec![10_000]);
        assert!(eda.null_times.is_empty());
        let stats = eda.stats.unwrap();
        assert_eq!(stats.count, 10);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 100.0);
    }

    #[test]
    fn test_scan_counts_nulls() {
        let frame = SensorFrame::from_series(vec![SensorSeries::new(
            "TEMP",
            vec![(0, Some(36.0)), (10, None), (20, None)],
        )]);
        let report = scan(&frame);
        assert_eq!(report.sensors[0].null_times, vec![10, 20]);
    }

    #[test]
    fn test_common_sets_are_intersections() {
        // Outlier at t=10_000 on both sensors, extra outlier on EDA only
        let mut eda = spread_with_spike();
        eda[0].1 = Some(-100.0); // low-side outlier at t=1000, EDA only
        let temp = spread_with_spike();

        let frame = SensorFrame::from_series(vec![
            SensorSeries::new("EDA", eda),
            SensorSeries::new("TEMP", temp),
        ]);
        let report = scan(&frame);

        assert!(report.sensors[0].outlier_times.contains(&1_000));
        assert_eq!(report.common_outlier_times(), vec![10_000]);
    }

    #[test]
    fn test_remove_common_spares_labeled_rows() {
        let frame_series = vec![
            SensorSeries::new("EDA", spread_with_spike()),
            SensorSeries::new("TEMP", spread_with_spike()),
        ];
        let mut frame = SensorFrame::from_series(frame_series.clone());

        // Outlier row at t=10_000 is non-seizure: dropped
        let report = scan(&frame);
        let summary = remove_common(&mut frame, &report);
        assert_eq!(summary.common_outlier_times, 1);
        assert_eq!(summary.rows_removed, 1);
        assert!(!frame.times().contains(&10_000));

        // Same data, but the outlier row falls inside a seizure: kept
        let mut frame = SensorFrame::from_series(frame_series);
        apply_labels(&mut frame, &[SeizureEvent::new(9_500, 1_000)], 0);
        let report = scan(&frame);
        let summary = remove_common(&mut frame, &report);
        assert_eq!(summary.rows_removed, 0);
        assert!(frame.times().contains(&10_000));
    }

    #[test]
    fn test_remove_common_drops_all_null_rows() {
        let mut frame = SensorFrame::from_series(vec![
            SensorSeries::new("EDA", vec![(0, Some(1.0)), (10, None), (20, Some(2.0))]),
            SensorSeries::new("TEMP", vec![(0, Some(36.0)), (10, None), (20, None)]),
        ]);
        let report = scan(&frame);
        let summary = remove_common(&mut frame, &report);

        // Only t=10 is null for both sensors
        assert_eq!(summary.common_null_times, 1);
        assert_eq!(summary.rows_removed, 1);
        assert_eq!(frame.times(), &[0, 20]);
    }
}
