//! Seizure-phase labeling of the synchronized time series.
//!
//! Each row is labeled from the study's clinical annotations: ictal while an
//! annotated event is active, preictal within the configured horizon before
//! an event starts, non-seizure otherwise. Ictal takes precedence when the
//! preictal horizon of one event overlaps another event.

use crate::core::frame::SensorFrame;
use serde::{Deserialize, Serialize};

/// Default preictal horizon: 30 minutes before seizure onset.
pub const DEFAULT_PREICTAL_MS: i64 = 30 * 60 * 1000;

/// Phase of a sample relative to the annotated seizure events.
///
/// Numeric codes match the study's labeling convention
/// (0 = non-seizure, 1 = ictal, 2 = preictal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeizurePhase {
    NonSeizure,
    Ictal,
    Preictal,
}

impl SeizurePhase {
    /// Numeric label code used in exported feature tables.
    pub fn code(self) -> u8 {
        match self {
            SeizurePhase::NonSeizure => 0,
            SeizurePhase::Ictal => 1,
            SeizurePhase::Preictal => 2,
        }
    }
}

/// A clinically annotated seizure event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeizureEvent {
    /// Seizure onset (epoch ms)
    pub start_time: i64,
    /// Event duration (ms)
    pub duration: i64,
}

impl SeizureEvent {
    pub fn new(start_time: i64, duration: i64) -> Self {
        Self {
            start_time,
            duration,
        }
    }

    /// Whether the event is active at `time` (inclusive of both ends).
    pub fn covers(&self, time: i64) -> bool {
        self.start_time <= time && time <= self.start_time + self.duration
    }

    /// Whether `time` falls in the preictal horizon before this event.
    pub fn preictal_covers(&self, time: i64, preictal_ms: i64) -> bool {
        self.start_time - preictal_ms <= time && time < self.start_time
    }
}

/// Phase of a single timestamp against a set of events.
pub fn phase_at(time: i64, events: &[SeizureEvent], preictal_ms: i64) -> SeizurePhase {
    if events.iter().any(|e| e.covers(time)) {
        return SeizurePhase::Ictal;
    }
    if events.iter().any(|e| e.preictal_covers(time, preictal_ms)) {
        return SeizurePhase::Preictal;
    }
    SeizurePhase::NonSeizure
}

/// Label every row of the frame in place.
pub fn apply_labels(frame: &mut SensorFrame, events: &[SeizureEvent], preictal_ms: i64) {
    for row in 0..frame.len() {
        let time = frame.times()[row];
        frame.set_label(row, phase_at(time, events, preictal_ms));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frame::SensorSeries;

    fn frame_with_times(times: &[i64]) -> SensorFrame {
        SensorFrame::from_series(vec![SensorSeries::new(
            "EDA",
            times.iter().map(|&t| (t, Some(1.0))).collect(),
        )])
    }

    #[test]
    fn test_phase_at_ictal_bounds_inclusive() {
        let events = [SeizureEvent::new(1_000, 500)];

        assert_eq!(phase_at(1_000, &events, 100), SeizurePhase::Ictal);
        assert_eq!(phase_at(1_250, &events, 100), SeizurePhase::Ictal);
        assert_eq!(phase_at(1_500, &events, 100), SeizurePhase::Ictal);
        assert_eq!(phase_at(1_501, &events, 100), SeizurePhase::NonSeizure);
    }

    #[test]
    fn test_phase_at_preictal_half_open() {
        let events = [SeizureEvent::new(1_000, 500)];

        // Horizon start is inclusive, onset itself is ictal
        assert_eq!(phase_at(900, &events, 100), SeizurePhase::Preictal);
        assert_eq!(phase_at(999, &events, 100), SeizurePhase::Preictal);
        assert_eq!(phase_at(899, &events, 100), SeizurePhase::NonSeizure);
    }

    #[test]
    fn test_ictal_wins_over_overlapping_preictal() {
        // Second event's preictal horizon covers the first event's active span
        let events = [SeizureEvent::new(1_000, 500), SeizureEvent::new(2_000, 100)];

        assert_eq!(phase_at(1_400, &events, 1_000), SeizurePhase::Ictal);
        assert_eq!(phase_at(1_600, &events, 1_000), SeizurePhase::Preictal);
    }

    #[test]
    fn test_apply_labels_rows() {
        let mut frame = frame_with_times(&[0, 950, 1_100, 1_600]);
        let events = [SeizureEvent::new(1_000, 500)];

        apply_labels(&mut frame, &events, 100);

        assert_eq!(frame.label(0), SeizurePhase::NonSeizure);
        assert_eq!(frame.label(1), SeizurePhase::Preictal);
        assert_eq!(frame.label(2), SeizurePhase::Ictal);
        assert_eq!(frame.label(3), SeizurePhase::NonSeizure);
    }

    #[test]
    fn test_no_events_leaves_non_seizure() {
        let mut frame = frame_with_times(&[0, 10, 20]);
        apply_labels(&mut frame, &[], DEFAULT_PREICTAL_MS);
        assert!(frame
            .labels()
            .iter()
            .all(|&l| l == SeizurePhase::NonSeizure));
    }

    #[test]
    fn test_phase_codes() {
        assert_eq!(SeizurePhase::NonSeizure.code(), 0);
        assert_eq!(SeizurePhase::Ictal.code(), 1);
        assert_eq!(SeizurePhase::Preictal.code(), 2);
    }
}
