//! Sequential pipeline driver.
//!
//! One run is a straight line: resolve the study, synchronize segment
//! metadata, fetch and merge the raw series, label, clean, optionally
//! normalize, then window and extract features. Every stage finishes before
//! the next starts; failures propagate to the caller.

use crate::client::{ApiError, BlockingClient, StudySummary};
use crate::core::cleaning::{remove_common, scan, CleaningReport, RemovalSummary};
use crate::core::features::{compute_features, FeatureTable, WindowFeatures};
use crate::core::frame::{SensorFrame, SensorSeries};
use crate::core::labeling::{apply_labels, SeizureEvent};
use crate::core::normalize::min_max;
use crate::core::windowing::{build_windows, default_window_ms};
use crate::sync::{sync_metadata, SyncError, SyncedMetadata};

/// Pipeline errors.
#[derive(Debug)]
pub enum PipelineError {
    Api(ApiError),
    Sync(SyncError),
    /// No study with the given name on the platform
    StudyNotFound(String),
    /// The study has no label groups to read annotations from
    NoLabelGroups(String),
    /// No annotated events and no explicit window size
    NoWindowSize,
    /// Explicit window size that is zero or negative
    InvalidWindowSize(i64),
    /// No rows to process (empty study, or everything was cleaned away)
    EmptyData,
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::Api(e) => write!(f, "{e}"),
            PipelineError::Sync(e) => write!(f, "{e}"),
            PipelineError::StudyNotFound(name) => write!(f, "study '{name}' not found"),
            PipelineError::NoLabelGroups(name) => {
                write!(f, "study '{name}' has no label groups")
            }
            PipelineError::NoWindowSize => write!(
                f,
                "no annotated seizures to derive a window size from; pass --window-ms"
            ),
            PipelineError::InvalidWindowSize(ms) => {
                write!(f, "window size must be positive, got {ms}ms")
            }
            PipelineError::EmptyData => write!(f, "no sensor rows to process"),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<ApiError> for PipelineError {
    fn from(e: ApiError) -> Self {
        PipelineError::Api(e)
    }
}

impl From<SyncError> for PipelineError {
    fn from(e: SyncError) -> Self {
        PipelineError::Sync(e)
    }
}

/// Options for the in-memory stages (everything after fetching).
#[derive(Debug, Clone, Copy)]
pub struct StageOptions {
    /// Preictal horizon (ms)
    pub preictal_ms: i64,
    /// Window size override (ms); defaults to the shortest event duration
    pub window_ms: Option<i64>,
    /// Apply min-max normalization before windowing
    pub normalize: bool,
}

/// What the in-memory stages produced.
#[derive(Debug)]
pub struct StageOutput {
    pub report: CleaningReport,
    pub removal: RemovalSummary,
    /// Rows that survived cleaning
    pub rows: usize,
    /// Window size actually used (ms)
    pub window_ms: i64,
    pub windows: Vec<WindowFeatures>,
}

/// Run label → clean → normalize? → window → features over a fetched frame.
pub fn run_stages(
    frame: &mut SensorFrame,
    events: &[SeizureEvent],
    opts: &StageOptions,
) -> Result<StageOutput, PipelineError> {
    if frame.is_empty() {
        return Err(PipelineError::EmptyData);
    }

    if let Some(ms) = opts.window_ms {
        if ms <= 0 {
            return Err(PipelineError::InvalidWindowSize(ms));
        }
    }

    apply_labels(frame, events, opts.preictal_ms);

    let report = scan(frame);
    let removal = remove_common(frame, &report);
    if frame.is_empty() {
        return Err(PipelineError::EmptyData);
    }

    if opts.normalize {
        min_max(frame);
    }

    let window_ms = opts
        .window_ms
        .or_else(|| default_window_ms(events))
        .ok_or(PipelineError::NoWindowSize)?;

    let windows = build_windows(frame, window_ms)
        .iter()
        .map(|w| compute_features(frame, w))
        .collect();

    Ok(StageOutput {
        report,
        removal,
        rows: frame.len(),
        window_ms,
        windows,
    })
}

/// Full run output.
#[derive(Debug)]
pub struct RunOutput {
    pub study: StudySummary,
    /// Co-recorded segments per sensor after synchronization
    pub segments: usize,
    /// Rows on the shared time index after merging
    pub merged_rows: usize,
    /// Seizure annotations fetched
    pub events: usize,
    /// Rows that survived cleaning
    pub rows: usize,
    pub report: CleaningReport,
    pub removal: RemovalSummary,
    pub features: FeatureTable,
}

/// One-shot pipeline over the platform API.
pub struct Pipeline {
    client: BlockingClient,
    sensors: Vec<String>,
}

impl Pipeline {
    pub fn new(client: BlockingClient, sensors: Vec<String>) -> Self {
        Self { client, sensors }
    }

    /// Run the full pipeline for a study.
    pub fn run(&self, study_name: &str, opts: &StageOptions) -> Result<RunOutput, PipelineError> {
        let (study, mut frame, events, segments) = self.fetch(study_name)?;
        let merged_rows = frame.len();
        let event_count = events.len();

        let output = run_stages(&mut frame, &events, opts)?;

        let features = FeatureTable::new(
            study.name.clone(),
            output.window_ms,
            opts.preictal_ms,
            self.sensors.clone(),
            output.windows,
        );

        Ok(RunOutput {
            study,
            segments,
            merged_rows,
            events: event_count,
            rows: output.rows,
            report: output.report,
            removal: output.removal,
            features,
        })
    }

    /// Fetch, label and scan a study without removing anything.
    pub fn inspect(
        &self,
        study_name: &str,
        preictal_ms: i64,
    ) -> Result<(StudySummary, CleaningReport), PipelineError> {
        let (study, mut frame, events, _) = self.fetch(study_name)?;
        if frame.is_empty() {
            return Err(PipelineError::EmptyData);
        }
        apply_labels(&mut frame, &events, preictal_ms);
        Ok((study, scan(&frame)))
    }

    /// Resolve the study, synchronize metadata, fetch raw data and labels.
    fn fetch(
        &self,
        study_name: &str,
    ) -> Result<(StudySummary, SensorFrame, Vec<SeizureEvent>, usize), PipelineError> {
        let study = self
            .client
            .find_study(study_name)?
            .ok_or_else(|| PipelineError::StudyNotFound(study_name.to_string()))?;

        let metadata = self.client.study_metadata(&study.id)?;
        let synced = sync_metadata(&metadata, &self.sensors)?;
        let frame = self.fetch_raw(&synced)?;
        let events = self.fetch_events(&study)?;

        Ok((study, frame, events, synced.segment_count()))
    }

    /// Fetch each sensor's synchronized segments and merge on the time index.
    fn fetch_raw(&self, synced: &SyncedMetadata) -> Result<SensorFrame, PipelineError> {
        let mut series = Vec::with_capacity(self.sensors.len());
        for sensor in &self.sensors {
            let mut samples: Vec<(i64, Option<f64>)> = Vec::new();
            for segment in synced.synced_segments(sensor) {
                let data = self.client.segment_data(&segment.segment_id)?;
                samples.extend(data.iter().map(|s| (s.time, s.value)));
            }
            samples.sort_by_key(|&(time, _)| time);
            series.push(SensorSeries::new(sensor.clone(), samples));
        }
        Ok(SensorFrame::from_series(series))
    }

    /// Read seizure annotations from the study's first label group.
    fn fetch_events(&self, study: &StudySummary) -> Result<Vec<SeizureEvent>, PipelineError> {
        let groups = self.client.label_groups(&study.id)?;
        let group = groups
            .first()
            .ok_or_else(|| PipelineError::NoLabelGroups(study.name.clone()))?;
        let labels = self.client.labels(&group.id)?;
        Ok(labels.iter().map(SeizureEvent::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frame::SensorSeries;
    use crate::core::labeling::SeizurePhase;

    fn frame() -> SensorFrame {
        SensorFrame::from_series(vec![SensorSeries::new(
            "EDA",
            (0..20).map(|i| (i * 100, Some(i as f64))).collect(),
        )])
    }

    #[test]
    fn test_run_stages_uses_shortest_event_for_window_size() {
        let mut frame = frame();
        let events = [SeizureEvent::new(500, 400), SeizureEvent::new(1_500, 300)];
        let opts = StageOptions {
            preictal_ms: 200,
            window_ms: None,
            normalize: false,
        };

        let output = run_stages(&mut frame, &events, &opts).unwrap();
        assert_eq!(output.window_ms, 300);
        assert!(!output.windows.is_empty());
    }

    #[test]
    fn test_run_stages_requires_window_size_without_events() {
        let mut frame = frame();
        let opts = StageOptions {
            preictal_ms: 200,
            window_ms: None,
            normalize: false,
        };

        assert!(matches!(
            run_stages(&mut frame, &[], &opts),
            Err(PipelineError::NoWindowSize)
        ));
    }

    #[test]
    fn test_run_stages_window_override() {
        let mut frame = frame();
        let opts = StageOptions {
            preictal_ms: 200,
            window_ms: Some(500),
            normalize: false,
        };

        let output = run_stages(&mut frame, &[], &opts).unwrap();
        assert_eq!(output.window_ms, 500);
        // 20 samples at 100ms spacing, 500ms windows
        assert_eq!(output.windows.len(), 4);
        assert!(output
            .windows
            .iter()
            .all(|w| w.phase == SeizurePhase::NonSeizure));
    }

    #[test]
    fn test_run_stages_rejects_nonpositive_window_size() {
        for ms in [0, -100] {
            let mut frame = frame();
            let opts = StageOptions {
                preictal_ms: 200,
                window_ms: Some(ms),
                normalize: false,
            };
            assert!(matches!(
                run_stages(&mut frame, &[], &opts),
                Err(PipelineError::InvalidWindowSize(got)) if got == ms
            ));
        }
    }

    #[test]
    fn test_run_stages_counts_surviving_rows() {
        let mut frame = frame();
        let opts = StageOptions {
            preictal_ms: 200,
            window_ms: Some(500),
            normalize: false,
        };
        let output = run_stages(&mut frame, &[], &opts).unwrap();
        assert_eq!(output.rows, frame.len());
        assert_eq!(output.rows, 20 - output.removal.rows_removed);
    }

    #[test]
    fn test_run_stages_rejects_empty_frame() {
        let mut frame = SensorFrame::from_series(vec![]);
        let opts = StageOptions {
            preictal_ms: 0,
            window_ms: Some(100),
            normalize: false,
        };
        assert!(matches!(
            run_stages(&mut frame, &[], &opts),
            Err(PipelineError::EmptyData)
        ));
    }

    #[test]
    fn test_run_stages_normalizes_before_windowing() {
        let mut frame = frame();
        let opts = StageOptions {
            preictal_ms: 0,
            window_ms: Some(2_000),
            normalize: true,
        };

        let output = run_stages(&mut frame, &[], &opts).unwrap();
        let stats = output.windows[0].sensors["EDA"].unwrap();
        assert_eq!(stats.min, 0.0);
        assert_eq!(stats.max, 1.0);
    }
}
