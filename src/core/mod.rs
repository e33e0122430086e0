//! Core pipeline stages over the in-memory sensor table.
//!
//! This module contains:
//! - The time-indexed sensor table shared by all stages
//! - Seizure-phase labeling from clinical annotations
//! - Null/outlier screening and removal
//! - Min-max normalization
//! - Fixed-window bucketing and per-window feature computation

pub mod cleaning;
pub mod features;
pub mod frame;
pub mod labeling;
pub mod normalize;
pub mod windowing;

// Re-export commonly used types
pub use cleaning::{remove_common, scan, CleaningReport, RemovalSummary, SensorReport};
pub use features::{compute_features, FeatureTable, SensorStats, WindowFeatures};
pub use frame::{SensorFrame, SensorSeries};
pub use labeling::{apply_labels, SeizureEvent, SeizurePhase, DEFAULT_PREICTAL_MS};
pub use normalize::min_max;
pub use windowing::{build_windows, default_window_ms, Window};
