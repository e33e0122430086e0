//! Epiwear - offline feature extraction for wearable seizure-study recordings.
//!
//! This library retrieves physiological sensor recordings (accelerometer
//! magnitude, skin temperature, electrodermal activity) and clinical seizure
//! annotations from a research platform, aligns them on a shared time index,
//! labels each sample by seizure phase, removes null/outlier rows, and
//! aggregates fixed-size windows into per-window statistical features.
//!
//! # Pipeline
//!
//! ```text
//! platform API ─▶ sync ─▶ fetch/merge ─▶ label ─▶ clean ─▶ window ─▶ features
//! ```
//!
//! Everything is a single-pass, in-memory batch transform: each stage runs to
//! completion before the next starts, and errors propagate to the caller.
//!
//! # Example
//!
//! ```no_run
//! use epiwear::client::{ApiConfig, BlockingClient};
//! use epiwear::pipeline::{Pipeline, StageOptions};
//!
//! let config = ApiConfig::new("https://api.research-platform.example", "token");
//! let client = BlockingClient::new(config).expect("client");
//! let pipeline = Pipeline::new(client, vec!["Acc Mag".into(), "TEMP".into(), "EDA".into()]);
//!
//! let opts = StageOptions {
//!     preictal_ms: 30 * 60 * 1000,
//!     window_ms: None,
//!     normalize: false,
//! };
//! let output = pipeline.run("My Study", &opts).expect("run");
//! println!("{} feature rows", output.features.windows.len());
//! ```

pub mod client;
pub mod config;
pub mod core;
pub mod pipeline;
pub mod sync;

// Re-export key types at crate root for convenience
pub use client::{ApiConfig, ApiError, BlockingClient, PlatformClient};
pub use config::Config;
pub use core::{
    apply_labels, build_windows, compute_features, min_max, FeatureTable, SeizureEvent,
    SeizurePhase, SensorFrame, SensorSeries, WindowFeatures, DEFAULT_PREICTAL_MS,
};
pub use pipeline::{Pipeline, PipelineError, RunOutput, StageOptions};
pub use sync::{sync_metadata, SyncedMetadata};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
