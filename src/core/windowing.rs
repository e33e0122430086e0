//! Fixed-duration windows over the cleaned series.
//!
//! The cleaned series is bucketed into contiguous windows starting at the
//! earliest timestamp. The window size defaults to the shortest annotated
//! seizure duration so that no window spans more than one full event.
//! Windows with no samples are dropped.

use crate::core::frame::SensorFrame;
use crate::core::labeling::{SeizureEvent, SeizurePhase};
use std::ops::Range;

/// A fixed-duration slice of the series, referencing frame rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    /// Sequential window number, starting at 0
    pub index: usize,
    /// Window start (epoch ms, inclusive)
    pub start: i64,
    /// Window end (epoch ms, exclusive)
    pub end: i64,
    /// Frame rows covered by this window
    pub rows: Range<usize>,
    /// Window-level phase label
    pub phase: SeizurePhase,
}

/// Default window size: the shortest annotated event duration.
///
/// Returns `None` when there are no events or the shortest duration is not
/// positive; callers must then supply an explicit window size.
pub fn default_window_ms(events: &[SeizureEvent]) -> Option<i64> {
    let shortest = events.iter().map(|e| e.duration).min()?;
    (shortest > 0).then_some(shortest)
}

/// Bucket the frame into fixed windows of `window_ms` milliseconds.
///
/// A window is labeled ictal if any of its rows is ictal, else preictal if
/// any row is preictal, else non-seizure. Empty windows are skipped, so
/// window indices may be non-contiguous in time. A non-positive `window_ms`
/// yields no windows.
pub fn build_windows(frame: &SensorFrame, window_ms: i64) -> Vec<Window> {
    if window_ms <= 0 {
        return Vec::new();
    }
    let (Some(first), Some(last)) = (frame.min_time(), frame.max_time()) else {
        return Vec::new();
    };

    let count = ((last - first) / window_ms) as usize + 1;
    let mut windows = Vec::new();
    for index in 0..count {
        let start = first + index as i64 * window_ms;
        let end = start + window_ms;
        let rows = frame.row_range(start, end);
        if rows.is_empty() {
            continue;
        }

        let phase = window_phase(frame, rows.clone());
        windows.push(Window {
            index,
            start,
            end,
            rows,
            phase,
        });
    }
    windows
}

/// Window label priority: ictal over preictal over non-seizure.
fn window_phase(frame: &SensorFrame, rows: Range<usize>) -> SeizurePhase {
    let mut phase = SeizurePhase::NonSeizure;
    for row in rows {
        match frame.label(row) {
            SeizurePhase::Ictal => return SeizurePhase::Ictal,
            SeizurePhase::Preictal => phase = SeizurePhase::Preictal,
            SeizurePhase::NonSeizure => {}
        }
    }
    phase
}
