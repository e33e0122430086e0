//! Metadata synchronization across sensors.
//!
//! Wearable channels record in independent segments; only spans recorded by
//! every configured sensor are usable. Per-sensor metadata is intersected on
//! the segment key (start time, duration, sample rate) to find co-recorded
//! segments.

use crate::client::ChannelSegment;
use std::collections::{BTreeMap, HashSet};

/// Join key identifying a co-recorded span.
///
/// Sample rates are compared by bit pattern: all rows come from one study
/// payload, so equal rates are bit-identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentKey {
    pub start_time: i64,
    pub duration: i64,
    rate_bits: u64,
}

impl SegmentKey {
    fn of(segment: &ChannelSegment) -> Self {
        Self {
            start_time: segment.start_time,
            duration: segment.duration,
            rate_bits: segment.sample_rate.to_bits(),
        }
    }
}

/// Synchronization errors.
#[derive(Debug)]
pub enum SyncError {
    /// A configured sensor has no metadata rows in the study
    SensorMissing(String),
    /// The sensors share no co-recorded segments
    NoCommonSegments,
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncError::SensorMissing(sensor) => {
                write!(f, "study has no metadata for sensor '{sensor}'")
            }
            SyncError::NoCommonSegments => {
                write!(f, "sensors share no co-recorded segments")
            }
        }
    }
}

impl std::error::Error for SyncError {}

/// Result of intersecting per-sensor metadata.
#[derive(Debug, Clone)]
pub struct SyncedMetadata {
    /// Sensor names, in configured order
    pub sensors: Vec<String>,
    /// Full per-sensor metadata, sorted by segment start time
    pub per_sensor: BTreeMap<String, Vec<ChannelSegment>>,
    /// Co-recorded segment keys, sorted by start time
    pub keys: Vec<SegmentKey>,
}

impl SyncedMetadata {
    /// A sensor's segments restricted to the synchronized keys, in start order.
    pub fn synced_segments(&self, sensor: &str) -> Vec<&ChannelSegment> {
        let keys: HashSet<SegmentKey> = self.keys.iter().copied().collect();
        self.per_sensor
            .get(sensor)
            .map(|segments| {
                segments
                    .iter()
                    .filter(|s| keys.contains(&SegmentKey::of(s)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of co-recorded segments.
    pub fn segment_count(&self) -> usize {
        self.keys.len()
    }
}

/// Intersect a study's metadata rows across the configured sensors.
pub fn sync_metadata(
    rows: &[ChannelSegment],
    sensors: &[String],
) -> Result<SyncedMetadata, SyncError> {
    let mut per_sensor: BTreeMap<String, Vec<ChannelSegment>> = BTreeMap::new();
    let mut common: Option<HashSet<SegmentKey>> = None;

    for sensor in sensors {
        let mut segments: Vec<ChannelSegment> = rows
            .iter()
            .filter(|r| &r.channel_name == sensor)
            .cloned()
            .collect();
        if segments.is_empty() {
            return Err(SyncError::SensorMissing(sensor.clone()));
        }
        segments.sort_by_key(|s| s.start_time);

        let keys: HashSet<SegmentKey> = segments.iter().map(SegmentKey::of).collect();
        common = Some(match common {
            Some(mut acc) => {
                acc.retain(|k| keys.contains(k));
                acc
            }
            None => keys,
        });
        per_sensor.insert(sensor.clone(), segments);
    }

    let common = common.unwrap_or_default();
    if common.is_empty() {
        return Err(SyncError::NoCommonSegments);
    }

    let mut keys: Vec<SegmentKey> = common.into_iter().collect();
    keys.sort_by_key(|k| k.start_time);

    Ok(SyncedMetadata {
        sensors: sensors.to_vec(),
        per_sensor,
        keys,
    })
}
