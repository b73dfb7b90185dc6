use serde::{Deserialize, Serialize};

// ============================================================================
// Clip Segmentation
// ============================================================================

/// Thresholds used when splitting a flat file list into clips
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    /// A gap strictly greater than this (seconds) starts a new clip
    pub gap_threshold_secs: f64,
    /// Nominal length of one recorded footage, used for duration estimates
    pub nominal_footage_secs: f64,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            gap_threshold_secs: 90.0,
            nominal_footage_secs: 60.0,
        }
    }
}

// ============================================================================
// Footage Grouping
// ============================================================================

/// What to do with a video whose camera suffix is not recognised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownCameraPolicy {
    /// Treat the file as the front camera
    #[default]
    DefaultToFront,
    /// Leave the file out of its footage
    Skip,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    pub unknown_camera_policy: UnknownCameraPolicy,
}

// ============================================================================
// Playback Synchronization
// ============================================================================

/// Playback synchronizer tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Start playing as soon as a timeline is loaded
    pub autoplay: bool,
    /// Playback rate applied to freshly loaded timelines
    pub default_rate: f64,
    pub min_rate: f64,
    pub max_rate: f64,
    /// Seconds of context shown before an event when jumping to it
    pub event_pre_roll_secs: f64,
    /// Jump-to-footage-end lands this many seconds before the boundary
    pub footage_end_lead_secs: f64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            autoplay: true,
            default_rate: 1.0,
            min_rate: 0.25,
            max_rate: 8.0,
            event_pre_roll_secs: 5.0,
            footage_end_lead_secs: 3.0,
        }
    }
}

impl SyncConfig {
    /// Rates offered by the rate picker
    pub const RATE_OPTIONS: [f64; 9] = [0.25, 0.5, 0.75, 1.0, 1.25, 1.5, 2.0, 4.0, 8.0];

    pub fn is_valid_rate(&self, rate: f64) -> bool {
        rate.is_finite() && rate >= self.min_rate && rate <= self.max_rate
    }
}
