use chrono::NaiveDateTime;
use common::RawMediaFile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{info, warn};

use crate::config::SegmenterConfig;

// ============================================================================
// Segmentation Results
// ============================================================================

/// A recording session found in a flat list of files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedClip {
    /// `clip-<start epoch millis>`
    pub id: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    /// Every input file whose timestamp falls in this clip
    pub files: Vec<RawMediaFile>,
    pub footage_count: usize,
    /// Nominal estimate: footage count times the nominal footage length
    pub total_duration: f64,
}

/// Outcome of analysing a directory's worth of files
#[derive(Debug, Clone, PartialEq)]
pub struct ClipAnalysis {
    pub has_multiple_clips: bool,
    pub clips: Vec<DetectedClip>,
    /// All input files, present when the input is a single session
    pub single_clip_files: Option<Vec<RawMediaFile>>,
}

// ============================================================================
// Clip Segmenter
// ============================================================================

/// Splits files into clips wherever consecutive timestamps are further
/// apart than the gap threshold
#[derive(Debug, Clone, Default)]
pub struct ClipSegmenter {
    config: SegmenterConfig,
}

impl ClipSegmenter {
    pub fn new(config: SegmenterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SegmenterConfig {
        &self.config
    }

    /// Detect clips, ordered by start time.
    ///
    /// Returns an empty list when no filename carries a timestamp.
    pub fn detect(&self, files: &[RawMediaFile]) -> Vec<DetectedClip> {
        let mut timestamps = BTreeSet::new();
        for file in files {
            match file.timestamp {
                Some(ts) => {
                    timestamps.insert(ts);
                }
                None => warn!("Could not parse timestamp from filename: {}", file.name),
            }
        }

        if timestamps.is_empty() {
            warn!("No valid timestamps found in {} files", files.len());
            return Vec::new();
        }

        let mut groups: Vec<Vec<NaiveDateTime>> = Vec::new();
        let mut current: Vec<NaiveDateTime> = Vec::new();

        for ts in timestamps {
            if let Some(prev) = current.last() {
                if self.gap_secs(*prev, ts) > self.config.gap_threshold_secs {
                    groups.push(std::mem::take(&mut current));
                }
            }
            current.push(ts);
        }
        if !current.is_empty() {
            groups.push(current);
        }

        groups
            .iter()
            .filter_map(|group| self.build_clip(group, files))
            .collect()
    }

    /// Detect clips and decide whether the input is one session or several
    pub fn analyze(&self, files: &[RawMediaFile]) -> ClipAnalysis {
        let clips = self.detect(files);

        if clips.len() <= 1 {
            return ClipAnalysis {
                has_multiple_clips: false,
                clips,
                single_clip_files: Some(files.to_vec()),
            };
        }

        info!("Detected {} separate clips", clips.len());
        for (index, clip) in clips.iter().enumerate() {
            info!(
                "  Clip {}: {} to {} ({} footages)",
                index + 1,
                clip.start_time,
                clip.end_time,
                clip.footage_count
            );
        }

        ClipAnalysis {
            has_multiple_clips: true,
            clips,
            single_clip_files: None,
        }
    }

    fn gap_secs(&self, earlier: NaiveDateTime, later: NaiveDateTime) -> f64 {
        (later - earlier).num_milliseconds() as f64 / 1000.0
    }

    fn build_clip(&self, group: &[NaiveDateTime], files: &[RawMediaFile]) -> Option<DetectedClip> {
        let start_time = *group.first()?;
        let end_time = *group.last()?;

        let members: BTreeSet<&NaiveDateTime> = group.iter().collect();
        let clip_files: Vec<RawMediaFile> = files
            .iter()
            .filter(|f| f.timestamp.as_ref().map_or(false, |ts| members.contains(ts)))
            .cloned()
            .collect();

        Some(DetectedClip {
            id: format!("clip-{}", start_time.and_utc().timestamp_millis()),
            start_time,
            end_time,
            files: clip_files,
            footage_count: group.len(),
            total_duration: group.len() as f64 * self.config.nominal_footage_secs,
        })
    }
}
