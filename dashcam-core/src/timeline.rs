use chrono::{Duration, NaiveDateTime};
use common::{ClipEvent, FootageNavigation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::footage::{Clip, Footage};

// ============================================================================
// Timeline Structures
// ============================================================================

/// Placement of one footage on the global time axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineBoundary {
    pub footage_index: usize,
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
    pub timestamp_key: String,
}

impl TimelineBoundary {
    pub fn contains(&self, global_time: f64) -> bool {
        self.start_time <= global_time && global_time < self.end_time
    }
}

/// A global time resolved to a footage and an offset inside it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalPosition {
    pub footage_index: usize,
    pub local_time: f64,
}

/// Concatenation of a clip's footages into one seekable axis.
///
/// Boundaries cover `[0, total_duration)` without gaps or overlaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedTimeline {
    pub clip_id: String,
    pub footages: Vec<Footage>,
    pub boundaries: Vec<TimelineBoundary>,
    pub total_duration: f64,
    pub event: Option<ClipEvent>,
}

// ============================================================================
// Timeline Builder
// ============================================================================

pub struct TimelineBuilder;

impl TimelineBuilder {
    pub fn build_from_clip(clip: &Clip) -> UnifiedTimeline {
        Self::build_from_footages(&clip.id, clip.footages.clone(), clip.event.clone())
    }

    pub fn build_from_footages(
        clip_id: &str,
        footages: Vec<Footage>,
        event: Option<ClipEvent>,
    ) -> UnifiedTimeline {
        let mut offset = 0.0;
        let boundaries: Vec<TimelineBoundary> = footages
            .iter()
            .enumerate()
            .map(|(index, footage)| {
                let duration = footage.duration.max(0.0);
                let boundary = TimelineBoundary {
                    footage_index: index,
                    start_time: offset,
                    end_time: offset + duration,
                    duration,
                    timestamp_key: footage.timestamp_key.clone(),
                };
                offset += duration;
                boundary
            })
            .collect();

        debug!(
            "Built timeline for {}: {} boundaries, {:.1}s total",
            clip_id,
            boundaries.len(),
            offset
        );

        UnifiedTimeline {
            clip_id: clip_id.to_string(),
            footages,
            boundaries,
            total_duration: offset,
            event,
        }
    }
}

// ============================================================================
// Time Conversion
// ============================================================================

impl UnifiedTimeline {
    pub fn is_empty(&self) -> bool {
        self.footages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.footages.len()
    }

    pub fn footage(&self, index: usize) -> Option<&Footage> {
        self.footages.get(index)
    }

    pub fn boundary(&self, index: usize) -> Option<&TimelineBoundary> {
        self.boundaries.get(index)
    }

    /// Clamp a global time into `[0, total_duration]`, mapping NaN to 0
    pub fn clamp_time(&self, global_time: f64) -> f64 {
        if global_time.is_nan() {
            return 0.0;
        }
        global_time.clamp(0.0, self.total_duration)
    }

    /// Resolve a global time to the footage that contains it.
    ///
    /// The end of the timeline maps to the end of the last footage.
    pub fn global_to_local(&self, global_time: f64) -> LocalPosition {
        let Some(last) = self.boundaries.last() else {
            return LocalPosition {
                footage_index: 0,
                local_time: 0.0,
            };
        };

        let t = self.clamp_time(global_time);
        if let Some(boundary) = self.boundaries.iter().find(|b| b.contains(t)) {
            return LocalPosition {
                footage_index: boundary.footage_index,
                local_time: t - boundary.start_time,
            };
        }

        LocalPosition {
            footage_index: last.footage_index,
            local_time: last.duration,
        }
    }

    /// Map a footage-local time back onto the global axis.
    ///
    /// Unknown footage indexes resolve to 0.
    pub fn local_to_global(&self, footage_index: usize, local_time: f64) -> f64 {
        match self.boundaries.get(footage_index) {
            Some(boundary) => {
                let local = if local_time.is_nan() { 0.0 } else { local_time };
                boundary.start_time + local.clamp(0.0, boundary.duration)
            }
            None => {
                debug!("local_to_global: no footage at index {}", footage_index);
                0.0
            }
        }
    }

    // ========================================================================
    // Wall-Clock Helpers
    // ========================================================================

    /// Recording start of the first footage
    pub fn start_date(&self) -> Option<NaiveDateTime> {
        self.footages.first().map(|f| f.date)
    }

    /// Offset of a wall-clock instant from the first footage, when it lies
    /// inside the timeline
    pub fn offset_of(&self, at: NaiveDateTime) -> Option<f64> {
        let start = self.start_date()?;
        let offset = (at - start).num_milliseconds() as f64 / 1000.0;
        (0.0..=self.total_duration).contains(&offset).then_some(offset)
    }

    /// Wall-clock time shown for a global position
    pub fn absolute_time(&self, global_time: f64) -> Option<NaiveDateTime> {
        let start = self.start_date()?;
        let millis = (self.clamp_time(global_time) * 1000.0).round() as i64;
        Some(start + Duration::milliseconds(millis))
    }

    /// Footage navigation state for the given position
    pub fn navigation(&self, footage_index: usize, global_time: f64) -> FootageNavigation {
        let total_footages = self.len();
        let footage_progress = match self.boundaries.get(footage_index) {
            Some(b) if b.duration > 0.0 => {
                ((self.clamp_time(global_time) - b.start_time) / b.duration).clamp(0.0, 1.0)
            }
            _ => 0.0,
        };
        let clip_progress = if self.total_duration > 0.0 {
            self.clamp_time(global_time) / self.total_duration
        } else {
            0.0
        };

        FootageNavigation {
            can_go_previous: footage_index > 0,
            can_go_next: footage_index + 1 < total_footages,
            current_footage: footage_index + 1,
            total_footages,
            footage_progress,
            clip_progress,
        }
    }
}
