use chrono::NaiveDateTime;
use common::{CameraPosition, ClipEvent, RawMediaFile};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ============================================================================
// Footage
// ============================================================================

/// One recording interval: up to four simultaneous camera files sharing a
/// timestamp key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Footage {
    pub timestamp_key: String,
    pub date: NaiveDateTime,
    /// Footage duration in seconds. Starts as the longest camera duration and
    /// is replaced by the gap to the next footage during resolution.
    pub duration: f64,
    pub camera_files: BTreeMap<CameraPosition, RawMediaFile>,
    pub available_cameras: BTreeSet<CameraPosition>,
    /// Camera whose progress drives the displayed time
    pub longest_duration_camera: Option<CameraPosition>,
    pub total_size: u64,
    pub is_complete: bool,
}

impl Footage {
    /// Build a footage from camera assignments in arrival order.
    ///
    /// A later file for the same camera replaces the earlier one, but every
    /// assigned file still counts toward `total_size`.
    pub fn new(
        timestamp_key: impl Into<String>,
        date: NaiveDateTime,
        assignments: Vec<(CameraPosition, RawMediaFile)>,
    ) -> Self {
        let mut camera_files = BTreeMap::new();
        let mut total_size = 0u64;
        let mut longest: Option<(CameraPosition, f64)> = None;

        for (camera, file) in assignments {
            total_size = total_size.saturating_add(file.size_bytes);
            if longest.map_or(true, |(_, best)| file.duration > best) {
                longest = Some((camera, file.duration));
            }
            camera_files.insert(camera, file);
        }

        let available_cameras: BTreeSet<CameraPosition> = camera_files.keys().copied().collect();
        let is_complete = Self::covers_all_cameras(&available_cameras);
        let (longest_duration_camera, duration) = match longest {
            Some((camera, duration)) => (Some(camera), duration),
            None => (None, 0.0),
        };

        Self {
            timestamp_key: timestamp_key.into(),
            date,
            duration,
            camera_files,
            available_cameras,
            longest_duration_camera,
            total_size,
            is_complete,
        }
    }

    fn covers_all_cameras(available: &BTreeSet<CameraPosition>) -> bool {
        CameraPosition::ALL.iter().all(|camera| available.contains(camera))
    }

    pub fn file_for(&self, camera: CameraPosition) -> Option<&RawMediaFile> {
        self.camera_files.get(&camera)
    }

    /// Probed media duration of one camera's file
    pub fn camera_duration(&self, camera: CameraPosition) -> Option<f64> {
        self.camera_files.get(&camera).map(|f| f.duration)
    }

    /// Longest probed media duration among the camera files
    pub fn measured_duration(&self) -> f64 {
        self.camera_files
            .values()
            .map(|f| f.duration)
            .fold(0.0, f64::max)
    }

    pub fn missing_cameras(&self) -> Vec<CameraPosition> {
        CameraPosition::ALL
            .into_iter()
            .filter(|camera| !self.available_cameras.contains(camera))
            .collect()
    }

    /// Camera used for progress reporting, falling back to the first
    /// available camera.
    pub fn display_camera(&self) -> Option<CameraPosition> {
        self.longest_duration_camera
            .or_else(|| self.available_cameras.iter().next().copied())
    }
}

// ============================================================================
// Clip
// ============================================================================

/// An ordered run of footages forming one continuous recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub id: String,
    pub directory_name: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub footages: Vec<Footage>,
    pub total_duration: f64,
    pub total_footages: usize,
    pub total_size: u64,
    pub event: Option<ClipEvent>,
}

impl Clip {
    /// Assemble a clip from footages already sorted and resolved.
    ///
    /// Returns `None` when `footages` is empty.
    pub fn from_footages(
        id: impl Into<String>,
        directory_name: impl Into<String>,
        footages: Vec<Footage>,
        event: Option<ClipEvent>,
    ) -> Option<Self> {
        let start_time = footages.first()?.date;
        let end_time = footages.last()?.date;
        let total_duration = footages.iter().map(|f| f.duration).sum();
        let total_size = footages.iter().map(|f| f.total_size).sum();

        Some(Self {
            id: id.into(),
            directory_name: directory_name.into(),
            start_time,
            end_time,
            total_footages: footages.len(),
            footages,
            total_duration,
            total_size,
            event,
        })
    }

    /// Footages missing at least one camera
    pub fn incomplete_footages(&self) -> impl Iterator<Item = &Footage> {
        self.footages.iter().filter(|f| !f.is_complete)
    }
}
