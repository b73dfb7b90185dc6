use chrono::NaiveDateTime;
use common::{CameraPosition, RawMediaFile};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::config::{GroupingConfig, UnknownCameraPolicy};
use crate::footage::types::Footage;

/// Groups camera files sharing a timestamp key into footages
#[derive(Debug, Clone, Default)]
pub struct FootageGrouper {
    config: GroupingConfig,
}

impl FootageGrouper {
    pub fn new(config: GroupingConfig) -> Self {
        Self { config }
    }

    /// Group video files into footages sorted by date ascending.
    ///
    /// Files without a parseable timestamp are left out, as are buckets
    /// that end up with no camera at all.
    pub fn group(&self, files: &[RawMediaFile]) -> Vec<Footage> {
        let mut buckets: BTreeMap<&str, (NaiveDateTime, Vec<&RawMediaFile>)> = BTreeMap::new();

        for file in files.iter().filter(|f| f.is_video()) {
            match (file.timestamp_key.as_deref(), file.timestamp) {
                (Some(key), Some(date)) => buckets.entry(key).or_insert((date, Vec::new())).1.push(file),
                _ => debug!("Skipping file without timestamp: {}", file.name),
            }
        }

        let mut footages: Vec<Footage> = buckets
            .into_iter()
            .filter_map(|(key, (date, bucket))| {
                let assignments: Vec<(CameraPosition, RawMediaFile)> = bucket
                    .into_iter()
                    .filter_map(|file| self.assign_camera(file).map(|camera| (camera, file.clone())))
                    .collect();

                if assignments.is_empty() {
                    warn!("Footage {} has no usable camera files, dropping it", key);
                    return None;
                }
                let footage = Footage::new(key, date, assignments);
                debug!(
                    "Created footage {} with {} camera(s), complete: {}",
                    key,
                    footage.available_cameras.len(),
                    footage.is_complete
                );
                Some(footage)
            })
            .collect();

        footages.sort_by(|a, b| a.date.cmp(&b.date));
        debug!("Grouped {} files into {} footages", files.len(), footages.len());
        footages
    }

    fn assign_camera(&self, file: &RawMediaFile) -> Option<CameraPosition> {
        if let Some(camera) = file.camera {
            return Some(camera);
        }

        match self.config.unknown_camera_policy {
            UnknownCameraPolicy::DefaultToFront => {
                warn!(
                    "Unknown camera suffix {:?} in {}, using front",
                    file.camera_label, file.name
                );
                Some(CameraPosition::Front)
            }
            UnknownCameraPolicy::Skip => {
                warn!("Unknown camera suffix {:?} in {}, skipping", file.camera_label, file.name);
                None
            }
        }
    }
}
