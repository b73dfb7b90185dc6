use chrono::{NaiveDate, NaiveDateTime};
use common::filename::parse_folder_timestamp;
use common::{CameraPosition, ClipCategory, RawMediaFile};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::clip::ClipSegmenter;

// ============================================================================
// Library Structures
// ============================================================================

/// One browsable clip in a TeslaCam library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipEntry {
    /// `<category>-<epoch millis>-<folder or "recent">`
    pub id: String,
    pub category: ClipCategory,
    pub timestamp: NaiveDateTime,
    /// Estimated from the number of distinct footage timestamps
    pub duration: f64,
    pub folder_name: Option<String>,
    pub files: Vec<RawMediaFile>,
    pub cameras: BTreeSet<CameraPosition>,
    pub has_event: bool,
    pub thumbnail: Option<PathBuf>,
}

impl ClipEntry {
    pub fn from_files(
        category: ClipCategory,
        files: Vec<RawMediaFile>,
        timestamp: NaiveDateTime,
        folder_name: Option<&str>,
        nominal_footage_secs: f64,
    ) -> Self {
        let videos: Vec<&RawMediaFile> = files.iter().filter(|f| f.is_video()).collect();
        let cameras = videos.iter().filter_map(|f| f.camera).collect();
        let unique_timestamps: BTreeSet<&str> = videos
            .iter()
            .filter_map(|f| f.timestamp_key.as_deref())
            .collect();
        let duration = unique_timestamps.len() as f64 * nominal_footage_secs;

        let has_event = files.iter().any(|f| f.is_event_file());
        let thumbnail = files
            .iter()
            .find(|f| f.is_thumbnail())
            .map(|f| f.source.clone());

        let id = format!(
            "{}-{}-{}",
            category,
            timestamp.and_utc().timestamp_millis(),
            folder_name.unwrap_or("recent")
        );

        Self {
            id,
            category,
            timestamp,
            duration,
            folder_name: folder_name.map(str::to_string),
            files,
            cameras,
            has_event,
            thumbnail,
        }
    }

    /// Build the entry for a SavedClips/SentryClips sub-folder.
    ///
    /// Folders whose name is not a timestamp, or that hold no files, are
    /// skipped.
    pub fn from_folder(
        category: ClipCategory,
        folder_name: &str,
        files: Vec<RawMediaFile>,
        nominal_footage_secs: f64,
    ) -> Option<Self> {
        let Some(timestamp) = parse_folder_timestamp(folder_name) else {
            warn!("Invalid folder name format: {}", folder_name);
            return None;
        };
        if files.is_empty() {
            warn!("No files found in folder: {}", folder_name);
            return None;
        }
        Some(Self::from_files(
            category,
            files,
            timestamp,
            Some(folder_name),
            nominal_footage_secs,
        ))
    }

    /// Split RecentClips' flat file list into entries, newest first
    pub fn from_recent(files: &[RawMediaFile], segmenter: &ClipSegmenter) -> Vec<Self> {
        if files.is_empty() {
            return Vec::new();
        }

        let nominal = segmenter.config().nominal_footage_secs;
        let mut entries: Vec<Self> = segmenter
            .detect(files)
            .into_iter()
            .map(|clip| {
                Self::from_files(ClipCategory::Recent, clip.files, clip.start_time, None, nominal)
            })
            .collect();
        sort_newest_first(&mut entries);
        entries
    }
}

/// Clips of every category found in one library root
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibraryIndex {
    pub recent: Vec<ClipEntry>,
    pub saved: Vec<ClipEntry>,
    pub sentry: Vec<ClipEntry>,
}

impl LibraryIndex {
    pub fn category(&self, category: ClipCategory) -> &[ClipEntry] {
        match category {
            ClipCategory::Recent => &self.recent,
            ClipCategory::Saved => &self.saved,
            ClipCategory::Sentry => &self.sentry,
        }
    }

    /// Store a category's entries, newest first
    pub fn set_category(&mut self, category: ClipCategory, mut entries: Vec<ClipEntry>) {
        sort_newest_first(&mut entries);
        debug!("{} category holds {} clips", category, entries.len());
        match category {
            ClipCategory::Recent => self.recent = entries,
            ClipCategory::Saved => self.saved = entries,
            ClipCategory::Sentry => self.sentry = entries,
        }
    }

    pub fn total_clips(&self) -> usize {
        self.recent.len() + self.saved.len() + self.sentry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_clips() == 0
    }

    pub fn find(&self, id: &str) -> Option<&ClipEntry> {
        ClipCategory::ALL
            .iter()
            .flat_map(|category| self.category(*category))
            .find(|entry| entry.id == id)
    }
}

// ============================================================================
// Day Grouping
// ============================================================================

/// Clips recorded on the same calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipDayGroup {
    pub date: NaiveDate,
    /// e.g. "October 27, 2025"
    pub date_label: String,
    pub clips: Vec<ClipEntry>,
}

/// Group clips by recording day; days and the clips inside them newest first
pub fn group_clips_by_day(clips: &[ClipEntry]) -> Vec<ClipDayGroup> {
    let mut days: BTreeMap<NaiveDate, Vec<ClipEntry>> = BTreeMap::new();
    for clip in clips {
        days.entry(clip.timestamp.date()).or_default().push(clip.clone());
    }

    days.into_iter()
        .rev()
        .map(|(date, mut clips)| {
            sort_newest_first(&mut clips);
            ClipDayGroup {
                date,
                date_label: date.format("%B %-d, %Y").to_string(),
                clips,
            }
        })
        .collect()
}

fn sort_newest_first(entries: &mut [ClipEntry]) {
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> RawMediaFile {
        RawMediaFile::new(name, 100, 60.0, format!("/TeslaCam/{}", name))
    }

    fn folder_files(key: &str) -> Vec<RawMediaFile> {
        vec![
            file(&format!("{}-front.mp4", key)),
            file(&format!("{}-back.mp4", key)),
            file("event.json"),
            file("thumb.png"),
        ]
    }

    #[test]
    fn test_folder_entry() {
        let entry = ClipEntry::from_folder(
            ClipCategory::Sentry,
            "2025-10-27_08-42-37",
            folder_files("2025-10-27_08-32-00"),
            60.0,
        )
        .unwrap();

        assert!(entry.id.starts_with("sentry-"));
        assert!(entry.id.ends_with("-2025-10-27_08-42-37"));
        assert_eq!(entry.duration, 60.0);
        assert!(entry.has_event);
        assert_eq!(entry.thumbnail, Some(PathBuf::from("/TeslaCam/thumb.png")));
        assert_eq!(
            entry.cameras,
            [CameraPosition::Front, CameraPosition::Back].into_iter().collect()
        );
        assert_eq!(entry.folder_name.as_deref(), Some("2025-10-27_08-42-37"));
    }

    #[test]
    fn test_invalid_folder_is_skipped() {
        assert!(ClipEntry::from_folder(ClipCategory::Saved, "misc", folder_files("2025-10-27_08-32-00"), 60.0).is_none());
        assert!(ClipEntry::from_folder(ClipCategory::Saved, "2025-10-27_08-42-37", Vec::new(), 60.0).is_none());
    }

    #[test]
    fn test_recent_entries_newest_first() {
        let files = vec![
            file("2025-10-27_08-00-00-front.mp4"),
            file("2025-10-27_08-01-00-front.mp4"),
            file("2025-10-27_09-00-00-front.mp4"),
        ];

        let entries = ClipEntry::from_recent(&files, &ClipSegmenter::default());
        assert_eq!(entries.len(), 2);
        assert!(entries[0].timestamp > entries[1].timestamp);
        assert_eq!(entries[1].duration, 120.0);
        assert!(entries[1].id.ends_with("-recent"));
        assert!(entries.iter().all(|e| e.folder_name.is_none()));
    }

    #[test]
    fn test_index_lookup() {
        let mut index = LibraryIndex::default();
        let entry = ClipEntry::from_folder(
            ClipCategory::Saved,
            "2025-10-27_08-42-37",
            folder_files("2025-10-27_08-32-00"),
            60.0,
        )
        .unwrap();
        let id = entry.id.clone();
        index.set_category(ClipCategory::Saved, vec![entry]);

        assert_eq!(index.total_clips(), 1);
        assert_eq!(index.find(&id).map(|e| e.category), Some(ClipCategory::Saved));
        assert!(index.category(ClipCategory::Recent).is_empty());
    }

    #[test]
    fn test_group_clips_by_day() {
        let mut clips = Vec::new();
        for folder in ["2025-10-26_22-00-00", "2025-10-27_08-00-00", "2025-10-27_18-30-00"] {
            clips.push(
                ClipEntry::from_folder(ClipCategory::Saved, folder, folder_files(folder), 60.0)
                    .unwrap(),
            );
        }

        let days = group_clips_by_day(&clips);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date_label, "October 27, 2025");
        assert_eq!(days[0].clips.len(), 2);
        assert!(days[0].clips[0].timestamp > days[0].clips[1].timestamp);
        assert_eq!(days[1].date_label, "October 26, 2025");
    }
}
