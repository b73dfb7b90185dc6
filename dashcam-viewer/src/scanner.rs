use common::filename::{is_dashcam_video, is_strict_dashcam_video};
use common::{ClipCategory, ClipEvent, RawMediaFile};
use dashcam_core::event::{find_event_file, parse_event_lenient};
use dashcam_core::{ClipEntry, ClipSegmenter, LibraryIndex};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::errors::LibraryError;
use crate::prober::{probe_or_fallback, MediaProber};

// ============================================================================
// Layout Detection
// ============================================================================

/// What kind of directory the user pointed the viewer at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryLayout {
    /// TeslaCam root holding at least one category folder
    Root {
        has_recent: bool,
        has_saved: bool,
        has_sentry: bool,
    },
    /// A single clip; `clip_dir` is where its videos live
    SingleClip { clip_dir: PathBuf },
    Invalid,
}

/// Classify `dir` as a library root, a single clip folder, or neither
pub fn detect_layout(dir: &Path) -> Result<LibraryLayout, LibraryError> {
    if !dir.is_dir() {
        return Err(LibraryError::NotFound {
            path: dir.to_path_buf(),
        });
    }

    let has = |category: ClipCategory| dir.join(category.directory_name()).is_dir();
    let has_recent = has(ClipCategory::Recent);
    let has_saved = has(ClipCategory::Saved);
    let has_sentry = has(ClipCategory::Sentry);
    if has_recent || has_saved || has_sentry {
        return Ok(LibraryLayout::Root {
            has_recent,
            has_saved,
            has_sentry,
        });
    }

    if contains_strict_video(dir) {
        return Ok(LibraryLayout::SingleClip {
            clip_dir: dir.to_path_buf(),
        });
    }

    for sub_dir in list_subdirectories(dir)? {
        if contains_strict_video(&sub_dir) {
            return Ok(LibraryLayout::SingleClip { clip_dir: sub_dir });
        }
    }

    Ok(LibraryLayout::Invalid)
}

fn contains_strict_video(dir: &Path) -> bool {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file())
        .any(|entry| is_strict_dashcam_video(&entry.file_name().to_string_lossy()))
}

/// Immediate sub-directories of `dir`, sorted by name
fn list_subdirectories(dir: &Path) -> Result<Vec<PathBuf>, LibraryError> {
    let mut dirs = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_dir() {
            dirs.push(entry.into_path());
        }
    }
    Ok(dirs)
}

// ============================================================================
// Library Scanner
// ============================================================================

/// Clip directory contents ready for assembly
#[derive(Debug, Clone)]
pub struct LoadedClip {
    pub directory_name: String,
    pub files: Vec<RawMediaFile>,
    pub event: Option<ClipEvent>,
}

/// Reads clip folders from disk into [`RawMediaFile`] lists
pub struct LibraryScanner {
    prober: Box<dyn MediaProber>,
    segmenter: ClipSegmenter,
    fallback_duration: f64,
}

impl LibraryScanner {
    pub fn new(prober: Box<dyn MediaProber>, segmenter: ClipSegmenter, fallback_duration: f64) -> Self {
        Self {
            prober,
            segmenter,
            fallback_duration,
        }
    }

    /// List the files directly inside `dir`, sorted by name.
    ///
    /// Video durations are probed when `probe` is set, otherwise every file
    /// reports a zero duration.
    pub async fn scan_directory(&self, dir: &Path, probe: bool) -> Result<Vec<RawMediaFile>, LibraryError> {
        if !dir.is_dir() {
            return Err(LibraryError::NotFound {
                path: dir.to_path_buf(),
            });
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().to_string();
            let size = entry.metadata()?.len();
            let duration = if probe && is_dashcam_video(&name) {
                probe_or_fallback(self.prober.as_ref(), entry.path(), self.fallback_duration).await
            } else {
                0.0
            };

            files.push(RawMediaFile::new(name, size, duration, entry.path()));
        }

        debug!("Found {} file(s) in {:?}", files.len(), dir);
        Ok(files)
    }

    /// Index every clip under a TeslaCam root
    pub async fn scan_library(&self, root: &Path) -> Result<LibraryIndex, LibraryError> {
        let LibraryLayout::Root { .. } = detect_layout(root)? else {
            return Err(LibraryError::InvalidLibrary {
                path: root.to_path_buf(),
            });
        };

        let nominal = self.segmenter.config().nominal_footage_secs;
        let mut index = LibraryIndex::default();

        for category in ClipCategory::ALL {
            let category_dir = root.join(category.directory_name());
            if !category_dir.is_dir() {
                debug!("No {} directory in {:?}", category.directory_name(), root);
                continue;
            }

            let entries = if category.is_folder_based() {
                let mut entries = Vec::new();
                for folder in list_subdirectories(&category_dir)? {
                    let Some(folder_name) = folder.file_name().map(|n| n.to_string_lossy().to_string()) else {
                        continue;
                    };
                    let files = self.scan_directory(&folder, false).await?;
                    entries.extend(ClipEntry::from_folder(category, &folder_name, files, nominal));
                }
                entries
            } else {
                let files = self.scan_directory(&category_dir, false).await?;
                ClipEntry::from_recent(&files, &self.segmenter)
            };

            info!("Loaded {} {} clip(s)", entries.len(), category);
            index.set_category(category, entries);
        }

        Ok(index)
    }

    /// Read one clip folder with probed durations and its event metadata
    pub async fn load_clip(&self, dir: &Path) -> Result<LoadedClip, LibraryError> {
        let files = self.scan_directory(dir, true).await?;

        let event = match find_event_file(&files) {
            Some(event_file) => match tokio::fs::read_to_string(&event_file.source).await {
                Ok(text) => parse_event_lenient(&text),
                Err(e) => {
                    warn!("Failed to read {:?}: {}", event_file.source, e);
                    None
                }
            },
            None => None,
        };

        let directory_name = dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(LoadedClip {
            directory_name,
            files,
            event,
        })
    }
}
