use common::{ClipEvent, RawMediaFile};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::GroupingConfig;
use crate::errors::FootageError;
use crate::footage::{resolve_durations, Clip, Footage, FootageGrouper};

/// Footages shorter than this are reported as suspicious
const SHORT_FOOTAGE_SECS: f64 = 5.0;

/// Outcome of turning a directory's files into a playable clip
#[derive(Debug, Clone)]
pub struct FootageProcessingResult {
    pub success: bool,
    pub clip: Option<Clip>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub processing_time: Duration,
}

/// Runs grouping and duration resolution to produce a [`Clip`]
#[derive(Debug, Clone, Default)]
pub struct ClipAssembler {
    grouper: FootageGrouper,
}

impl ClipAssembler {
    pub fn new(config: GroupingConfig) -> Self {
        Self {
            grouper: FootageGrouper::new(config),
        }
    }

    /// Build a clip, failing when there is nothing playable
    pub fn assemble(
        &self,
        files: &[RawMediaFile],
        directory_name: &str,
        event: Option<ClipEvent>,
    ) -> Result<Clip, FootageError> {
        self.assemble_with_warnings(files, directory_name, event)
            .map(|(clip, _)| clip)
    }

    /// Build a clip and collect validation warnings instead of failing fast
    pub fn process(
        &self,
        files: &[RawMediaFile],
        directory_name: &str,
        event: Option<ClipEvent>,
    ) -> FootageProcessingResult {
        let started = Instant::now();

        match self.assemble_with_warnings(files, directory_name, event) {
            Ok((clip, warnings)) => {
                info!(
                    "Assembled clip {} with {} footages ({:.1}s)",
                    clip.id, clip.total_footages, clip.total_duration
                );
                FootageProcessingResult {
                    success: true,
                    clip: Some(clip),
                    errors: Vec::new(),
                    warnings,
                    processing_time: started.elapsed(),
                }
            }
            Err(e) => {
                warn!("Clip assembly failed for {}: {}", directory_name, e);
                FootageProcessingResult {
                    success: false,
                    clip: None,
                    errors: vec![e.to_string()],
                    warnings: Vec::new(),
                    processing_time: started.elapsed(),
                }
            }
        }
    }

    fn assemble_with_warnings(
        &self,
        files: &[RawMediaFile],
        directory_name: &str,
        event: Option<ClipEvent>,
    ) -> Result<(Clip, Vec<String>), FootageError> {
        let videos: Vec<RawMediaFile> = files.iter().filter(|f| f.is_video()).cloned().collect();
        if videos.is_empty() {
            return Err(FootageError::NoVideoFiles);
        }

        let mut footages = self.grouper.group(&videos);
        if footages.is_empty() {
            return Err(FootageError::NoValidFootages);
        }

        resolve_durations(&mut footages);
        let warnings = validate_footages(&footages);

        let id = format!("clip-{}", Uuid::new_v4());
        debug!("Creating clip {} from {} video files", id, videos.len());
        let clip = Clip::from_footages(id, directory_name, footages, event)
            .ok_or(FootageError::NoValidFootages)?;

        Ok((clip, warnings))
    }
}

fn validate_footages(footages: &[Footage]) -> Vec<String> {
    let mut warnings = Vec::new();

    let incomplete = footages.iter().filter(|f| !f.is_complete).count();
    if incomplete > 0 {
        warnings.push(format!("{} footage(s) missing some camera angles", incomplete));
    }

    let short = footages
        .iter()
        .filter(|f| f.duration < SHORT_FOOTAGE_SECS)
        .count();
    if short > 0 {
        warnings.push(format!(
            "{} footage(s) are very short (< {} seconds)",
            short, SHORT_FOOTAGE_SECS
        ));
    }

    warnings
}
