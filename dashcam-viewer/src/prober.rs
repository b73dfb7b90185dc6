use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command as AsyncCommand;
use tracing::{debug, warn};

use crate::config::ProbeConfig;
use crate::errors::ProbeError;

// ============================================================================
// Media Prober Trait
// ============================================================================

/// Measures the playable length of a media file
#[async_trait]
pub trait MediaProber: Send + Sync {
    /// Duration of the media at `path`, in seconds
    async fn probe_duration(&self, path: &Path) -> Result<f64, ProbeError>;
}

/// Probe `path`, falling back to `fallback` seconds when the prober fails
pub async fn probe_or_fallback(prober: &dyn MediaProber, path: &Path, fallback: f64) -> f64 {
    match prober.probe_duration(path).await {
        Ok(duration) => duration,
        Err(e) => {
            warn!("Duration probe failed for {:?}: {}, using {}s", path, e, fallback);
            fallback
        }
    }
}

/// Build the prober selected by `config`
pub fn from_config(config: &ProbeConfig) -> Box<dyn MediaProber> {
    if config.probe_durations {
        Box::new(FfprobeProber::new(
            config.ffprobe_path.clone(),
            Duration::from_secs(config.timeout_secs),
        ))
    } else {
        Box::new(FixedDurationProber::new(config.fallback_duration_secs))
    }
}

// ============================================================================
// ffprobe Implementation
// ============================================================================

pub struct FfprobeProber {
    ffprobe_path: PathBuf,
    timeout: Duration,
}

impl FfprobeProber {
    pub fn new(ffprobe_path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
            timeout,
        }
    }
}

impl Default for FfprobeProber {
    fn default() -> Self {
        Self::new("ffprobe", Duration::from_secs(10))
    }
}

#[async_trait]
impl MediaProber for FfprobeProber {
    async fn probe_duration(&self, path: &Path) -> Result<f64, ProbeError> {
        debug!("Probing duration of {:?}", path);

        let result = tokio::time::timeout(
            self.timeout,
            AsyncCommand::new(&self.ffprobe_path)
                .args([
                    "-v",
                    "error",
                    "-show_entries",
                    "format=duration",
                    "-of",
                    "default=noprint_wrappers=1:nokey=1",
                ])
                .arg(path)
                .kill_on_drop(true)
                .output(),
        )
        .await;

        match result {
            Ok(Ok(output)) => {
                if !output.status.success() {
                    return Err(ProbeError::CommandFailed {
                        message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                    });
                }
                parse_duration_output(&String::from_utf8_lossy(&output.stdout))
            }
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => Err(ProbeError::NotAvailable),
            Ok(Err(e)) => Err(ProbeError::Io(e)),
            Err(_) => Err(ProbeError::Timeout {
                duration: self.timeout,
            }),
        }
    }
}

/// Parse the bare duration line printed by ffprobe
fn parse_duration_output(output: &str) -> Result<f64, ProbeError> {
    let line = output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or_else(|| ProbeError::ParseError {
            reason: "empty ffprobe output".to_string(),
        })?;

    let duration: f64 = line.parse().map_err(|_| ProbeError::ParseError {
        reason: format!("invalid duration: {}", line),
    })?;

    if !duration.is_finite() || duration < 0.0 {
        return Err(ProbeError::ParseError {
            reason: format!("invalid duration: {}", line),
        });
    }

    Ok(duration)
}

// ============================================================================
// Fixed Duration Implementation
// ============================================================================

/// Reports the same duration for every file, used when ffprobe is disabled
pub struct FixedDurationProber {
    duration: f64,
}

impl FixedDurationProber {
    pub fn new(duration: f64) -> Self {
        Self { duration }
    }
}

#[async_trait]
impl MediaProber for FixedDurationProber {
    async fn probe_duration(&self, _path: &Path) -> Result<f64, ProbeError> {
        Ok(self.duration)
    }
}
