use dashcam_core::{GroupingConfig, SegmenterConfig, SyncConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::ConfigError;

/// Viewer configuration, read from an optional TOML file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Clip splitting thresholds
    pub segmenter: SegmenterConfig,

    /// Footage grouping policy
    pub grouping: GroupingConfig,

    /// Playback synchronizer tuning
    pub sync: SyncConfig,

    /// Media duration probing
    pub probe: ProbeConfig,

    /// Headless playback driver
    pub player: PlayerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub ffprobe_path: PathBuf,

    /// Run ffprobe on every video; otherwise use the fallback duration
    pub probe_durations: bool,

    /// Duration assumed when probing is disabled or fails
    pub fallback_duration_secs: f64,

    pub timeout_secs: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            ffprobe_path: PathBuf::from("ffprobe"),
            probe_durations: true,
            fallback_duration_secs: 60.0,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Interval between simulation ticks
    pub tick_millis: u64,

    /// Media seconds simulated per wall-clock second, on top of the
    /// playback rate
    pub simulated_speed: f64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            tick_millis: 100,
            simulated_speed: 1.0,
        }
    }
}

impl ViewerConfig {
    /// Load from `path`, or fall back to defaults when no path is given
    pub async fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let numbers = [
            ("segmenter.gap_threshold_secs", self.segmenter.gap_threshold_secs),
            ("segmenter.nominal_footage_secs", self.segmenter.nominal_footage_secs),
            ("sync.default_rate", self.sync.default_rate),
            ("sync.min_rate", self.sync.min_rate),
            ("sync.max_rate", self.sync.max_rate),
            ("sync.event_pre_roll_secs", self.sync.event_pre_roll_secs),
            ("sync.footage_end_lead_secs", self.sync.footage_end_lead_secs),
            ("probe.fallback_duration_secs", self.probe.fallback_duration_secs),
            ("player.simulated_speed", self.player.simulated_speed),
        ];
        if let Some((name, value)) = numbers.iter().find(|(_, value)| !value.is_finite()) {
            return Err(ConfigError::Invalid {
                message: format!("{} must be a finite number, got {}", name, value),
            });
        }

        if self.segmenter.gap_threshold_secs <= 0.0 {
            return Err(ConfigError::Invalid {
                message: "segmenter.gap_threshold_secs must be positive".to_string(),
            });
        }

        if self.sync.min_rate <= 0.0 || self.sync.min_rate > self.sync.max_rate {
            return Err(ConfigError::Invalid {
                message: "sync.min_rate must be positive and not above sync.max_rate".to_string(),
            });
        }

        if !self.sync.is_valid_rate(self.sync.default_rate) {
            return Err(ConfigError::Invalid {
                message: format!(
                    "sync.default_rate {} is outside {}..={}",
                    self.sync.default_rate, self.sync.min_rate, self.sync.max_rate
                ),
            });
        }

        if self.probe.fallback_duration_secs < 0.0 {
            return Err(ConfigError::Invalid {
                message: "probe.fallback_duration_secs cannot be negative".to_string(),
            });
        }

        if self.player.tick_millis == 0 || self.player.simulated_speed <= 0.0 {
            return Err(ConfigError::Invalid {
                message: "player.tick_millis and player.simulated_speed must be positive"
                    .to_string(),
            });
        }

        Ok(())
    }
}
