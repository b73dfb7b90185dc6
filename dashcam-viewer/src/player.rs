use common::{CameraPosition, TransportState};
use dashcam_core::{CameraRegistry, PlaybackError, PlaybackSynchronizer, SimulatedCamera, UnifiedTimeline};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{PlayerConfig, ViewerConfig};

/// Ticks without any progress before the run is abandoned
const STALL_TICKS: u32 = 50;

/// Summary of one headless playback run
#[derive(Debug, Clone, PartialEq)]
pub struct PlayReport {
    pub final_state: TransportState,
    /// Footages entered after the starting one
    pub footage_transitions: usize,
    pub ticks: u64,
    pub final_time: f64,
}

/// Drives a synchronizer over simulated cameras on a wall-clock interval
pub struct HeadlessPlayer {
    sync: PlaybackSynchronizer<SimulatedCamera>,
    player: PlayerConfig,
}

impl HeadlessPlayer {
    pub fn new(config: &ViewerConfig) -> Self {
        let cameras = CameraRegistry::with_all(SimulatedCamera::new);
        Self {
            sync: PlaybackSynchronizer::new(cameras, config.sync.clone()),
            player: config.player.clone(),
        }
    }

    pub fn synchronizer(&self) -> &PlaybackSynchronizer<SimulatedCamera> {
        &self.sync
    }

    /// Load `timeline`, then apply the optional rate and start position
    pub fn load(
        &mut self,
        timeline: UnifiedTimeline,
        rate: Option<f64>,
        seek: Option<f64>,
    ) -> Result<(), PlaybackError> {
        self.sync.load(timeline)?;
        self.sync.pump();

        if let Some(rate) = rate {
            self.sync.set_playback_rate(rate)?;
        }
        if let Some(position) = seek {
            self.sync.seek(position)?;
            self.sync.pump();
        }
        Ok(())
    }

    /// Play until the end of the clip or until playback stops advancing
    pub async fn run(&mut self) -> Result<PlayReport, PlaybackError> {
        if !self.sync.state().is_playing {
            self.sync.play()?;
            self.sync.pump();
        }

        let tick = Duration::from_millis(self.player.tick_millis);
        let step = tick.as_secs_f64() * self.player.simulated_speed;
        let mut interval = tokio::time::interval(tick);

        let mut footage_index = self.sync.state().current_footage_index;
        let mut last_time = self.sync.global_time();
        let mut transitions = 0;
        let mut ticks = 0u64;
        let mut idle_ticks = 0u32;

        self.log_footage(footage_index);

        loop {
            interval.tick().await;
            self.sync.advance(step);
            ticks += 1;

            let snapshot = self.sync.snapshot();
            if snapshot.current_footage_index != footage_index {
                footage_index = snapshot.current_footage_index;
                transitions += 1;
                self.log_footage(footage_index);
            }

            if snapshot.state == TransportState::EndOfClip {
                info!("⏹ End of clip at {:.1}s", snapshot.global_time);
                break;
            }

            if snapshot.global_time == last_time {
                idle_ticks += 1;
                if idle_ticks >= STALL_TICKS {
                    warn!(
                        "Playback stalled at {:.1}s in state {:?}",
                        snapshot.global_time, snapshot.state
                    );
                    break;
                }
            } else {
                idle_ticks = 0;
                last_time = snapshot.global_time;
            }

            if ticks % 50 == 0 {
                debug!(
                    "t={:.1}s / {:.1}s ({:.0}%)",
                    snapshot.global_time,
                    snapshot.total_duration,
                    snapshot.progress_percent()
                );
            }
        }

        Ok(PlayReport {
            final_state: self.sync.transport_state(),
            footage_transitions: transitions,
            ticks,
            final_time: self.sync.global_time(),
        })
    }

    fn log_footage(&self, index: usize) {
        let Some(timeline) = self.sync.timeline() else {
            return;
        };
        let Some(footage) = timeline.footage(index) else {
            return;
        };
        let missing: Vec<CameraPosition> = footage.missing_cameras();
        info!(
            "▶ Footage {}/{} {} ({:.1}s){}",
            index + 1,
            timeline.len(),
            footage.timestamp_key,
            footage.duration,
            if missing.is_empty() {
                String::new()
            } else {
                format!(" missing: {:?}", missing)
            }
        );
    }
}
