use common::{CameraEvent, CameraEventKind, CameraPosition, LoadToken, RawMediaFile};
use std::collections::VecDeque;

use crate::playback::handle::MediaHandle;
use crate::playback::synchronizer::PlaybackSynchronizer;

/// Upper bound on callback rounds handled by one pump
const MAX_PUMP_ROUNDS: usize = 64;

// ============================================================================
// Simulated Camera
// ============================================================================

/// In-memory media handle that plays a source by advancing a clock.
///
/// Callbacks are queued instead of delivered, so the owner decides when the
/// synchronizer sees them.
#[derive(Debug, Clone)]
pub struct SimulatedCamera {
    camera: CameraPosition,
    token: LoadToken,
    /// Media length of the loaded source, `None` when blank
    duration: Option<f64>,
    position: f64,
    rate: f64,
    paused: bool,
    ended: bool,
    ready: bool,
    auto_ready: bool,
    events: VecDeque<CameraEvent>,
}

impl SimulatedCamera {
    pub fn new(camera: CameraPosition) -> Self {
        Self {
            camera,
            token: LoadToken::default(),
            duration: None,
            position: 0.0,
            rate: 1.0,
            paused: true,
            ended: false,
            ready: false,
            auto_ready: true,
            events: VecDeque::new(),
        }
    }

    /// Require an explicit [`mark_ready`](Self::mark_ready) after each load
    pub fn with_manual_ready(mut self) -> Self {
        self.auto_ready = false;
        self
    }

    pub fn camera(&self) -> CameraPosition {
        self.camera
    }

    pub fn token(&self) -> LoadToken {
        self.token
    }

    pub fn source_duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn playback_rate(&self) -> f64 {
        self.rate
    }

    pub fn is_blank(&self) -> bool {
        self.duration.is_none()
    }

    /// Report the loaded source as playable
    pub fn mark_ready(&mut self) {
        if self.duration.is_some() && !self.ready {
            self.ready = true;
            self.push(CameraEventKind::CanPlay);
        }
    }

    /// Move the clock forward by `wall_secs` of real time
    pub fn advance(&mut self, wall_secs: f64) {
        let Some(duration) = self.duration else {
            return;
        };
        if self.paused || self.ended || !self.ready {
            return;
        }

        self.position = (self.position + wall_secs * self.rate).min(duration);
        self.push(CameraEventKind::TimeUpdate {
            position: self.position,
        });

        if self.position >= duration {
            self.ended = true;
            self.paused = true;
            self.push(CameraEventKind::Ended);
        }
    }

    pub fn drain_events(&mut self) -> Vec<CameraEvent> {
        self.events.drain(..).collect()
    }

    fn push(&mut self, kind: CameraEventKind) {
        self.events
            .push_back(CameraEvent::new(self.camera, self.token, kind));
    }
}

impl MediaHandle for SimulatedCamera {
    fn load(&mut self, source: Option<&RawMediaFile>, token: LoadToken) {
        self.token = token;
        self.duration = source.map(|file| file.duration);
        self.position = 0.0;
        // A fresh source starts at normal speed
        self.rate = 1.0;
        self.paused = true;
        self.ended = false;
        self.ready = false;

        if self.auto_ready {
            self.mark_ready();
        }
    }

    fn set_position(&mut self, seconds: f64) {
        let Some(duration) = self.duration else {
            return;
        };
        let seconds = if seconds.is_nan() { 0.0 } else { seconds };
        self.position = seconds.clamp(0.0, duration);
        self.ended = self.position >= duration;
        if self.ended {
            self.paused = true;
        }
        self.push(CameraEventKind::Seeked {
            position: self.position,
            ended: self.ended,
        });
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.rate = rate;
    }

    fn play(&mut self) {
        if self.duration.is_some() && !self.ended {
            self.paused = false;
        }
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn position(&self) -> f64 {
        self.position
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn is_ended(&self) -> bool {
        self.ended
    }
}

// ============================================================================
// Simulation Driver
// ============================================================================

impl PlaybackSynchronizer<SimulatedCamera> {
    /// Deliver queued camera callbacks until none are left.
    ///
    /// Returns the number of events handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        for _ in 0..MAX_PUMP_ROUNDS {
            let events: Vec<CameraEvent> = self
                .cameras_mut()
                .iter_mut()
                .flat_map(|(_, camera)| camera.drain_events())
                .collect();
            if events.is_empty() {
                break;
            }
            for event in events {
                self.handle_event(event);
                handled += 1;
            }
        }
        handled
    }

    /// Advance every camera by `wall_secs` and deliver the resulting callbacks
    pub fn advance(&mut self, wall_secs: f64) -> usize {
        for (_, camera) in self.cameras_mut().iter_mut() {
            camera.advance(wall_secs);
        }
        self.pump()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(duration: f64) -> RawMediaFile {
        RawMediaFile::new("2024-06-19_14-30-00-front.mp4", 1, duration, "front.mp4")
    }

    #[test]
    fn test_load_queues_can_play() {
        let mut camera = SimulatedCamera::new(CameraPosition::Front);
        camera.load(Some(&source(10.0)), LoadToken(3));

        let events = camera.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].token, LoadToken(3));
        assert_eq!(events[0].kind, CameraEventKind::CanPlay);
        assert!(camera.is_paused());
    }

    #[test]
    fn test_blank_source_stays_silent() {
        let mut camera = SimulatedCamera::new(CameraPosition::Back);
        camera.load(None, LoadToken(1));
        camera.set_position(5.0);
        camera.play();
        camera.advance(1.0);

        assert!(camera.is_blank());
        assert!(camera.drain_events().is_empty());
        assert!(camera.is_paused());
    }

    #[test]
    fn test_advance_until_ended() {
        let mut camera = SimulatedCamera::new(CameraPosition::Front);
        camera.load(Some(&source(3.0)), LoadToken(1));
        camera.set_playback_rate(2.0);
        camera.play();
        camera.drain_events();

        camera.advance(1.0);
        assert_eq!(camera.position(), 2.0);
        camera.advance(1.0);
        assert_eq!(camera.position(), 3.0);
        assert!(camera.is_ended());

        let kinds: Vec<CameraEventKind> = camera.drain_events().into_iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                CameraEventKind::TimeUpdate { position: 2.0 },
                CameraEventKind::TimeUpdate { position: 3.0 },
                CameraEventKind::Ended,
            ]
        );
    }

    #[test]
    fn test_seek_past_end_reports_ended() {
        let mut camera = SimulatedCamera::new(CameraPosition::Front);
        camera.load(Some(&source(10.0)), LoadToken(1));
        camera.drain_events();

        camera.set_position(12.0);
        assert_eq!(
            camera.drain_events()[0].kind,
            CameraEventKind::Seeked { position: 10.0, ended: true }
        );
    }

    #[test]
    fn test_load_resets_playback_rate() {
        let mut camera = SimulatedCamera::new(CameraPosition::Front);
        camera.load(Some(&source(10.0)), LoadToken(1));
        camera.set_playback_rate(4.0);

        camera.load(Some(&source(10.0)), LoadToken(2));
        assert_eq!(camera.playback_rate(), 1.0);
    }

    #[test]
    fn test_manual_ready() {
        let mut camera = SimulatedCamera::new(CameraPosition::Front).with_manual_ready();
        camera.load(Some(&source(10.0)), LoadToken(1));
        camera.play();
        camera.advance(1.0);

        assert!(camera.drain_events().is_empty());
        assert_eq!(camera.position(), 0.0);

        camera.mark_ready();
        camera.advance(1.0);
        assert_eq!(camera.position(), 1.0);
    }
}
