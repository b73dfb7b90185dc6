use common::{
    CameraEvent, CameraEventKind, CameraPosition, FootageNavigation, LoadToken, PlaybackCommand,
    PlaybackSnapshot, TransportState,
};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

use crate::config::SyncConfig;
use crate::errors::PlaybackError;
use crate::event::event_marker;
use crate::footage::Footage;
use crate::playback::handle::{CameraRegistry, MediaHandle};
use crate::playback::state::PlaybackState;
use crate::timeline::UnifiedTimeline;

// ============================================================================
// Playback Synchronizer
// ============================================================================

/// Keeps every camera of the current footage in lockstep and advances to
/// the next footage once all of them have finished.
///
/// The synchronizer never blocks. It issues commands to its camera handles
/// and reacts to [`CameraEvent`]s fed back through [`handle_event`]. Each
/// source swap bumps the [`LoadToken`]; events carrying an older token are
/// dropped.
///
/// [`handle_event`]: PlaybackSynchronizer::handle_event
pub struct PlaybackSynchronizer<H: MediaHandle> {
    config: SyncConfig,
    cameras: CameraRegistry<H>,
    timeline: Option<UnifiedTimeline>,
    state: PlaybackState,
    token: LoadToken,
    /// Drops the first progress report after a swap
    switching: bool,
}

impl<H: MediaHandle> PlaybackSynchronizer<H> {
    pub fn new(cameras: CameraRegistry<H>, config: SyncConfig) -> Self {
        let state = PlaybackState::new(config.default_rate);
        Self {
            config,
            cameras,
            timeline: None,
            state,
            token: LoadToken::default(),
            switching: false,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn timeline(&self) -> Option<&UnifiedTimeline> {
        self.timeline.as_ref()
    }

    pub fn cameras(&self) -> &CameraRegistry<H> {
        &self.cameras
    }

    pub fn cameras_mut(&mut self) -> &mut CameraRegistry<H> {
        &mut self.cameras
    }

    pub fn current_token(&self) -> LoadToken {
        self.token
    }

    pub fn global_time(&self) -> f64 {
        self.state.global_time
    }

    pub fn current_footage(&self) -> Option<&Footage> {
        self.timeline
            .as_ref()?
            .footage(self.state.current_footage_index)
    }

    pub fn transport_state(&self) -> TransportState {
        if self.timeline.is_none() {
            TransportState::Idle
        } else if self.state.is_at_end_of_clip {
            TransportState::EndOfClip
        } else if self.state.is_seeking {
            TransportState::Seeking
        } else if !self.state.has_loaded {
            TransportState::Loading
        } else if self.state.is_playing {
            TransportState::Playing
        } else {
            TransportState::Paused
        }
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            state: self.transport_state(),
            current_footage_index: self.state.current_footage_index,
            global_time: self.state.global_time,
            total_duration: self.timeline.as_ref().map_or(0.0, |t| t.total_duration),
            playback_rate: self.state.playback_rate,
            is_playing: self.state.is_playing,
            is_seeking: self.state.is_seeking,
            is_at_end_of_clip: self.state.is_at_end_of_clip,
            ended_cameras: self.state.per_camera_ended.clone(),
            ready_cameras: self.state.ready_cameras.clone(),
        }
    }

    pub fn navigation(&self) -> Option<FootageNavigation> {
        let timeline = self.timeline.as_ref()?;
        Some(timeline.navigation(self.state.current_footage_index, self.state.global_time))
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Load a timeline and point every camera at its first footage
    pub fn load(&mut self, timeline: UnifiedTimeline) -> Result<(), PlaybackError> {
        if self.cameras.is_empty() {
            return Err(PlaybackError::NoCameras);
        }
        if timeline.is_empty() {
            return Err(PlaybackError::EmptyTimeline);
        }

        info!(
            "Loading clip {}: {} footages, {:.1}s",
            timeline.clip_id,
            timeline.len(),
            timeline.total_duration
        );

        for (_, handle) in self.cameras.iter_mut() {
            handle.pause();
        }

        self.timeline = Some(timeline);
        self.state = PlaybackState::new(self.state.playback_rate);
        self.state.is_playing = self.config.autoplay;
        self.swap_to(0, 0.0);

        if self.state.is_playing {
            self.start_cameras(false);
        }
        // A footage with no registered camera never reports back
        self.evaluate_barrier();
        Ok(())
    }

    /// Blank every camera and return to idle
    pub fn unload(&mut self) {
        self.token = self.token.next();
        for (_, handle) in self.cameras.iter_mut() {
            handle.pause();
            handle.load(None, self.token);
        }
        if let Some(timeline) = self.timeline.take() {
            info!("Unloaded clip {}", timeline.clip_id);
        }
        self.state = PlaybackState::new(self.state.playback_rate);
        self.switching = false;
    }

    /// Point every registered camera at footage `index`, positioned at
    /// `local_time`. Cameras without a file get a blank source.
    fn swap_to(&mut self, index: usize, local_time: f64) {
        let Some(footage) = self.timeline.as_ref().and_then(|t| t.footage(index)) else {
            warn!("Cannot swap to missing footage {}", index);
            return;
        };

        self.token = self.token.next();
        self.switching = true;
        self.state.reset_for_footage(index);

        let rate = self.state.playback_rate;
        for (camera, handle) in self.cameras.iter_mut() {
            let source = footage.file_for(camera);
            handle.load(source, self.token);
            handle.set_playback_rate(rate);
            if source.is_some() {
                handle.set_position(local_time);
            }
        }

        debug!(
            "Swapped to footage {} ({}) at {:.2}s, token {:?}",
            index, footage.timestamp_key, local_time, self.token
        );
    }

    // ========================================================================
    // Camera Bookkeeping
    // ========================================================================

    /// Cameras the advance barrier waits on: those with a file in the
    /// current footage and a registered handle
    fn required_cameras(&self) -> BTreeSet<CameraPosition> {
        match self.current_footage() {
            Some(footage) => footage
                .available_cameras
                .iter()
                .copied()
                .filter(|camera| self.cameras.contains(*camera))
                .collect(),
            None => BTreeSet::new(),
        }
    }

    /// Camera whose progress drives the displayed global time
    fn display_camera(&self) -> Option<CameraPosition> {
        let footage = self.current_footage()?;
        footage
            .display_camera()
            .filter(|camera| self.cameras.contains(*camera))
            .or_else(|| self.required_cameras().into_iter().next())
    }

    /// Start cameras that have not ended, optionally only those already
    /// reported ready
    fn start_cameras(&mut self, ready_only: bool) {
        let required = self.required_cameras();
        for (camera, handle) in self.cameras.iter_mut() {
            if !required.contains(&camera) || self.state.per_camera_ended.contains(&camera) {
                continue;
            }
            if ready_only && !self.state.ready_cameras.contains(&camera) {
                continue;
            }
            handle.play();
        }
    }

    fn pause_cameras(&mut self) {
        for (_, handle) in self.cameras.iter_mut() {
            handle.pause();
        }
    }

    /// Mark cameras whose own duration lies at or before `local_time` as
    /// ended and clear the rest
    fn check_seek_ends(&mut self, local_time: f64) {
        let required = self.required_cameras();
        let Some(footage) = self.current_footage() else {
            return;
        };

        let past_end: Vec<(CameraPosition, bool)> = required
            .iter()
            .map(|camera| {
                let ended = footage
                    .camera_duration(*camera)
                    .map_or(false, |d| d > 0.0 && local_time >= d);
                (*camera, ended)
            })
            .collect();

        for (camera, ended) in past_end {
            if ended {
                if self.state.mark_ended(camera, &required) {
                    debug!("Camera {} is past its end after seek", camera);
                }
            } else {
                self.state.per_camera_ended.remove(&camera);
            }
        }
    }

    fn mark_camera_ended(&mut self, camera: CameraPosition) {
        let required = self.required_cameras();
        if self.state.mark_ended(camera, &required) {
            debug!(
                "Camera {} ended ({}/{})",
                camera,
                self.state.per_camera_ended.len(),
                required.len()
            );
        }
        self.evaluate_barrier();
    }

    // ========================================================================
    // Advance Barrier
    // ========================================================================

    /// Advance or finish once every required camera has ended.
    ///
    /// Only acts while playing and not scrubbing; a satisfied barrier is
    /// otherwise held until playback resumes.
    fn evaluate_barrier(&mut self) {
        loop {
            if !self.state.is_playing || self.state.is_seeking || self.state.is_at_end_of_clip {
                return;
            }
            let required = self.required_cameras();
            if !self.state.barrier_satisfied(&required) {
                return;
            }

            let Some(timeline) = self.timeline.as_ref() else {
                return;
            };
            let next = self.state.current_footage_index + 1;
            let Some(next_start) = timeline.boundary(next).map(|b| b.start_time) else {
                self.enter_end_of_clip();
                return;
            };

            info!(
                "All cameras finished footage {}, advancing to footage {}",
                self.state.current_footage_index, next
            );
            self.swap_to(next, 0.0);
            self.state.global_time = next_start;
            self.start_cameras(false);
        }
    }

    fn enter_end_of_clip(&mut self) {
        self.pause_cameras();
        self.state.is_playing = false;
        self.state.is_at_end_of_clip = true;
        self.state.per_camera_ended.clear();
        if let Some(timeline) = self.timeline.as_ref() {
            self.state.global_time = timeline.total_duration;
            info!("Reached end of clip {}", timeline.clip_id);
        }
    }

    // ========================================================================
    // Transport Control
    // ========================================================================

    pub fn play(&mut self) -> Result<(), PlaybackError> {
        if self.timeline.is_none() {
            return Err(PlaybackError::NoTimeline);
        }

        if self.state.is_at_end_of_clip {
            info!("Restarting clip from the first footage");
            self.state.is_at_end_of_clip = false;
            self.state.is_playing = true;
            self.state.global_time = 0.0;
            self.swap_to(0, 0.0);
            self.start_cameras(false);
            self.evaluate_barrier();
            return Ok(());
        }

        self.state.is_playing = true;
        if !self.state.is_seeking {
            self.start_cameras(false);
            self.evaluate_barrier();
        }
        debug!("Play at {:.2}s", self.state.global_time);
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), PlaybackError> {
        if self.timeline.is_none() {
            return Err(PlaybackError::NoTimeline);
        }
        self.state.is_playing = false;
        self.pause_cameras();
        debug!("Pause at {:.2}s", self.state.global_time);
        Ok(())
    }

    pub fn toggle_play(&mut self) -> Result<(), PlaybackError> {
        if self.state.is_playing {
            self.pause()
        } else {
            self.play()
        }
    }

    /// Apply one rate to every camera
    pub fn set_playback_rate(&mut self, rate: f64) -> Result<(), PlaybackError> {
        if !self.config.is_valid_rate(rate) {
            return Err(PlaybackError::InvalidPlaybackRate {
                rate,
                min: self.config.min_rate,
                max: self.config.max_rate,
            });
        }

        self.state.playback_rate = rate;
        for (_, handle) in self.cameras.iter_mut() {
            handle.set_playback_rate(rate);
        }
        debug!("Playback rate set to {}x", rate);
        Ok(())
    }

    // ========================================================================
    // Seeking
    // ========================================================================

    /// Seek to a global position, swapping footage when it changes
    pub fn seek(&mut self, global_time: f64) -> Result<(), PlaybackError> {
        let timeline = self.timeline.as_ref().ok_or(PlaybackError::NoTimeline)?;
        let position = timeline.global_to_local(global_time);
        let target = timeline.local_to_global(position.footage_index, position.local_time);

        self.state.is_at_end_of_clip = false;

        if position.footage_index != self.state.current_footage_index {
            info!(
                "Seek to {:.2}s moves from footage {} to {}",
                target, self.state.current_footage_index, position.footage_index
            );
            self.swap_to(position.footage_index, position.local_time);
        } else if let Some(footage) = self.current_footage() {
            let available = footage.available_cameras.clone();
            let rate = self.state.playback_rate;
            for (camera, handle) in self.cameras.iter_mut() {
                if available.contains(&camera) {
                    handle.set_playback_rate(rate);
                    handle.set_position(position.local_time);
                }
            }
            debug!("Seek to {:.2}s within footage {}", target, position.footage_index);
        }

        self.state.global_time = target;
        self.check_seek_ends(position.local_time);

        if self.state.is_playing && !self.state.is_seeking {
            self.start_cameras(false);
        }
        self.evaluate_barrier();
        Ok(())
    }

    /// Seek by `delta` seconds from the current position
    pub fn seek_relative(&mut self, delta: f64) -> Result<(), PlaybackError> {
        let delta = if delta.is_nan() { 0.0 } else { delta };
        self.seek(self.state.global_time + delta)
    }

    /// Enter scrubbing: cameras hold still until [`end_scrub`]
    ///
    /// [`end_scrub`]: PlaybackSynchronizer::end_scrub
    pub fn begin_scrub(&mut self) -> Result<(), PlaybackError> {
        if self.timeline.is_none() {
            return Err(PlaybackError::NoTimeline);
        }
        self.state.is_seeking = true;
        self.pause_cameras();
        debug!("Scrub started");
        Ok(())
    }

    /// Leave scrubbing, resuming ready cameras when the transport is playing
    pub fn end_scrub(&mut self) -> Result<(), PlaybackError> {
        if self.timeline.is_none() {
            return Err(PlaybackError::NoTimeline);
        }
        self.state.is_seeking = false;
        if self.state.is_playing {
            self.start_cameras(true);
        }
        debug!("Scrub ended at {:.2}s", self.state.global_time);
        self.evaluate_barrier();
        Ok(())
    }

    /// Seek to a few seconds before the clip's event.
    ///
    /// Returns `Ok(false)` when the event lies outside the timeline.
    pub fn jump_to_event(&mut self) -> Result<bool, PlaybackError> {
        let timeline = self.timeline.as_ref().ok_or(PlaybackError::NoTimeline)?;
        if timeline.event.is_none() {
            return Err(PlaybackError::NoEvent);
        }

        match event_marker(timeline) {
            Some(marker) => {
                let target = (marker.seconds - self.config.event_pre_roll_secs).max(0.0);
                info!("Jumping to event at {:.2}s", marker.seconds);
                self.seek(target)?;
                Ok(true)
            }
            None => {
                debug!("Event is outside clip {}, ignoring jump", timeline.clip_id);
                Ok(false)
            }
        }
    }

    /// Seek to just before the end of the current footage
    pub fn jump_to_footage_end(&mut self) -> Result<bool, PlaybackError> {
        let timeline = self.timeline.as_ref().ok_or(PlaybackError::NoTimeline)?;
        let Some(end) = timeline
            .boundary(self.state.current_footage_index)
            .map(|b| b.end_time)
        else {
            return Ok(false);
        };

        let lead = self.config.footage_end_lead_secs;
        if end < lead {
            return Ok(false);
        }
        self.seek(end - lead)?;
        Ok(true)
    }

    // ========================================================================
    // Footage Navigation
    // ========================================================================

    /// Seek to the start of footage `index`
    pub fn go_to_footage(&mut self, index: usize) -> Result<(), PlaybackError> {
        let timeline = self.timeline.as_ref().ok_or(PlaybackError::NoTimeline)?;
        let start = timeline
            .boundary(index)
            .map(|b| b.start_time)
            .ok_or(PlaybackError::FootageOutOfRange {
                index,
                len: timeline.len(),
            })?;
        self.seek(start)
    }

    pub fn next_footage(&mut self) -> Result<bool, PlaybackError> {
        let timeline = self.timeline.as_ref().ok_or(PlaybackError::NoTimeline)?;
        let next = self.state.current_footage_index + 1;
        if next >= timeline.len() {
            return Ok(false);
        }
        self.go_to_footage(next)?;
        Ok(true)
    }

    pub fn previous_footage(&mut self) -> Result<bool, PlaybackError> {
        if self.timeline.is_none() {
            return Err(PlaybackError::NoTimeline);
        }
        let Some(previous) = self.state.current_footage_index.checked_sub(1) else {
            return Ok(false);
        };
        self.go_to_footage(previous)?;
        Ok(true)
    }

    /// Dispatch a transport command
    pub fn apply(&mut self, command: PlaybackCommand) -> Result<(), PlaybackError> {
        match command {
            PlaybackCommand::Play => self.play(),
            PlaybackCommand::Pause => self.pause(),
            PlaybackCommand::TogglePlay => self.toggle_play(),
            PlaybackCommand::Seek { position } => self.seek(position),
            PlaybackCommand::SeekRelative { delta } => self.seek_relative(delta),
            PlaybackCommand::BeginScrub => self.begin_scrub(),
            PlaybackCommand::EndScrub => self.end_scrub(),
            PlaybackCommand::SetRate { rate } => self.set_playback_rate(rate),
            PlaybackCommand::JumpToEvent => self.jump_to_event().map(|_| ()),
            PlaybackCommand::JumpToFootageEnd => self.jump_to_footage_end().map(|_| ()),
            PlaybackCommand::NextFootage => self.next_footage().map(|_| ()),
            PlaybackCommand::PreviousFootage => self.previous_footage().map(|_| ()),
        }
    }

    // ========================================================================
    // Camera Callbacks
    // ========================================================================

    /// React to a callback from one camera
    pub fn handle_event(&mut self, event: CameraEvent) {
        if self.timeline.is_none() {
            return;
        }
        if event.token != self.token {
            debug!(
                "Ignoring stale {:?} from {} (token {:?}, current {:?})",
                event.kind, event.camera, event.token, self.token
            );
            return;
        }
        if !self.required_cameras().contains(&event.camera) {
            debug!("Ignoring {:?} from inactive camera {}", event.kind, event.camera);
            return;
        }

        let camera = event.camera;
        match &event.kind {
            CameraEventKind::CanPlay => self.on_can_play(camera),
            CameraEventKind::TimeUpdate { position } => self.on_time_update(camera, *position),
            CameraEventKind::Seeked { .. } | CameraEventKind::Ended => {
                if self.camera_at_end(camera) {
                    self.mark_camera_ended(camera);
                } else if matches!(event.kind, CameraEventKind::Ended) {
                    debug!("Ignoring end report from {}, it has moved on", camera);
                }
            }
        }
    }

    /// Whether a camera's handle currently sits at the end of its media.
    ///
    /// End reports are checked against the handle so that a report queued
    /// before a later seek in the same footage cannot re-mark the camera.
    fn camera_at_end(&self, camera: CameraPosition) -> bool {
        let Some(handle) = self.cameras.get(camera) else {
            return false;
        };
        if handle.is_ended() {
            return true;
        }
        self.current_footage()
            .and_then(|f| f.camera_duration(camera))
            .map_or(false, |d| d > 0.0 && handle.position() >= d)
    }

    fn on_can_play(&mut self, camera: CameraPosition) {
        self.state.ready_cameras.insert(camera);
        if !self.state.has_loaded {
            self.state.has_loaded = true;
            debug!("First camera ready: {}", camera);
        }

        let should_play = self.state.is_playing
            && !self.state.is_seeking
            && !self.state.per_camera_ended.contains(&camera);
        if should_play {
            if let Some(handle) = self.cameras.get_mut(camera) {
                handle.play();
            }
        }
    }

    fn on_time_update(&mut self, camera: CameraPosition, position: f64) {
        if self.display_camera() != Some(camera) {
            return;
        }
        if self.switching {
            self.switching = false;
            debug!("Dropping first progress report after swap");
            return;
        }
        if self.state.is_seeking {
            return;
        }
        if let Some(timeline) = self.timeline.as_ref() {
            self.state.global_time =
                timeline.local_to_global(self.state.current_footage_index, position);
        }
    }
}
