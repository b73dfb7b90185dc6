use common::CameraPosition;
use std::collections::BTreeSet;

/// Mutable playback state, owned by the synchronizer
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub current_footage_index: usize,
    /// Transport intent. Stays set while scrubbing so playback resumes after.
    pub is_playing: bool,
    pub is_seeking: bool,
    pub is_at_end_of_clip: bool,
    pub playback_rate: f64,
    /// Cameras of the current footage that reached their end
    pub per_camera_ended: BTreeSet<CameraPosition>,
    /// Cameras of the current footage whose source reported it can play
    pub ready_cameras: BTreeSet<CameraPosition>,
    /// Last authoritative global position in seconds
    pub global_time: f64,
    /// Set once any camera of the loaded timeline became ready
    pub has_loaded: bool,
}

impl PlaybackState {
    pub fn new(playback_rate: f64) -> Self {
        Self {
            current_footage_index: 0,
            is_playing: false,
            is_seeking: false,
            is_at_end_of_clip: false,
            playback_rate,
            per_camera_ended: BTreeSet::new(),
            ready_cameras: BTreeSet::new(),
            global_time: 0.0,
            has_loaded: false,
        }
    }

    /// Record that a camera ended. Cameras outside `required` are ignored.
    pub fn mark_ended(&mut self, camera: CameraPosition, required: &BTreeSet<CameraPosition>) -> bool {
        required.contains(&camera) && self.per_camera_ended.insert(camera)
    }

    /// True once every required camera has ended
    pub fn barrier_satisfied(&self, required: &BTreeSet<CameraPosition>) -> bool {
        required.is_subset(&self.per_camera_ended)
    }

    /// Forget per-source progress when the current footage changes
    pub fn reset_for_footage(&mut self, index: usize) {
        self.current_footage_index = index;
        self.per_camera_ended.clear();
        self.ready_cameras.clear();
    }
}
