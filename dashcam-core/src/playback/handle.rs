use common::{CameraPosition, LoadToken, RawMediaFile};
use std::collections::BTreeMap;

// ============================================================================
// Media Handle Trait
// ============================================================================

/// One camera's media element as seen by the synchronizer.
///
/// Commands return immediately. Completion is reported later through
/// [`common::CameraEvent`]s carrying the token passed to the last `load`.
pub trait MediaHandle {
    /// Replace the media source. `None` blanks the element.
    fn load(&mut self, source: Option<&RawMediaFile>, token: LoadToken);

    /// Seek to a local position in seconds
    fn set_position(&mut self, seconds: f64);

    fn set_playback_rate(&mut self, rate: f64);

    fn play(&mut self);

    fn pause(&mut self);

    /// Current local position in seconds
    fn position(&self) -> f64;

    fn is_paused(&self) -> bool;

    fn is_ended(&self) -> bool;
}

// ============================================================================
// Camera Registry
// ============================================================================

/// Explicit camera → handle map owned by the synchronizer
#[derive(Debug)]
pub struct CameraRegistry<H> {
    handles: BTreeMap<CameraPosition, H>,
}

impl<H> Default for CameraRegistry<H> {
    fn default() -> Self {
        Self {
            handles: BTreeMap::new(),
        }
    }
}

impl<H: MediaHandle> CameraRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handle for every camera position
    pub fn with_all(mut factory: impl FnMut(CameraPosition) -> H) -> Self {
        let mut registry = Self::new();
        for camera in CameraPosition::ALL {
            registry.insert(camera, factory(camera));
        }
        registry
    }

    /// Register a handle, returning the one it replaces
    pub fn insert(&mut self, camera: CameraPosition, handle: H) -> Option<H> {
        self.handles.insert(camera, handle)
    }

    pub fn remove(&mut self, camera: CameraPosition) -> Option<H> {
        self.handles.remove(&camera)
    }

    pub fn get(&self, camera: CameraPosition) -> Option<&H> {
        self.handles.get(&camera)
    }

    pub fn get_mut(&mut self, camera: CameraPosition) -> Option<&mut H> {
        self.handles.get_mut(&camera)
    }

    pub fn contains(&self, camera: CameraPosition) -> bool {
        self.handles.contains_key(&camera)
    }

    pub fn cameras(&self) -> impl Iterator<Item = CameraPosition> + '_ {
        self.handles.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CameraPosition, &H)> {
        self.handles.iter().map(|(camera, handle)| (*camera, handle))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (CameraPosition, &mut H)> {
        self.handles.iter_mut().map(|(camera, handle)| (*camera, handle))
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
