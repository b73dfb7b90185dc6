pub mod config;
pub mod errors;
pub mod clip;
pub mod footage;
pub mod timeline;
pub mod event;
pub mod playback;
pub mod library;
pub mod format;

pub use config::{GroupingConfig, SegmenterConfig, SyncConfig, UnknownCameraPolicy};
pub use errors::{EventError, FootageError, PlaybackError};

pub use clip::{ClipAnalysis, ClipAssembler, ClipSegmenter, DetectedClip, FootageProcessingResult};
pub use footage::{resolve_durations, Clip, Footage, FootageGrouper};
pub use timeline::{LocalPosition, TimelineBoundary, TimelineBuilder, UnifiedTimeline};
pub use event::EventMarker;
pub use playback::{
    CameraRegistry, MediaHandle, PlaybackState, PlaybackSynchronizer, SimulatedCamera,
};
pub use library::{ClipDayGroup, ClipEntry, LibraryIndex};
