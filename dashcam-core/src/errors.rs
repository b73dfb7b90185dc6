use common::DashcamError;
use thiserror::Error;

// ============================================================================
// Footage Assembly Errors
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FootageError {
    #[error("No video files provided")]
    NoVideoFiles,

    #[error("No valid footages found")]
    NoValidFootages,
}

// ============================================================================
// Event Metadata Errors
// ============================================================================

#[derive(Error, Debug)]
pub enum EventError {
    #[error("Failed to parse event metadata: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Event timestamp is not a valid date: {timestamp}")]
    InvalidTimestamp { timestamp: String },
}

// ============================================================================
// Playback Errors
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaybackError {
    #[error("No timeline loaded")]
    NoTimeline,

    #[error("Timeline has no footage")]
    EmptyTimeline,

    #[error("No camera handles registered")]
    NoCameras,

    #[error("Invalid playback rate: {rate} (must be between {min} and {max})")]
    InvalidPlaybackRate { rate: f64, min: f64, max: f64 },

    #[error("Footage index {index} out of range (timeline has {len})")]
    FootageOutOfRange { index: usize, len: usize },

    #[error("Clip has no event to jump to")]
    NoEvent,
}

// ============================================================================
// Error Conversion
// ============================================================================

impl From<FootageError> for DashcamError {
    fn from(err: FootageError) -> Self {
        DashcamError::NoFootage(err.to_string())
    }
}

impl From<EventError> for DashcamError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::Json(e) => DashcamError::SerdeError(e),
            other => DashcamError::InvalidParameter(other.to_string()),
        }
    }
}

impl From<PlaybackError> for DashcamError {
    fn from(err: PlaybackError) -> Self {
        match err {
            PlaybackError::FootageOutOfRange { index, .. } => DashcamError::FootageNotFound(index),
            PlaybackError::NoTimeline | PlaybackError::EmptyTimeline => {
                DashcamError::NoFootage(err.to_string())
            }
            other => DashcamError::InvalidParameter(other.to_string()),
        }
    }
}
