use common::{ClipEvent, RawMediaFile};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::EventError;
use crate::timeline::UnifiedTimeline;

/// Position of a clip's event on the timeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventMarker {
    /// Seconds from the start of the first footage
    pub seconds: f64,
    /// Position as a percentage of the total duration
    pub percentage: f64,
}

/// Parse the contents of an `event.json` file
pub fn parse_event(text: &str) -> Result<ClipEvent, EventError> {
    let event: ClipEvent = serde_json::from_str(text)?;
    if event.parsed_timestamp().is_none() {
        return Err(EventError::InvalidTimestamp {
            timestamp: event.timestamp,
        });
    }
    Ok(event)
}

/// Parse event metadata, logging and discarding anything malformed
pub fn parse_event_lenient(text: &str) -> Option<ClipEvent> {
    match parse_event(text) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!("Failed to parse event.json: {}", e);
            None
        }
    }
}

/// Find the `event.json` entry among a clip's files
pub fn find_event_file(files: &[RawMediaFile]) -> Option<&RawMediaFile> {
    files.iter().find(|f| f.is_event_file())
}

/// Locate the timeline's event, if it has one that falls inside the clip
pub fn event_marker(timeline: &UnifiedTimeline) -> Option<EventMarker> {
    let at = timeline.event.as_ref()?.parsed_timestamp()?;
    let seconds = timeline.offset_of(at)?;
    let percentage = if timeline.total_duration > 0.0 {
        seconds / timeline.total_duration * 100.0
    } else {
        0.0
    };
    Some(EventMarker { seconds, percentage })
}
