use tracing::debug;

use crate::footage::types::Footage;

/// Replace each footage's duration with the whole-second gap to its
/// successor. The last footage keeps its measured duration.
///
/// Footages must already be sorted by date.
pub fn resolve_durations(footages: &mut [Footage]) {
    let starts: Vec<_> = footages.iter().map(|f| f.date).collect();

    for (footage, next_start) in footages.iter_mut().zip(starts.iter().skip(1)) {
        let gap_ms = (*next_start - footage.date).num_milliseconds().max(0);
        let resolved = (gap_ms as f64 / 1000.0).ceil();
        if resolved != footage.duration {
            debug!(
                "Footage {} duration {:.2}s -> {}s from timestamp gap",
                footage.timestamp_key, footage.duration, resolved
            );
        }
        footage.duration = resolved;
    }
}
