pub mod types;
pub mod grouper;
pub mod duration;

pub use duration::resolve_durations;
pub use grouper::FootageGrouper;
pub use types::{Clip, Footage};
