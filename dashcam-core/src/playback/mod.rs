pub mod handle;
pub mod state;
pub mod synchronizer;
pub mod simulated;

#[cfg(test)]
mod synchronizer_test;

pub use handle::{CameraRegistry, MediaHandle};
pub use simulated::SimulatedCamera;
pub use state::PlaybackState;
pub use synchronizer::PlaybackSynchronizer;
