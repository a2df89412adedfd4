pub mod association;
pub mod bbox;
pub mod config;
pub mod detection;
pub mod error;
pub mod frame;
pub mod id;
pub mod stream;
pub mod tracker;

mod circular_queue;
mod predictor;
mod track;

pub use config::{EmitPolicy, TrackerConfig};
pub use detection::Detection;
pub use frame::Frame;
pub use id::{IdAllocator, TrackId};
pub use stream::{track_batches, StreamOrchestrator, Trajectories};
pub use track::{Track, TrackState};
pub use tracker::{ClassTracker, Observation};

use error::Error;

/// Frame-by-frame tracking of a single detection stream
pub trait Tracking {
    /// Advances the tracker by one frame and returns the observations of
    /// confirmed tracks for it. Frames must arrive in increasing order.
    fn update(&mut self, frame: &Frame) -> Result<Vec<(TrackId, Observation)>, Error>;

    /// Live tracks, tentative ones included.
    fn tracks(&self) -> Vec<Track>;
}

/// Tracks a JSON array of detection batches and returns the trajectories as JSON.
pub fn track_json(config: TrackerConfig, batches: &str) -> Result<String, Error> {
    let batches: Vec<Vec<Detection>> = serde_json::from_str(batches)?;
    let trajectories = track_batches(config, batches)?;

    Ok(serde_json::to_string(&trajectories)?)
}
