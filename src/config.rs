use serde_derive::{Deserialize, Serialize};

use crate::error::Error;

/// Which frames of a confirmed track end up in the output
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmitPolicy {
    /// Observations start at the frame the track got confirmed.
    #[default]
    Confirmed,
    /// On confirmation, also emit the frames matched while tentative.
    Backfill,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TrackerConfig {
    /// Minimum IOU for a track/detection pair to be associated
    pub iou_threshold: f32,
    /// Matched frames required before a track is confirmed
    pub min_hits: u32,
    /// Consecutive missed frames tolerated before deletion
    pub max_age: u32,
    pub emit: EmitPolicy,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            iou_threshold: 0.3,
            min_hits: 3,
            max_age: 1,
            emit: EmitPolicy::Confirmed,
        }
    }
}

impl TrackerConfig {
    pub fn with_iou_threshold(mut self, iou_threshold: f32) -> Self {
        self.iou_threshold = iou_threshold;
        self
    }

    pub fn with_min_hits(mut self, min_hits: u32) -> Self {
        self.min_hits = min_hits;
        self
    }

    pub fn with_max_age(mut self, max_age: u32) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn with_emit(mut self, emit: EmitPolicy) -> Self {
        self.emit = emit;
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(Error::InvalidConfig(format!(
                "iou_threshold must be within [0, 1], got {}",
                self.iou_threshold
            )));
        }

        if self.min_hits == 0 {
            return Err(Error::InvalidConfig("min_hits must be at least 1".into()));
        }

        Ok(())
    }
}
