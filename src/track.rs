use std::sync::Arc;

use serde_derive::Serialize;

use crate::bbox::{BBox, Ltrb};
use crate::circular_queue::CircularQueue;
use crate::error::Error;
use crate::id::TrackId;
use crate::predictor::Predictor;

#[derive(Serialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrackState {
    Tentative,
    Confirmed,
}

/// Read-only view of a live track
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Track {
    /// Tracker-local index, unique among tracks ever created by one tracker
    pub slot: u64,
    pub external_id: Option<TrackId>,
    pub class_name: String,
    #[serde(rename = "box")]
    pub bbox: BBox<Ltrb>,
    /// Center velocity in pixels per frame
    pub velocity: (f32, f32),
    pub state: TrackState,
    pub hits: u32,
    pub age: u32,
    pub time_since_update: u32,
}

#[derive(Debug, Clone)]
pub(crate) struct KalmanTrack {
    pub slot: u64,
    pub external_id: Option<TrackId>,
    pub class_name: Arc<str>,
    pub hits: u32,
    pub age: u32,
    pub time_since_update: u32,
    predictor: Predictor,
    // (frame_number, corrected box) while tentative
    history: CircularQueue<(u64, BBox<Ltrb>)>,
}

impl KalmanTrack {
    pub fn new(
        slot: u64,
        class_name: Arc<str>,
        frame_number: u64,
        bbox: &BBox<Ltrb>,
        history_len: usize,
    ) -> Self {
        let predictor = Predictor::new(bbox);
        let mut history = CircularQueue::with_capacity(history_len);
        history.push((frame_number, predictor.bbox()));

        Self {
            slot,
            external_id: None,
            class_name,
            hits: 1,
            age: 0,
            time_since_update: 0,
            predictor,
            history,
        }
    }

    #[inline]
    pub fn is_confirmed(&self) -> bool {
        self.external_id.is_some()
    }

    #[inline]
    pub fn state(&self) -> TrackState {
        if self.is_confirmed() {
            TrackState::Confirmed
        } else {
            TrackState::Tentative
        }
    }

    pub fn predict(&mut self) -> BBox<Ltrb> {
        self.predictor.predict();
        self.age += 1;
        self.time_since_update += 1;

        self.predictor.bbox()
    }

    pub fn update(&mut self, frame_number: u64, bbox: &BBox<Ltrb>) -> Result<(), Error> {
        self.predictor.update(bbox)?;
        self.hits += 1;
        self.time_since_update = 0;

        if !self.is_confirmed() {
            self.history.push((frame_number, self.predictor.bbox()));
        }

        Ok(())
    }

    pub fn confirm(&mut self, id: TrackId) {
        self.external_id = Some(id);
    }

    /// Frames matched while tentative, oldest first.
    pub fn take_history(&mut self) -> Vec<(u64, BBox<Ltrb>)> {
        self.history.drain().collect()
    }

    #[inline]
    pub fn bbox(&self) -> BBox<Ltrb> {
        self.predictor.bbox()
    }
}

impl From<&KalmanTrack> for Track {
    fn from(t: &KalmanTrack) -> Track {
        Track {
            slot: t.slot,
            external_id: t.external_id,
            class_name: t.class_name.to_string(),
            bbox: t.bbox(),
            velocity: t.predictor.velocity(),
            state: t.state(),
            hits: t.hits,
            age: t.age,
            time_since_update: t.time_since_update,
        }
    }
}
