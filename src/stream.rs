//! Groups a detection stream by class and frame and drives one tracker per class.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info};
use rayon::prelude::*;

use crate::bbox::{BBox, Ltrb};
use crate::config::TrackerConfig;
use crate::detection::Detection;
use crate::error::Error;
use crate::frame::Frame;
use crate::id::{IdAllocator, TrackId};
use crate::tracker::{ClassTracker, Observation};

/// Tracked boxes keyed by identifier, each list ordered by frame number
pub type Trajectories = BTreeMap<TrackId, Vec<Observation>>;

type ClassFrames = BTreeMap<u64, Vec<BBox<Ltrb>>>;

pub struct StreamOrchestrator {
    config: TrackerConfig,
    ids: IdAllocator,
    classes: BTreeMap<String, ClassFrames>,
    cancel: Option<Arc<AtomicBool>>,
    batches: usize,
    detections: usize,
}

impl StreamOrchestrator {
    pub fn new(config: TrackerConfig) -> Result<Self, Error> {
        Self::with_ids(config, IdAllocator::new())
    }

    /// Uses an externally owned id sequence, e.g. to keep ids unique across runs.
    pub fn with_ids(config: TrackerConfig, ids: IdAllocator) -> Result<Self, Error> {
        config.validate()?;

        Ok(Self {
            config,
            ids,
            classes: BTreeMap::new(),
            cancel: None,
            batches: 0,
            detections: 0,
        })
    }

    /// Checked between classes; a raised flag makes `finish` fail with `Error::Cancelled`.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Adds one batch to the build phase. Empty batches are skipped.
    ///
    /// The whole batch is validated before any of it is grouped.
    pub fn ingest<B>(&mut self, batch: B) -> Result<(), Error>
    where
        B: IntoIterator<Item = Detection>,
    {
        let batch: Vec<Detection> = batch.into_iter().collect();
        if batch.is_empty() {
            return Ok(());
        }

        let frame_numbers = batch
            .iter()
            .map(Detection::validate)
            .collect::<Result<Vec<_>, _>>()?;

        self.batches += 1;
        self.detections += batch.len();

        for (det, frame_number) in batch.into_iter().zip(frame_numbers) {
            self.classes
                .entry(det.class_name)
                .or_default()
                .entry(frame_number)
                .or_default()
                .push(det.bbox);
        }

        Ok(())
    }

    /// Class names seen so far, in lexical order.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    /// Runs every class stream through a fresh tracker and merges the results.
    pub fn finish(self) -> Result<Trajectories, Error> {
        let Self {
            config,
            ids,
            classes,
            cancel,
            batches,
            detections,
        } = self;

        info!(target: "stream", "tracking {} detections from {} batches over {} classes", detections, batches, classes.len());

        let per_class = classes
            .into_par_iter()
            .map(|(class_name, frames)| {
                if let Some(flag) = &cancel {
                    if flag.load(Ordering::Relaxed) {
                        return Err(Error::Cancelled);
                    }
                }

                let mut tracker = ClassTracker::new(&class_name, config.clone(), ids.clone())?;
                let out = tracker.run(
                    frames
                        .into_iter()
                        .map(|(frame_number, boxes)| Frame::new(frame_number, boxes)),
                )?;

                debug!(target: "stream", "class `{}`: {} observations", class_name, out.len());

                Ok(out)
            })
            .collect::<Result<Vec<_>, Error>>()?;

        let mut trajectories = Trajectories::new();
        for out in per_class {
            for (id, observation) in out {
                trajectories.entry(id).or_default().push(observation);
            }
        }

        info!(target: "stream", "{} trajectories", trajectories.len());

        Ok(trajectories)
    }
}

/// One-shot helper: ingest every batch, then track.
pub fn track_batches<I, B>(config: TrackerConfig, batches: I) -> Result<Trajectories, Error>
where
    I: IntoIterator<Item = B>,
    B: IntoIterator<Item = Detection>,
{
    let mut orchestrator = StreamOrchestrator::new(config)?;

    for batch in batches {
        orchestrator.ingest(batch)?;
    }

    orchestrator.finish()
}
