use std::sync::Arc;

use log::{debug, warn};
use serde_derive::{Deserialize, Serialize};

use crate::association::associate;
use crate::bbox::{BBox, Ltrb};
use crate::config::{EmitPolicy, TrackerConfig};
use crate::error::Error;
use crate::frame::Frame;
use crate::id::{IdAllocator, TrackId};
use crate::track::{KalmanTrack, Track};
use crate::Tracking;

/// One emitted box of a confirmed track
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Observation {
    pub frame_number: u64,
    #[serde(rename = "box")]
    pub bbox: BBox<Ltrb>,
    pub class_name: String,
}

/// SORT tracker owning every track of a single class
pub struct ClassTracker {
    class_name: Arc<str>,
    config: TrackerConfig,
    ids: IdAllocator,
    tracks: Vec<KalmanTrack>,
    next_slot: u64,
    last_frame: Option<u64>,
}

impl ClassTracker {
    pub fn new(class_name: &str, config: TrackerConfig, ids: IdAllocator) -> Result<Self, Error> {
        config.validate()?;

        Ok(Self {
            class_name: class_name.into(),
            config,
            ids,
            tracks: Vec::with_capacity(32),
            next_slot: 0,
            last_frame: None,
        })
    }

    #[inline]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    #[inline]
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    #[inline]
    pub fn last_frame(&self) -> Option<u64> {
        self.last_frame
    }

    /// Number of live tracks, tentative ones included.
    #[inline]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Feeds an ordered stream of frames, replaying the missing frame numbers
    /// between consecutive frames as empty frames.
    pub fn run<I>(&mut self, frames: I) -> Result<Vec<(TrackId, Observation)>, Error>
    where
        I: IntoIterator<Item = Frame>,
    {
        let mut out = Vec::new();

        for frame in frames {
            if let Some(last) = self.last_frame {
                // every track is gone after max_age + 1 misses, the rest of the gap is a no-op
                let gap = frame.frame_number.saturating_sub(last + 1);
                let replay = gap.min(u64::from(self.config.max_age) + 1);

                for frame_number in (last + 1)..(last + 1 + replay) {
                    out.extend(self.update(&Frame::empty(frame_number))?);
                }
            }

            out.extend(self.update(&frame)?);
        }

        Ok(out)
    }

    fn spawn(&mut self, frame_number: u64, bbox: &BBox<Ltrb>) {
        let history_len = match self.config.emit {
            EmitPolicy::Backfill => self.config.min_hits as usize,
            EmitPolicy::Confirmed => 0,
        };

        let slot = self.next_slot;
        self.next_slot += 1;

        debug!(target: "tracker", "[{}] frame {}: new track #{} at {:?}", self.class_name, frame_number, slot, bbox.as_slice());

        self.tracks.push(KalmanTrack::new(
            slot,
            self.class_name.clone(),
            frame_number,
            bbox,
            history_len,
        ));
    }
}

impl Tracking for ClassTracker {
    fn update(&mut self, frame: &Frame) -> Result<Vec<(TrackId, Observation)>, Error> {
        let frame_number = frame.frame_number;

        if let Some(last) = self.last_frame {
            if frame_number <= last {
                return Err(Error::FrameOrder {
                    last,
                    got: frame_number,
                });
            }
        }
        self.last_frame = Some(frame_number);

        for t in &mut self.tracks {
            t.predict();
        }

        let max_age = self.config.max_age;
        let class_name = &self.class_name;
        self.tracks.retain(|t| {
            if !t.bbox().is_finite() {
                warn!(target: "tracker", "[{}] frame {}: dropping track #{} with non-finite state", class_name, frame_number, t.slot);
                return false;
            }

            if t.time_since_update > max_age {
                debug!(target: "tracker", "[{}] frame {}: track #{} ({:?}) deleted after {} misses", class_name, frame_number, t.slot, t.external_id, t.time_since_update);
                return false;
            }

            true
        });

        let predicted: Vec<_> = self.tracks.iter().map(|t| t.bbox()).collect();
        let mapping = associate(&predicted, &frame.detections, self.config.iou_threshold)?;

        for &(ti, di) in &mapping.matches {
            self.tracks[ti].update(frame_number, &frame.detections[di])?;
        }

        for &di in &mapping.unmatched_detections {
            self.spawn(frame_number, &frame.detections[di]);
        }

        let mut out = Vec::new();
        for t in self.tracks.iter_mut() {
            if !t.is_confirmed() && t.hits >= self.config.min_hits {
                let id = self.ids.next_id();
                t.confirm(id);

                debug!(target: "tracker", "[{}] frame {}: track #{} confirmed as {}", self.class_name, frame_number, t.slot, id);

                if self.config.emit == EmitPolicy::Backfill {
                    for (n, bbox) in t.take_history() {
                        out.push((
                            id,
                            Observation {
                                frame_number: n,
                                bbox,
                                class_name: self.class_name.to_string(),
                            },
                        ));
                    }

                    continue;
                }
            }

            if let (Some(id), 0) = (t.external_id, t.time_since_update) {
                out.push((
                    id,
                    Observation {
                        frame_number,
                        bbox: t.bbox(),
                        class_name: self.class_name.to_string(),
                    },
                ));
            }
        }

        Ok(out)
    }

    fn tracks(&self) -> Vec<Track> {
        self.tracks.iter().map(Into::into).collect()
    }
}
