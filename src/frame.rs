use crate::bbox::{BBox, Ltrb};

/// Boxes of a single class observed in one frame
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub frame_number: u64,
    pub detections: Vec<BBox<Ltrb>>,
}

impl Frame {
    #[inline]
    pub fn new(frame_number: u64, detections: Vec<BBox<Ltrb>>) -> Self {
        Self {
            frame_number,
            detections,
        }
    }

    #[inline]
    pub fn empty(frame_number: u64) -> Self {
        Self::new(frame_number, Vec::new())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.detections.len()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &BBox<Ltrb>> {
        self.detections.iter()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
}
