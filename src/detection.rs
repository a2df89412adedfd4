use serde_derive::{Deserialize, Serialize};

use crate::bbox::{BBox, Ltrb};
use crate::error::Error;

/// One detected object in one frame, as produced by the upstream detector
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Detection {
    pub frame_number: i64,
    #[serde(rename = "box")]
    pub bbox: BBox<Ltrb>,
    pub class_name: String,
    #[serde(default)]
    pub score: f32,
}

impl Detection {
    pub fn new(frame_number: i64, bbox: BBox<Ltrb>, class_name: impl Into<String>, score: f32) -> Self {
        Self {
            frame_number,
            bbox,
            class_name: class_name.into(),
            score,
        }
    }

    /// Checks the upstream contract and returns the frame number as unsigned.
    pub fn validate(&self) -> Result<u64, Error> {
        if self.frame_number < 0 {
            return Err(Error::NegativeFrame {
                frame_number: self.frame_number,
            });
        }

        if self.class_name.is_empty() {
            return Err(Error::EmptyClassName {
                frame_number: self.frame_number,
            });
        }

        if !self.bbox.is_well_formed() {
            return Err(Error::InvalidBox {
                frame_number: self.frame_number,
                class_name: self.class_name.clone(),
                bbox: *self.bbox.as_slice(),
            });
        }

        Ok(self.frame_number as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_good_detection() {
        let det = Detection::new(7, BBox::ltrb(0., 0., 4., 4.), "car", 0.9);
        assert_eq!(det.validate().unwrap(), 7);
    }

    #[test]
    fn test_validate_rejects_negative_frame() {
        let det = Detection::new(-1, BBox::ltrb(0., 0., 4., 4.), "car", 0.9);
        assert!(matches!(
            det.validate(),
            Err(Error::NegativeFrame { frame_number: -1 })
        ));
    }

    #[test]
    fn test_validate_rejects_flat_box() {
        let det = Detection::new(3, BBox::ltrb(4., 0., 4., 4.), "car", 0.9);
        assert!(matches!(
            det.validate(),
            Err(Error::InvalidBox { frame_number: 3, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_empty_class() {
        let det = Detection::new(3, BBox::ltrb(0., 0., 4., 4.), "", 0.9);
        assert!(matches!(
            det.validate(),
            Err(Error::EmptyClassName { frame_number: 3 })
        ));
    }

    #[test]
    fn test_deserialize_record() {
        let det: Detection = serde_json::from_str(
            r#"{"frame_number": 2, "box": [1, 2, 3, 4], "class_name": "person", "score": 0.5}"#,
        )
        .unwrap();

        assert_eq!(det.frame_number, 2);
        assert_eq!(det.bbox, BBox::ltrb(1., 2., 3., 4.));
        assert_eq!(det.class_name, "person");
    }
}
