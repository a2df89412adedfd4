use log::trace;
use munkres::{solve_assignment, WeightMatrix};
use nalgebra as na;

use crate::bbox::{BBox, Ltrb};
use crate::error::Error;

/// Cost of a padding cell, equal to the cost of a zero-overlap pair
const PADDING_COST: f64 = 1.0;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Association {
    /// (track index, detection index)
    pub matches: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_detections: Vec<usize>,
}

/// IOU matrix with tracks as rows and detections as columns.
pub fn iou_matrix(tracks: &[BBox<Ltrb>], detections: &[BBox<Ltrb>]) -> na::DMatrix<f32> {
    na::DMatrix::from_fn(tracks.len(), detections.len(), |r, c| {
        tracks[r].iou(&detections[c])
    })
}

/// Maximum total IOU assignment of detections to predicted track boxes.
///
/// Pairs whose IOU is below `iou_threshold` are rejected after solving and
/// reported as unmatched on both sides.
pub fn associate(
    tracks: &[BBox<Ltrb>],
    detections: &[BBox<Ltrb>],
    iou_threshold: f32,
) -> Result<Association, Error> {
    if tracks.is_empty() || detections.is_empty() {
        return Ok(Association {
            matches: Vec::new(),
            unmatched_tracks: (0..tracks.len()).collect(),
            unmatched_detections: (0..detections.len()).collect(),
        });
    }

    let ious = iou_matrix(tracks, detections);
    let (rows, cols) = ious.shape();
    let n = rows.max(cols);

    let mut weights = WeightMatrix::from_fn(n, |(r, c)| {
        if r < rows && c < cols {
            1.0 - f64::from(ious[(r, c)])
        } else {
            PADDING_COST
        }
    });

    let solution = solve_assignment(&mut weights)
        .map_err(|err| Error::Assignment(format!("{:?} on {}x{} matrix", err, rows, cols)))?;

    let mut track_matched = vec![false; rows];
    let mut det_matched = vec![false; cols];
    let mut matches = Vec::with_capacity(rows.min(cols));

    for pos in solution {
        if pos.row >= rows || pos.column >= cols {
            continue;
        }

        let iou = ious[(pos.row, pos.column)];
        if iou < iou_threshold || iou <= 0.0 {
            trace!(target: "association", "rejected pair ({}, {}) iou {}", pos.row, pos.column, iou);
            continue;
        }

        track_matched[pos.row] = true;
        det_matched[pos.column] = true;
        matches.push((pos.row, pos.column));
    }

    matches.sort_unstable();

    Ok(Association {
        matches,
        unmatched_tracks: (0..rows).filter(|&i| !track_matched[i]).collect(),
        unmatched_detections: (0..cols).filter(|&i| !det_matched[i]).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f32, y: f32, size: f32) -> BBox<Ltrb> {
        BBox::ltrb(x, y, x + size, y + size)
    }

    #[test]
    fn test_empty_inputs() {
        let boxes = vec![square(0., 0., 10.), square(20., 0., 10.)];

        let a = associate(&[], &boxes, 0.3).unwrap();
        assert!(a.matches.is_empty());
        assert!(a.unmatched_tracks.is_empty());
        assert_eq!(a.unmatched_detections, vec![0, 1]);

        let a = associate(&boxes, &[], 0.3).unwrap();
        assert!(a.matches.is_empty());
        assert_eq!(a.unmatched_tracks, vec![0, 1]);
        assert!(a.unmatched_detections.is_empty());
    }

    #[test]
    fn test_matches_by_overlap_not_order() {
        let tracks = vec![square(0., 0., 10.), square(100., 100., 10.)];
        let dets = vec![square(101., 101., 10.), square(1., 1., 10.)];

        let a = associate(&tracks, &dets, 0.3).unwrap();
        assert_eq!(a.matches, vec![(0, 1), (1, 0)]);
        assert!(a.unmatched_tracks.is_empty());
        assert!(a.unmatched_detections.is_empty());
    }

    #[test]
    fn test_optimal_rather_than_greedy() {
        // greedy pick of (t0, d0) first yields a lower total overlap
        let tracks = vec![BBox::ltrb(0., 0., 10., 10.), BBox::ltrb(4., 0., 14., 10.)];
        let dets = vec![BBox::ltrb(2., 0., 12., 10.), BBox::ltrb(-4., 0., 6., 10.)];

        let a = associate(&tracks, &dets, 0.1).unwrap();
        assert_eq!(a.matches, vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn test_rejects_pairs_below_threshold() {
        let tracks = vec![square(0., 0., 10.)];
        // iou = 1/3
        let dets = vec![BBox::ltrb(5., 0., 15., 10.)];

        let a = associate(&tracks, &dets, 0.5).unwrap();
        assert!(a.matches.is_empty());
        assert_eq!(a.unmatched_tracks, vec![0]);
        assert_eq!(a.unmatched_detections, vec![0]);

        let a = associate(&tracks, &dets, 0.3).unwrap();
        assert_eq!(a.matches, vec![(0, 0)]);
    }

    #[test]
    fn test_disjoint_never_matched() {
        let tracks = vec![square(0., 0., 10.)];
        let dets = vec![square(50., 50., 10.)];

        let a = associate(&tracks, &dets, 0.0).unwrap();
        assert!(a.matches.is_empty());
        assert_eq!(a.unmatched_tracks, vec![0]);
        assert_eq!(a.unmatched_detections, vec![0]);
    }

    #[test]
    fn test_rectangular_more_detections() {
        let tracks = vec![square(0., 0., 10.)];
        let dets = vec![square(50., 50., 10.), square(0., 0., 10.), square(80., 0., 10.)];

        let a = associate(&tracks, &dets, 0.3).unwrap();
        assert_eq!(a.matches, vec![(0, 1)]);
        assert_eq!(a.unmatched_detections, vec![0, 2]);
    }

    #[test]
    fn test_iou_matrix_shape() {
        let tracks = vec![square(0., 0., 10.), square(0., 0., 10.)];
        let dets = vec![square(0., 0., 10.), square(50., 0., 10.), square(5., 0., 10.)];

        let m = iou_matrix(&tracks, &dets);
        assert_eq!(m.shape(), (2, 3));
        assert_eq!(m[(1, 0)], 1.0);
        assert_eq!(m[(1, 1)], 0.0);
    }
}
