//! Constant-velocity Kalman filter over `[cx, cy, s, r, vx, vy, vs]`.

use nalgebra as na;

use crate::bbox::{BBox, Ltrb, MIN_EXTENT};
use crate::error::Error;

type StateVector = na::SVector<f32, 7>;
type StateMatrix = na::SMatrix<f32, 7, 7>;
type MeasVector = na::SVector<f32, 4>;
type MeasMatrix = na::SMatrix<f32, 4, 4>;
type ObsMatrix = na::SMatrix<f32, 4, 7>;

// cx, cy, s, r
const MEASUREMENT_NOISE: [f32; 4] = [1.0, 1.0, 10.0, 10.0];
// cx, cy, s, r, vx, vy, vs
const PROCESS_NOISE: [f32; 7] = [1.0, 1.0, 1.0, 1.0, 0.01, 0.01, 0.0001];
const INITIAL_COVARIANCE: [f32; 7] = [10.0, 10.0, 10.0, 10.0, 10000.0, 10000.0, 10000.0];

#[derive(Debug, Clone)]
pub struct Predictor {
    x: StateVector,
    p: StateMatrix,
    f: StateMatrix,
    h: ObsMatrix,
    q: StateMatrix,
    r: MeasMatrix,
}

impl Predictor {
    pub fn new(bbox: &BBox<Ltrb>) -> Self {
        let z = bbox.as_xysr();

        #[rustfmt::skip]
        let f = StateMatrix::from_row_slice(&[
            1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0,
            0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0,
        ]);

        Self {
            x: StateVector::from_row_slice(&[z.cx(), z.cy(), z.scale(), z.ratio(), 0.0, 0.0, 0.0]),
            p: StateMatrix::from_diagonal(&StateVector::from_row_slice(&INITIAL_COVARIANCE)),
            f,
            h: ObsMatrix::identity(),
            q: StateMatrix::from_diagonal(&StateVector::from_row_slice(&PROCESS_NOISE)),
            r: MeasMatrix::from_diagonal(&MeasVector::from_row_slice(&MEASUREMENT_NOISE)),
        }
    }

    pub fn predict(&mut self) {
        // area cannot shrink through zero
        if self.x[2] + self.x[6] <= 0.0 {
            self.x[6] = 0.0;
        }

        self.x = self.f * self.x;
        self.p = self.f * self.p * self.f.transpose() + self.q;

        self.x[2] = self.x[2].max(MIN_EXTENT);
        self.x[3] = self.x[3].max(MIN_EXTENT);
    }

    pub fn update(&mut self, bbox: &BBox<Ltrb>) -> Result<(), Error> {
        let z = MeasVector::from_row_slice(bbox.as_xysr().as_slice());

        let y = z - self.h * self.x;
        let s = self.h * self.p * self.h.transpose() + self.r;
        let s_inv = s.cholesky().map(|c| c.inverse()).ok_or_else(|| {
            Error::Degenerate("innovation covariance is not positive definite".into())
        })?;
        let k = self.p * self.h.transpose() * s_inv;

        self.x += k * y;

        // Joseph form keeps P symmetric positive semi-definite
        let i_kh = StateMatrix::identity() - k * self.h;
        self.p = i_kh * self.p * i_kh.transpose() + k * self.r * k.transpose();

        Ok(())
    }

    #[inline]
    pub fn bbox(&self) -> BBox<Ltrb> {
        BBox::xysr(self.x[0], self.x[1], self.x[2], self.x[3]).as_ltrb()
    }

    #[inline]
    pub fn velocity(&self) -> (f32, f32) {
        (self.x[4], self.x[5])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn position_variance(p: &Predictor) -> f32 {
        p.p[(0, 0)] + p.p[(1, 1)]
    }

    fn assert_box_eq(a: &BBox<Ltrb>, b: &BBox<Ltrb>, epsilon: f32) {
        for (x, y) in a.as_slice().iter().zip(b.as_slice()) {
            assert_abs_diff_eq!(*x, *y, epsilon = epsilon);
        }
    }

    #[test]
    fn test_bbox_right_after_predict() {
        let b = BBox::ltrb(10., 10., 50., 50.);
        let mut p = Predictor::new(&b);

        p.predict();
        assert_box_eq(&p.bbox(), &b, 1e-3);
    }

    #[test]
    fn test_static_object_stays_put() {
        let b = BBox::ltrb(10., 10., 50., 50.);
        let mut p = Predictor::new(&b);

        for _ in 0..10 {
            p.predict();
            p.update(&b).unwrap();
        }

        assert_box_eq(&p.bbox(), &b, 1e-2);
        let (vx, vy) = p.velocity();
        assert_abs_diff_eq!(vx, 0.0, epsilon = 1e-3);
        assert_abs_diff_eq!(vy, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_learns_constant_velocity() {
        let mut p = Predictor::new(&BBox::ltrb(0., 0., 20., 20.));

        for i in 1..30 {
            let dx = i as f32 * 2.0;
            p.predict();
            p.update(&BBox::ltrb(dx, 0., dx + 20., 20.)).unwrap();
        }

        let (vx, vy) = p.velocity();
        assert_abs_diff_eq!(vx, 2.0, epsilon = 0.1);
        assert_abs_diff_eq!(vy, 0.0, epsilon = 0.1);

        p.predict();
        assert_abs_diff_eq!(p.bbox().left(), 60.0, epsilon = 1.0);
    }

    #[test]
    fn test_uncertainty_grows_without_updates() {
        let mut p = Predictor::new(&BBox::ltrb(0., 0., 20., 20.));
        p.predict();
        p.update(&BBox::ltrb(0., 0., 20., 20.)).unwrap();

        let mut last = position_variance(&p);
        for _ in 0..5 {
            p.predict();
            let var = position_variance(&p);
            assert!(var > last);
            last = var;
        }
    }

    #[test]
    fn test_shrinking_box_keeps_positive_area() {
        let mut p = Predictor::new(&BBox::ltrb(0., 0., 40., 40.));

        for size in [30.0f32, 20.0, 10.0, 2.0] {
            p.predict();
            p.update(&BBox::ltrb(0., 0., size, size)).unwrap();
        }

        for _ in 0..20 {
            p.predict();
            let b = p.bbox();
            assert!(b.is_well_formed(), "{:?}", b);
        }
    }
}
