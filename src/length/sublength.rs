use crate::geometry::{LocalParam, Segment};
use crate::math::quadrature::QuadratureRule;
use crate::math::spline::MonotoneSpline;
use crate::math::summation::CompensatedSum;
use crate::path::config::MIN_INTERVALS;

use super::arc_length_between;

/// Cached mapping from a segment's local parameter to absolute arc length.
///
/// A monotone cubic Hermite spline over evenly spaced knots: values are
/// the cumulative-length base plus numerically integrated partial lengths
/// (compensated piece-by-piece), slopes are the analytic arc-length
/// derivative at each knot. Once fitted, length and inversion queries are
/// O(1) in the number of integration calls.
#[derive(Debug, Clone, PartialEq)]
pub struct SublengthSpline {
    spline: MonotoneSpline,
}

impl SublengthSpline {
    /// Samples `knot_count` knots (clamped to [`MIN_INTERVALS`]) and fits
    /// the monotone spline for one segment starting at absolute arc length
    /// `base`.
    #[must_use]
    pub fn build(
        segment: &Segment,
        base: f64,
        knot_count: usize,
        rule: &QuadratureRule,
    ) -> Self {
        let count = knot_count.max(MIN_INTERVALS);
        let mut knots = Vec::with_capacity(count);
        let mut values = Vec::with_capacity(count);
        let mut slopes = Vec::with_capacity(count);
        let mut sum = CompensatedSum::new();
        sum.add(base);
        let mut prev_t = 0.0;
        #[allow(clippy::cast_precision_loss)]
        let span = (count - 1) as f64;
        for i in 0..count {
            #[allow(clippy::cast_precision_loss)]
            let t = i as f64 / span;
            if i > 0 {
                sum.add(arc_length_between(segment, prev_t, t, rule));
            }
            knots.push(t);
            values.push(sum.value());
            slopes.push(segment.speed(&LocalParam::new(t)));
            prev_t = t;
        }
        Self {
            spline: MonotoneSpline::fit(knots, values, slopes),
        }
    }

    /// Absolute arc length at local parameter `t`.
    #[must_use]
    pub fn value(&self, t: f64) -> f64 {
        self.spline.value(t)
    }

    /// d(arc length)/dt at local parameter `t`.
    #[must_use]
    pub fn derivative(&self, t: f64) -> f64 {
        self.spline.derivative(t)
    }

    /// Absolute arc length at the segment start.
    #[must_use]
    pub fn start_value(&self) -> f64 {
        self.spline.first_value()
    }

    /// Absolute arc length at the segment end.
    #[must_use]
    pub fn end_value(&self) -> f64 {
        self.spline.last_value()
    }

    /// Inverts the spline for the local parameter at absolute arc length
    /// `target`. See [`MonotoneSpline::invert`].
    #[must_use]
    pub fn invert(&self, target: f64, tolerance: f64) -> Option<f64> {
        self.spline.invert(target, tolerance)
    }

    /// The pair of knots bracketing `target` by value, as local
    /// parameters. Used to bracket Newton refinement.
    #[must_use]
    pub fn bracketing_knots(&self, target: f64) -> (f64, f64) {
        let i = self.spline.interval_bracketing_value(target);
        (self.spline.knots()[i], self.spline.knots()[i + 1])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::quadrature::GAUSS_LEGENDRE_8;
    use crate::math::Point3;

    const TOL: f64 = 1e-9;

    #[test]
    fn line_spline_is_exact() {
        let seg = Segment::line(Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 0.0, 0.0));
        let spline = SublengthSpline::build(&seg, 0.0, 64, &GAUSS_LEGENDRE_8);
        assert!((spline.value(0.0)).abs() < TOL);
        assert!((spline.value(0.5) - 5.0).abs() < TOL);
        assert!((spline.value(1.0) - 10.0).abs() < TOL);
        let t = spline.invert(5.0, 1e-9).unwrap();
        assert!((t - 0.5).abs() < TOL, "t = {t}");
    }

    #[test]
    fn base_offsets_all_values() {
        let seg = Segment::line(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0));
        let spline = SublengthSpline::build(&seg, 7.0, 16, &GAUSS_LEGENDRE_8);
        assert!((spline.start_value() - 7.0).abs() < TOL);
        assert!((spline.end_value() - 9.0).abs() < TOL);
    }

    #[test]
    fn knot_count_is_clamped() {
        let seg = Segment::line(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0));
        // Requesting fewer knots than the minimum still builds a valid
        // spline with the minimum knot count.
        let spline = SublengthSpline::build(&seg, 0.0, 1, &GAUSS_LEGENDRE_8);
        assert!((spline.value(1.0) - 1.0).abs() < TOL);
    }

    #[test]
    fn curved_spline_matches_direct_integration() {
        let seg = Segment::cubic(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
            Point3::new(2.0, -2.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
        );
        let spline = SublengthSpline::build(&seg, 0.0, 64, &GAUSS_LEGENDRE_8);
        for i in 0..=10 {
            let t = f64::from(i) / 10.0;
            let exact = arc_length_between(&seg, 0.0, t, &GAUSS_LEGENDRE_8);
            assert!(
                (spline.value(t) - exact).abs() < 1e-6,
                "t = {t}, spline = {}, exact = {exact}",
                spline.value(t)
            );
        }
    }

    #[test]
    fn spline_derivative_matches_speed() {
        let seg = Segment::quad(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        );
        let spline = SublengthSpline::build(&seg, 0.0, 64, &GAUSS_LEGENDRE_8);
        for i in 0..=8 {
            let t = f64::from(i) / 8.0;
            let speed = seg.speed(&LocalParam::new(t));
            assert!(
                (spline.derivative(t) - speed).abs() < 1e-3,
                "t = {t}, spline' = {}, speed = {speed}",
                spline.derivative(t)
            );
        }
    }

    #[test]
    fn inversion_round_trips_through_value() {
        let seg = Segment::cubic(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        );
        let spline = SublengthSpline::build(&seg, 0.0, 64, &GAUSS_LEGENDRE_8);
        let total = spline.end_value();
        for i in 0..=16 {
            let target = total * f64::from(i) / 16.0;
            let t = spline.invert(target, 1e-9).unwrap();
            assert!(
                (spline.value(t) - target).abs() < 1e-9,
                "target = {target}, t = {t}"
            );
        }
    }

    #[test]
    fn bracketing_knots_surround_target() {
        let seg = Segment::line(Point3::new(0.0, 0.0, 0.0), Point3::new(4.0, 0.0, 0.0));
        let spline = SublengthSpline::build(&seg, 0.0, 5, &GAUSS_LEGENDRE_8);
        let (lo, hi) = spline.bracketing_knots(1.1);
        assert!(spline.value(lo) <= 1.1 + 1e-12);
        assert!(spline.value(hi) >= 1.1 - 1e-12);
        assert!(lo < hi);
    }
}
