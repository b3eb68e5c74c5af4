use crate::math::{points_coincident, Point3, Vector3};

use super::LocalParam;

/// Polynomial degree of one path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Straight edge, degree 1.
    Line,
    /// Quadratic Bézier, degree 2, one interior control point.
    Quad,
    /// Cubic Bézier, degree 3, two interior control points.
    Cubic,
}

impl SegmentKind {
    /// Number of control points, including both endpoints.
    #[must_use]
    pub fn point_count(self) -> usize {
        match self {
            Self::Line => 2,
            Self::Quad => 3,
            Self::Cubic => 4,
        }
    }

    /// Polynomial degree.
    #[must_use]
    pub fn degree(self) -> usize {
        match self {
            Self::Line => 1,
            Self::Quad => 2,
            Self::Cubic => 3,
        }
    }
}

/// One immutable segment of a piecewise-polynomial path.
///
/// Besides the control points, the segment caches the degree-scaled
/// control-point differences so velocity, acceleration, and jerk evaluate
/// in O(1) as Bernstein combinations without re-deriving the differences
/// on every call:
///
/// - `first_diff[i] = n·(Pᵢ₊₁ − Pᵢ)`
/// - `second_diff[i] = n·(n−1)·(Pᵢ₊₂ − 2Pᵢ₊₁ + Pᵢ)`
/// - `third_diff = n·(n−1)·(n−2)·(P₃ − 3P₂ + 3P₁ − P₀)`
///
/// Unused trailing control-point slots replicate the end point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    kind: SegmentKind,
    points: [Point3; 4],
    first_diff: [Vector3; 3],
    second_diff: [Vector3; 2],
    third_diff: Vector3,
    closing: bool,
}

impl Segment {
    /// Creates a straight segment.
    #[must_use]
    pub fn line(p0: Point3, p1: Point3) -> Self {
        Self::new(SegmentKind::Line, [p0, p1, p1, p1])
    }

    /// Creates a quadratic segment.
    #[must_use]
    pub fn quad(p0: Point3, p1: Point3, p2: Point3) -> Self {
        Self::new(SegmentKind::Quad, [p0, p1, p2, p2])
    }

    /// Creates a cubic segment.
    #[must_use]
    pub fn cubic(p0: Point3, p1: Point3, p2: Point3, p3: Point3) -> Self {
        Self::new(SegmentKind::Cubic, [p0, p1, p2, p3])
    }

    fn new(kind: SegmentKind, points: [Point3; 4]) -> Self {
        let zero = Vector3::zeros();
        let mut first_diff = [zero; 3];
        let mut second_diff = [zero; 2];
        let mut third_diff = zero;
        match kind {
            SegmentKind::Line => {
                first_diff[0] = points[1] - points[0];
            }
            SegmentKind::Quad => {
                first_diff[0] = 2.0 * (points[1] - points[0]);
                first_diff[1] = 2.0 * (points[2] - points[1]);
                second_diff[0] = first_diff[1] - first_diff[0];
            }
            SegmentKind::Cubic => {
                first_diff[0] = 3.0 * (points[1] - points[0]);
                first_diff[1] = 3.0 * (points[2] - points[1]);
                first_diff[2] = 3.0 * (points[3] - points[2]);
                second_diff[0] = 2.0 * (first_diff[1] - first_diff[0]);
                second_diff[1] = 2.0 * (first_diff[2] - first_diff[1]);
                third_diff = second_diff[1] - second_diff[0];
            }
        }
        Self {
            kind,
            points,
            first_diff,
            second_diff,
            third_diff,
            closing: false,
        }
    }

    /// The segment kind.
    #[must_use]
    pub fn kind(&self) -> SegmentKind {
        self.kind
    }

    /// Start point.
    #[must_use]
    pub fn start(&self) -> &Point3 {
        &self.points[0]
    }

    /// End point.
    #[must_use]
    pub fn end(&self) -> &Point3 {
        &self.points[self.kind.point_count() - 1]
    }

    /// All control points, endpoints included.
    #[must_use]
    pub fn control_points(&self) -> &[Point3] {
        &self.points[..self.kind.point_count()]
    }

    /// Whether this segment closes a cyclic path.
    #[must_use]
    pub fn is_closing(&self) -> bool {
        self.closing
    }

    pub(crate) fn mark_closing(&mut self) {
        self.closing = true;
    }

    /// Whether every control point coincides with the start point.
    ///
    /// Such a segment carries no direction of its own; tangent, normal,
    /// and curvature do not exist on it (unless the closing-edge
    /// delegation rule applies).
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.control_points()
            .iter()
            .skip(1)
            .all(|p| points_coincident(p, &self.points[0]))
    }

    /// Straight-line distance between the endpoints.
    #[must_use]
    pub fn chord(&self) -> f64 {
        (self.end() - self.start()).norm()
    }

    /// Position at the local parameter.
    #[must_use]
    pub fn position(&self, p: &LocalParam) -> Point3 {
        let pts = &self.points;
        match self.kind {
            SegmentKind::Line => Point3::from(pts[0].coords * p.c + pts[1].coords * p.t),
            SegmentKind::Quad => Point3::from(
                pts[0].coords * p.c_sq
                    + pts[1].coords * (2.0 * p.c * p.t)
                    + pts[2].coords * p.t_sq,
            ),
            SegmentKind::Cubic => Point3::from(
                pts[0].coords * p.c_cu
                    + pts[1].coords * (3.0 * p.c_sq * p.t)
                    + pts[2].coords * (3.0 * p.c * p.t_sq)
                    + pts[3].coords * p.t_cu,
            ),
        }
    }

    /// First derivative dP/dt.
    #[must_use]
    pub fn velocity(&self, p: &LocalParam) -> Vector3 {
        match self.kind {
            SegmentKind::Line => self.first_diff[0],
            SegmentKind::Quad => self.first_diff[0] * p.c + self.first_diff[1] * p.t,
            SegmentKind::Cubic => {
                self.first_diff[0] * p.c_sq
                    + self.first_diff[1] * (2.0 * p.c * p.t)
                    + self.first_diff[2] * p.t_sq
            }
        }
    }

    /// Second derivative d²P/dt².
    #[must_use]
    pub fn acceleration(&self, p: &LocalParam) -> Vector3 {
        match self.kind {
            SegmentKind::Line => Vector3::zeros(),
            SegmentKind::Quad => self.second_diff[0],
            SegmentKind::Cubic => self.second_diff[0] * p.c + self.second_diff[1] * p.t,
        }
    }

    /// Third derivative d³P/dt³; constant over t, nonzero only for cubics.
    #[must_use]
    pub fn jerk(&self) -> Vector3 {
        self.third_diff
    }

    /// Arc-length derivative ds/dt = |velocity|.
    #[must_use]
    pub fn speed(&self, p: &LocalParam) -> f64 {
        self.velocity(p).norm()
    }

    /// Second arc-length derivative d²s/dt² = (v·a)/|v|, or 0 where the
    /// velocity vanishes.
    #[must_use]
    pub fn speed_derivative(&self, p: &LocalParam) -> f64 {
        let v = self.velocity(p);
        let n = v.norm();
        if n < crate::math::TOLERANCE {
            return 0.0;
        }
        v.dot(&self.acceleration(p)) / n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    fn param(t: f64) -> LocalParam {
        LocalParam::new(t)
    }

    // ── line ──

    #[test]
    fn line_position_interpolates() {
        let seg = Segment::line(Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 0.0, 0.0));
        let mid = seg.position(&param(0.5));
        assert!((mid.x - 5.0).abs() < TOL);
        assert!(mid.y.abs() < TOL);
    }

    #[test]
    fn line_velocity_is_constant_difference() {
        let seg = Segment::line(Point3::new(1.0, 2.0, 0.0), Point3::new(4.0, 6.0, 0.0));
        for t in [0.0, 0.25, 1.0] {
            let v = seg.velocity(&param(t));
            assert!((v.x - 3.0).abs() < TOL);
            assert!((v.y - 4.0).abs() < TOL);
        }
        assert!((seg.speed(&param(0.5)) - 5.0).abs() < TOL);
    }

    #[test]
    fn line_acceleration_and_jerk_vanish() {
        let seg = Segment::line(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0));
        assert!(seg.acceleration(&param(0.5)).norm() < TOL);
        assert!(seg.jerk().norm() < TOL);
    }

    // ── quad ──

    #[test]
    fn quad_endpoints_match_control_points() {
        let seg = Segment::quad(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        );
        assert!((seg.position(&param(0.0)) - seg.start()).norm() < TOL);
        assert!((seg.position(&param(1.0)) - seg.end()).norm() < TOL);
    }

    #[test]
    fn quad_velocity_at_endpoints() {
        // B'(0) = 2(P1-P0), B'(1) = 2(P2-P1).
        let seg = Segment::quad(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        );
        let v0 = seg.velocity(&param(0.0));
        assert!((v0 - Vector3::new(2.0, 4.0, 0.0)).norm() < TOL);
        let v1 = seg.velocity(&param(1.0));
        assert!((v1 - Vector3::new(2.0, -4.0, 0.0)).norm() < TOL);
    }

    #[test]
    fn quad_acceleration_is_constant() {
        let seg = Segment::quad(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        );
        // B'' = 2(P2 - 2P1 + P0) = 2(0, -4, 0).
        for t in [0.0, 0.5, 1.0] {
            let a = seg.acceleration(&param(t));
            assert!((a - Vector3::new(0.0, -8.0, 0.0)).norm() < TOL, "t = {t}");
        }
    }

    // ── cubic ──

    #[test]
    fn cubic_position_matches_bernstein_form() {
        let seg = Segment::cubic(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 3.0, 0.0),
            Point3::new(2.0, -1.0, 1.0),
            Point3::new(3.0, 0.0, 2.0),
        );
        let t = 0.37;
        let p = param(t);
        let c = 1.0 - t;
        let expect = seg.control_points()[0].coords * c * c * c
            + seg.control_points()[1].coords * 3.0 * c * c * t
            + seg.control_points()[2].coords * 3.0 * c * t * t
            + seg.control_points()[3].coords * t * t * t;
        assert!((seg.position(&p).coords - expect).norm() < TOL);
    }

    #[test]
    fn cubic_velocity_matches_finite_difference() {
        let seg = Segment::cubic(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 3.0, 0.0),
            Point3::new(2.0, -1.0, 1.0),
            Point3::new(3.0, 0.0, 2.0),
        );
        let t = 0.42;
        let h = 1e-6;
        let numeric =
            (seg.position(&param(t + h)) - seg.position(&param(t - h))) / (2.0 * h);
        let analytic = seg.velocity(&param(t));
        assert!((numeric - analytic).norm() < 1e-6);
    }

    #[test]
    fn cubic_jerk_is_constant_third_difference() {
        let seg = Segment::cubic(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
        );
        // 6(P3 - 3P2 + 3P1 - P0) = 6(2-3+3-0, 1-3+0-0, 0).
        let j = seg.jerk();
        assert!((j - Vector3::new(12.0, -12.0, 0.0)).norm() < TOL);
    }

    #[test]
    fn cubic_speed_derivative_matches_finite_difference() {
        let seg = Segment::cubic(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 3.0, 0.0),
            Point3::new(2.0, -1.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
        );
        let t = 0.3;
        let h = 1e-6;
        let numeric = (seg.speed(&param(t + h)) - seg.speed(&param(t - h))) / (2.0 * h);
        let analytic = seg.speed_derivative(&param(t));
        assert!((numeric - analytic).abs() < 1e-5);
    }

    // ── degeneracy ──

    #[test]
    fn degenerate_segment_detected() {
        let p = Point3::new(1.0, 1.0, 0.0);
        assert!(Segment::line(p, p).is_degenerate());
        assert!(Segment::cubic(p, p, p, p).is_degenerate());
        assert!(!Segment::line(p, Point3::new(2.0, 1.0, 0.0)).is_degenerate());
    }

    #[test]
    fn chord_of_line() {
        let seg = Segment::line(Point3::new(0.0, 0.0, 0.0), Point3::new(3.0, 4.0, 0.0));
        assert!((seg.chord() - 5.0).abs() < TOL);
    }
}
