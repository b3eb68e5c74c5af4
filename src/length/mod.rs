//! Arc-length bookkeeping.
//!
//! Lines have a closed-form length; curved segments are measured by
//! adaptively subdividing the parameter interval until each piece is flat,
//! then integrating the arc-length derivative over the piece with a
//! fixed-order Gauss–Legendre rule. All piece sums are compensated.

pub mod cumulative;
pub mod sublength;

pub use cumulative::CumulativeLengths;
pub use sublength::SublengthSpline;

use crate::geometry::{LocalParam, Segment, SegmentKind};
use crate::math::quadrature::QuadratureRule;
use crate::math::summation::CompensatedSum;

/// A parameter interval is flat enough to integrate in one quadrature call
/// when its two half-chords exceed its chord by at most this fraction of
/// the chord.
const FLATNESS_RATIO: f64 = 1e-4;

/// Bound on adaptive subdivision depth.
const MAX_SUBDIVISION_DEPTH: u32 = 20;

/// Length of a straight segment.
///
/// Axis-aligned edges take the single-component shortcut so the result is
/// the exact coordinate difference, free of the cancellation the general
/// norm can introduce.
#[must_use]
pub fn line_length(segment: &Segment) -> f64 {
    let d = segment.end() - segment.start();
    if d.y == 0.0 && d.z == 0.0 {
        d.x.abs()
    } else if d.x == 0.0 && d.z == 0.0 {
        d.y.abs()
    } else if d.x == 0.0 && d.y == 0.0 {
        d.z.abs()
    } else {
        d.norm()
    }
}

/// Total length of one segment.
#[must_use]
pub fn segment_length(segment: &Segment, rule: &QuadratureRule) -> f64 {
    match segment.kind() {
        SegmentKind::Line => line_length(segment),
        SegmentKind::Quad | SegmentKind::Cubic => arc_length_between(segment, 0.0, 1.0, rule),
    }
}

/// Arc length of `segment` between local parameters `a` and `b`.
///
/// Returns 0 for `b ≤ a`; callers handle direction.
#[must_use]
pub fn arc_length_between(segment: &Segment, a: f64, b: f64, rule: &QuadratureRule) -> f64 {
    if b <= a {
        return 0.0;
    }
    if segment.kind() == SegmentKind::Line {
        return (b - a) * line_length(segment);
    }
    let mut sum = CompensatedSum::new();
    let pa = segment.position(&LocalParam::new(a));
    let pb = segment.position(&LocalParam::new(b));
    subdivide(segment, a, b, &pa, &pb, rule, 0, &mut sum);
    sum.value()
}

#[allow(clippy::too_many_arguments)]
fn subdivide(
    segment: &Segment,
    a: f64,
    b: f64,
    pa: &crate::math::Point3,
    pb: &crate::math::Point3,
    rule: &QuadratureRule,
    depth: u32,
    sum: &mut CompensatedSum,
) {
    let mid = 0.5 * (a + b);
    let pm = segment.position(&LocalParam::new(mid));
    let chord = (pb - pa).norm();
    let halves = (pm - pa).norm() + (pb - pm).norm();
    if depth >= MAX_SUBDIVISION_DEPTH || halves - chord <= FLATNESS_RATIO * chord {
        sum.add(rule.integrate(a, b, |t| segment.speed(&LocalParam::new(t))));
        return;
    }
    subdivide(segment, a, mid, pa, &pm, rule, depth + 1, sum);
    subdivide(segment, mid, b, &pm, pb, rule, depth + 1, sum);
}
