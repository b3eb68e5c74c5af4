use crate::geometry::{LocalParam, Segment, SegmentKind};
use crate::math::{Point3, TOLERANCE};
use crate::path::Path;

/// Bound on adaptive subdivision depth per segment.
const MAX_FLATTEN_DEPTH: u32 = 24;

/// Converts a path to a polyline by adaptively subdividing each curved
/// segment until the midpoint deviates from the chord by at most
/// `tolerance`. Straight segments contribute their endpoints directly.
///
/// Returns the polyline points, starting at the path start; an empty path
/// yields no points. Non-positive tolerances are clamped up to the global
/// geometric tolerance.
#[must_use]
pub fn flatten(path: &Path, tolerance: f64) -> Vec<Point3> {
    let tolerance = tolerance.max(TOLERANCE);
    let mut points = Vec::new();
    for (index, segment) in path.segments().iter().enumerate() {
        if index == 0 {
            points.push(*segment.start());
        }
        match segment.kind() {
            SegmentKind::Line => points.push(*segment.end()),
            SegmentKind::Quad | SegmentKind::Cubic => {
                let pa = segment.position(&LocalParam::new(0.0));
                let pb = segment.position(&LocalParam::new(1.0));
                subdivide(segment, 0.0, 1.0, &pa, &pb, tolerance, 0, &mut points);
                points.push(*segment.end());
            }
        }
    }
    points
}

/// Emits interior points of `segment` over `(a, b)` until the chord is
/// within `tolerance` of the curve; endpoints are emitted by the caller.
#[allow(clippy::too_many_arguments)]
fn subdivide(
    segment: &Segment,
    a: f64,
    b: f64,
    pa: &Point3,
    pb: &Point3,
    tolerance: f64,
    depth: u32,
    points: &mut Vec<Point3>,
) {
    let mid = 0.5 * (a + b);
    let pm = segment.position(&LocalParam::new(mid));
    let chord_mid = Point3::from((pa.coords + pb.coords) * 0.5);
    let deviation = (pm - chord_mid).norm();
    if depth >= MAX_FLATTEN_DEPTH || deviation <= tolerance {
        return;
    }
    subdivide(segment, a, mid, pa, &pm, tolerance, depth + 1, points);
    points.push(pm);
    subdivide(segment, mid, b, &pm, pb, tolerance, depth + 1, points);
}
