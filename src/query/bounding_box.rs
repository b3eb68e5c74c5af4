use crate::geometry::{LocalParam, Segment, SegmentKind};
use crate::math::roots::solve_quadratic;
use crate::math::Point3;
use crate::path::Path;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Componentwise minimum corner.
    pub min: Point3,
    /// Componentwise maximum corner.
    pub max: Point3,
}

impl BoundingBox {
    fn at(point: &Point3) -> Self {
        Self {
            min: *point,
            max: *point,
        }
    }

    fn include(&mut self, point: &Point3) {
        self.min = Point3::new(
            self.min.x.min(point.x),
            self.min.y.min(point.y),
            self.min.z.min(point.z),
        );
        self.max = Point3::new(
            self.max.x.max(point.x),
            self.max.y.max(point.y),
            self.max.z.max(point.z),
        );
    }

    /// Whether `point` lies inside the box, within `tolerance` per axis.
    #[must_use]
    pub fn contains(&self, point: &Point3, tolerance: f64) -> bool {
        (self.min.x - tolerance..=self.max.x + tolerance).contains(&point.x)
            && (self.min.y - tolerance..=self.max.y + tolerance).contains(&point.y)
            && (self.min.z - tolerance..=self.max.z + tolerance).contains(&point.z)
    }
}

/// Computes the exact axis-aligned bounds of a path.
///
/// Exact, not the control hull: per segment the extrema candidates are the
/// endpoints plus the interior roots of each velocity component — a
/// quadratic per component for cubics, linear for quads, nothing for
/// lines.
pub struct ParameterBounds<'a> {
    path: &'a Path,
}

impl<'a> ParameterBounds<'a> {
    /// Creates a new bounds query.
    #[must_use]
    pub fn new(path: &'a Path) -> Self {
        Self { path }
    }

    /// Executes the query; `None` for an empty path.
    #[must_use]
    pub fn execute(&self) -> Option<BoundingBox> {
        let mut bounds: Option<BoundingBox> = None;
        for segment in self.path.segments() {
            let mut candidates = vec![*segment.start(), *segment.end()];
            for t in extremum_parameters(segment) {
                candidates.push(segment.position(&LocalParam::new(t)));
            }
            for p in candidates {
                bounds.get_or_insert_with(|| BoundingBox::at(&p)).include(&p);
            }
        }
        bounds
    }
}

/// Interior parameters where some velocity component vanishes.
fn extremum_parameters(segment: &Segment) -> Vec<f64> {
    let mut parameters = Vec::new();
    let mut push = |t: f64| {
        if t > 0.0 && t < 1.0 {
            parameters.push(t);
        }
    };
    match segment.kind() {
        SegmentKind::Line => {}
        SegmentKind::Quad => {
            // Velocity is linear per component: v(t) = v0 + t·(v1 − v0).
            let v0 = segment.velocity(&LocalParam::new(0.0));
            let v1 = segment.velocity(&LocalParam::new(1.0));
            for axis in 0..3 {
                let d = v1[axis] - v0[axis];
                if d.abs() > f64::EPSILON {
                    push(-v0[axis] / d);
                }
            }
        }
        SegmentKind::Cubic => {
            // Velocity is quadratic per component. Sample it at three
            // parameters and reconstruct the coefficients:
            // v(t) = c0 + c1·t + c2·t².
            let v0 = segment.velocity(&LocalParam::new(0.0));
            let vh = segment.velocity(&LocalParam::new(0.5));
            let v1 = segment.velocity(&LocalParam::new(1.0));
            for axis in 0..3 {
                let c0 = v0[axis];
                let c2 = 2.0 * (v1[axis] - 2.0 * vh[axis] + v0[axis]);
                let c1 = v1[axis] - c0 - c2;
                for root in solve_quadratic(c0, c1, c2) {
                    push(root);
                }
            }
        }
    }
    parameters
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Dimension;
    use crate::path::{PathCommand, PathConfig};

    fn pt(x: f64, y: f64) -> Point3 {
        Point3::new(x, y, 0.0)
    }

    #[test]
    fn line_bounds_are_endpoints() {
        let path = Path::build(
            Dimension::Two,
            [
                PathCommand::MoveTo(pt(1.0, 2.0)),
                PathCommand::LineTo(pt(-1.0, 5.0)),
            ],
            PathConfig::default(),
        )
        .unwrap();
        let bounds = path.bounding_box().unwrap();
        assert_eq!(bounds.min, pt(-1.0, 2.0));
        assert_eq!(bounds.max, pt(1.0, 5.0));
    }

    #[test]
    fn quad_peak_exceeds_endpoints() {
        // Peak of the parabola at t = 0.5 is y = 0.5, above both
        // endpoints.
        let path = Path::build(
            Dimension::Two,
            [
                PathCommand::MoveTo(pt(0.0, 0.0)),
                PathCommand::QuadTo {
                    control: pt(1.0, 1.0),
                    end: pt(2.0, 0.0),
                },
            ],
            PathConfig::default(),
        )
        .unwrap();
        let bounds = path.bounding_box().unwrap();
        assert!((bounds.max.y - 0.5).abs() < 1e-12, "max.y = {}", bounds.max.y);
        assert!(bounds.min.y.abs() < 1e-12);
    }

    #[test]
    fn cubic_bounds_via_derivative_roots() {
        let path = Path::build(
            Dimension::Two,
            [
                PathCommand::MoveTo(pt(0.0, 0.0)),
                PathCommand::CubicTo {
                    control1: pt(0.0, 2.0),
                    control2: pt(2.0, 2.0),
                    end: pt(2.0, 0.0),
                },
            ],
            PathConfig::default(),
        )
        .unwrap();
        let bounds = path.bounding_box().unwrap();
        // Symmetric arch: peak y = (0 + 3·2 + 3·2 + 0)/8 = 1.5 at t = 0.5.
        assert!((bounds.max.y - 1.5).abs() < 1e-9, "max.y = {}", bounds.max.y);
        // The x-range is exactly the endpoint range for this shape.
        assert!(bounds.min.x.abs() < 1e-12);
        assert!((bounds.max.x - 2.0).abs() < 1e-12);
    }

    #[test]
    fn bounds_contain_flattened_points() {
        let path = Path::build(
            Dimension::Two,
            [
                PathCommand::MoveTo(pt(0.0, 0.0)),
                PathCommand::CubicTo {
                    control1: pt(1.0, 3.0),
                    control2: pt(2.0, -3.0),
                    end: pt(3.0, 0.0),
                },
                PathCommand::LineTo(pt(3.0, 2.0)),
            ],
            PathConfig::default(),
        )
        .unwrap();
        let bounds = path.bounding_box().unwrap();
        for p in path.flatten(1e-4) {
            assert!(bounds.contains(&p, 1e-9), "point {p} outside bounds");
        }
    }

    #[test]
    fn empty_path_has_no_bounds() {
        let path = Path::build(Dimension::Two, [], PathConfig::default()).unwrap();
        assert!(path.bounding_box().is_none());
    }
}
