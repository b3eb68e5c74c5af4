use crate::error::{QueryError, Result};
use crate::geometry::LocalParam;
use crate::math::roots::newton_bracketed;
use crate::math::Point3;
use crate::path::Path;

/// Coarse samples taken per segment before polishing.
const COARSE_SAMPLES: usize = 16;

/// Residual tolerance for the polishing step.
const POLISH_TOLERANCE: f64 = 1e-12;

/// Result of a closest-point query.
#[derive(Debug, Clone, Copy)]
pub struct ClosestPointResult {
    /// The closest point on the path.
    pub point: Point3,
    /// The path parameter at the closest point.
    pub parameter: f64,
    /// Distance from the query point to the closest point.
    pub distance: f64,
}

/// Finds the nearest point on a path to a query point.
///
/// Coarse per-segment sampling brackets the minimum, then bracketed
/// Newton polishes the stationarity condition `(P(t) − Q)·P′(t) = 0`
/// within the bracketing sample step.
pub struct ClosestPoint<'a> {
    path: &'a Path,
    point: Point3,
}

impl<'a> ClosestPoint<'a> {
    /// Creates a new closest-point query.
    #[must_use]
    pub fn new(path: &'a Path, point: Point3) -> Self {
        Self { path, point }
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// [`QueryError::ParameterOutOfRange`] for an empty path.
    #[allow(clippy::cast_precision_loss)]
    pub fn execute(&self) -> Result<ClosestPointResult> {
        if self.path.segment_count() == 0 {
            return Err(QueryError::ParameterOutOfRange {
                value: 0.0,
                max: 0.0,
            }
            .into());
        }

        let mut best_index = 0;
        let mut best_t = 0.0;
        let mut best_dist_sq = f64::INFINITY;
        for (index, segment) in self.path.segments().iter().enumerate() {
            for sample in 0..=COARSE_SAMPLES {
                let t = sample as f64 / COARSE_SAMPLES as f64;
                let d = (segment.position(&LocalParam::new(t)) - self.point).norm_squared();
                if d < best_dist_sq {
                    best_dist_sq = d;
                    best_index = index;
                    best_t = t;
                }
            }
        }

        let segment = &self.path.segments()[best_index];
        let step = 1.0 / COARSE_SAMPLES as f64;
        let lo = (best_t - step).max(0.0);
        let hi = (best_t + step).min(1.0);
        // Stationarity of the squared distance: g(t) = (P − Q)·P′.
        let g = |t: f64| {
            let p = LocalParam::new(t);
            (segment.position(&p) - self.point).dot(&segment.velocity(&p))
        };
        let dg = |t: f64| {
            let p = LocalParam::new(t);
            let offset = segment.position(&p) - self.point;
            segment.velocity(&p).norm_squared() + offset.dot(&segment.acceleration(&p))
        };
        let mut refined_t = best_t;
        if let Some(t) = newton_bracketed(g, dg, best_t, lo, hi, POLISH_TOLERANCE) {
            // Keep the polish only if it actually improved the distance
            // (the stationary point could be a local maximum).
            let d = (segment.position(&LocalParam::new(t)) - self.point).norm_squared();
            if d <= best_dist_sq {
                refined_t = t;
            }
        }

        let closest = segment.position(&LocalParam::new(refined_t));
        Ok(ClosestPointResult {
            point: closest,
            parameter: best_index as f64 + refined_t,
            distance: (closest - self.point).norm(),
        })
    }
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

    fn bent_path() -> Path {
        Path::build(
            Dimension::Two,
            [
                PathCommand::MoveTo(pt(0.0, 0.0)),
                PathCommand::LineTo(pt(2.0, 0.0)),
                PathCommand::QuadTo {
                    control: pt(3.0, 0.0),
                    end: pt(3.0, 1.0),
                },
            ],
            PathConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn projects_onto_straight_segment() {
        let path = bent_path();
        let result = path.closest_point(&pt(1.0, 1.0)).unwrap();
        assert!((result.point - pt(1.0, 0.0)).norm() < 1e-9);
        assert!((result.parameter - 0.5).abs() < 1e-9);
        assert!((result.distance - 1.0).abs() < 1e-9);
    }

    #[test]
    fn on_path_point_has_zero_distance() {
        let path = bent_path();
        let on_path = path.position(1.5).unwrap();
        let result = path.closest_point(&on_path).unwrap();
        assert!(result.distance < 1e-9, "distance = {}", result.distance);
        assert!((result.parameter - 1.5).abs() < 1e-6);
    }

    #[test]
    fn endpoint_is_closest_beyond_the_path() {
        let path = bent_path();
        let result = path.closest_point(&pt(-3.0, 0.0)).unwrap();
        assert!((result.point - pt(0.0, 0.0)).norm() < 1e-9);
        assert!(result.parameter.abs() < 1e-9);
        assert!((result.distance - 3.0).abs() < 1e-9);
    }

    #[test]
    fn empty_path_is_an_error() {
        let path = Path::build(Dimension::Two, [], PathConfig::default()).unwrap();
        assert!(path.closest_point(&pt(0.0, 0.0)).is_err());
    }
}
