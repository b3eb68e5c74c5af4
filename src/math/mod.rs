pub mod quadrature;
pub mod roots;
pub mod spline;
pub mod summation;

/// 3D point type. 2D paths live in the XY plane with `z = 0`.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Round-off forgiveness when decomposing a path parameter at segment
/// boundaries.
pub const PARAM_EPSILON: f64 = 1e-10;

/// ULP scale factor for the point-coincidence test.
const COINCIDENCE_ULPS: f64 = 16.0;

/// Returns true if two points coincide within an ULP-scaled tolerance.
///
/// The tolerance grows with the magnitude of the coordinates involved, so
/// the test behaves the same for paths drawn near the origin and paths
/// drawn far from it.
#[must_use]
pub fn points_coincident(a: &Point3, b: &Point3) -> bool {
    let scale = a.coords.amax().max(b.coords.amax()).max(1.0);
    (a - b).norm() <= scale * f64::EPSILON * COINCIDENCE_ULPS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coincident_identical_points() {
        let p = Point3::new(1.0, 2.0, 3.0);
        assert!(points_coincident(&p, &p));
    }

    #[test]
    fn coincident_within_ulps() {
        let p = Point3::new(1.0, 0.0, 0.0);
        let q = Point3::new(1.0 + f64::EPSILON, 0.0, 0.0);
        assert!(points_coincident(&p, &q));
    }

    #[test]
    fn not_coincident_distinct_points() {
        let p = Point3::new(0.0, 0.0, 0.0);
        let q = Point3::new(1e-6, 0.0, 0.0);
        assert!(!points_coincident(&p, &q));
    }

    #[test]
    fn coincidence_scales_with_magnitude() {
        // At magnitude 1e12, a gap of a few hundred ULPs of 1.0 is still
        // coincident because the tolerance scales up.
        let p = Point3::new(1e12, 0.0, 0.0);
        let q = Point3::new(1e12 + 1e-4, 0.0, 0.0);
        assert!(points_coincident(&p, &q));
    }
}
