use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::{Dimension, LocalParam, Segment, SegmentKind};

/// Evaluator bound to one segment's coordinates.
///
/// All differential-geometric quantities are pure functions of a
/// [`LocalParam`]. The evaluator owns a copy of its segment (segments are
/// small, immutable value types), so it stays valid independently of the
/// path it came from; staleness is policed at the [`crate::query::Location`]
/// level instead.
///
/// For the degenerate closing edge of a cyclic path — a closing segment
/// whose control points all coincide — frame queries delegate to the
/// predecessor segment evaluated at t = 1: a zero-length closing edge
/// continues the geometry where the path left off rather than introducing
/// a fresh discontinuity. The predecessor is an optional copy, present only
/// on closing-edge evaluators.
#[derive(Debug, Clone, Copy)]
pub struct SegmentEvaluator {
    segment: Segment,
    predecessor: Option<Segment>,
    dimension: Dimension,
}

impl SegmentEvaluator {
    /// Binds an evaluator to a segment.
    ///
    /// `predecessor` should be the preceding segment when `segment` is the
    /// closing edge of a cyclic path; it is consulted only when the closing
    /// edge is degenerate.
    #[must_use]
    pub fn new(segment: Segment, predecessor: Option<Segment>, dimension: Dimension) -> Self {
        Self {
            segment,
            predecessor,
            dimension,
        }
    }

    /// The segment this evaluator is bound to.
    #[must_use]
    pub fn segment(&self) -> &Segment {
        &self.segment
    }

    /// Whether frame queries at this point delegate to the predecessor.
    fn delegates(&self) -> bool {
        self.predecessor.is_some() && self.segment.is_closing() && self.segment.is_degenerate()
    }

    /// Resolves the segment and parameter a frame query actually evaluates:
    /// the bound segment at `p`, or the predecessor at t = 1 for a
    /// degenerate closing edge.
    fn frame_target(&self, p: &LocalParam) -> (&Segment, LocalParam) {
        if self.delegates() {
            if let Some(predecessor) = &self.predecessor {
                return (predecessor, LocalParam::new(1.0));
            }
        }
        (&self.segment, *p)
    }

    /// Position at the local parameter.
    #[must_use]
    pub fn position(&self, p: &LocalParam) -> Point3 {
        self.segment.position(p)
    }

    /// First derivative dP/dt.
    #[must_use]
    pub fn velocity(&self, p: &LocalParam) -> Vector3 {
        self.segment.velocity(p)
    }

    /// Second derivative d²P/dt².
    #[must_use]
    pub fn acceleration(&self, p: &LocalParam) -> Vector3 {
        self.segment.acceleration(p)
    }

    /// Third derivative d³P/dt³.
    #[must_use]
    pub fn jerk(&self) -> Vector3 {
        self.segment.jerk()
    }

    /// Arc-length derivative ds/dt.
    #[must_use]
    pub fn speed(&self, p: &LocalParam) -> f64 {
        self.segment.speed(p)
    }

    /// Second arc-length derivative d²s/dt².
    #[must_use]
    pub fn speed_derivative(&self, p: &LocalParam) -> f64 {
        self.segment.speed_derivative(p)
    }

    /// Whether the Frenet frame (tangent, and with it normal and
    /// curvature) exists at the local parameter.
    #[must_use]
    pub fn frame_defined(&self, p: &LocalParam) -> bool {
        let (segment, local) = self.frame_target(p);
        tangent_of(segment, &local).is_ok()
    }

    /// Unit tangent. Exactly unit length where it exists.
    ///
    /// # Errors
    ///
    /// [`GeometryError::UndefinedTangent`] when every derivative vanishes
    /// at the parameter (degenerate segment).
    pub fn tangent(&self, p: &LocalParam) -> Result<Vector3> {
        let (segment, local) = self.frame_target(p);
        tangent_of(segment, &local)
    }

    /// Curvature: signed in 2D ((x′y″ − y′x″)/|v|³), magnitude in 3D
    /// (|v×a|/|v|³).
    ///
    /// # Errors
    ///
    /// [`GeometryError::UndefinedCurvature`] where the velocity vanishes.
    pub fn curvature(&self, p: &LocalParam) -> Result<f64> {
        let (segment, local) = self.frame_target(p);
        let v = segment.velocity(&local);
        let speed = v.norm();
        if speed < TOLERANCE {
            return Err(GeometryError::UndefinedCurvature { t: p.t() }.into());
        }
        let cross = v.cross(&segment.acceleration(&local));
        let speed_cubed = speed * speed * speed;
        Ok(match self.dimension {
            Dimension::Two => cross.z / speed_cubed,
            Dimension::Three => cross.norm() / speed_cubed,
        })
    }

    /// Torsion: (v·(a×j))/|v×a|². Identically 0 for planar paths.
    ///
    /// # Errors
    ///
    /// [`GeometryError::UndefinedTorsion`] where the curvature vanishes.
    pub fn torsion(&self, p: &LocalParam) -> Result<f64> {
        let (segment, local) = self.frame_target(p);
        let v = segment.velocity(&local);
        let a = segment.acceleration(&local);
        let cross = v.cross(&a);
        let denom = cross.norm_squared();
        if denom < TOLERANCE * TOLERANCE {
            return Err(GeometryError::UndefinedTorsion { t: p.t() }.into());
        }
        Ok(v.dot(&a.cross(&segment.jerk())) / denom)
    }

    /// Unit principal normal, oriented so d²r/ds² = κN.
    ///
    /// In 2D the normal is the tangent rotated +90°, which together with
    /// the signed curvature satisfies the Frenet relation; it exists
    /// wherever the tangent does, straight lines included. In 3D the
    /// normal is undefined where the curvature vanishes, except that cubic
    /// segments recover a consistent direction near an inflection by
    /// sampling the binormal at the opposite endpoint.
    ///
    /// # Errors
    ///
    /// [`GeometryError::UndefinedNormal`] (3D, zero curvature with no
    /// recoverable orientation) or a tangent error.
    pub fn normal(&self, p: &LocalParam) -> Result<Vector3> {
        let (segment, local) = self.frame_target(p);
        normal_of(segment, &local, self.dimension, true)
    }

    /// Binormal B = T × N.
    ///
    /// # Errors
    ///
    /// Propagates tangent/normal nonexistence.
    pub fn binormal(&self, p: &LocalParam) -> Result<Vector3> {
        let (segment, local) = self.frame_target(p);
        binormal_of(segment, &local, self.dimension, true)
    }
}

/// Unit tangent of a segment, with derivative fallback at isolated
/// velocity zeros (e.g. a cubic whose first two control points coincide).
fn tangent_of(segment: &Segment, p: &LocalParam) -> Result<Vector3> {
    let v = segment.velocity(p);
    let n = v.norm();
    if n > TOLERANCE {
        return Ok(v / n);
    }
    // The velocity vanishes. Approaching from inside the segment, the
    // limit direction follows the next nonvanishing derivative: +a at the
    // start, -a at the end, +j either way.
    let a = segment.acceleration(p);
    let an = a.norm();
    if an > TOLERANCE {
        let sign = if p.t() > 0.5 { -1.0 } else { 1.0 };
        return Ok(a * (sign / an));
    }
    let j = segment.jerk();
    let jn = j.norm();
    if jn > TOLERANCE {
        return Ok(j / jn);
    }
    Err(GeometryError::UndefinedTangent { t: p.t() }.into())
}

fn normal_of(
    segment: &Segment,
    p: &LocalParam,
    dimension: Dimension,
    allow_heuristic: bool,
) -> Result<Vector3> {
    let tangent = tangent_of(segment, p)?;
    match dimension {
        Dimension::Two => Ok(Vector3::new(-tangent.y, tangent.x, 0.0)),
        Dimension::Three => {
            // Component of the acceleration orthogonal to the tangent.
            let a = segment.acceleration(p);
            let rejection = a - tangent * a.dot(&tangent);
            let n = rejection.norm();
            if n > TOLERANCE {
                return Ok(rejection / n);
            }
            if allow_heuristic && segment.kind() == SegmentKind::Cubic {
                // Near an inflection the normal flips through zero; the
                // opposite endpoint usually has well-defined curvature, and
                // its binormal fixes a consistent orientation.
                let opposite = LocalParam::new(if p.t() < 0.5 { 1.0 } else { 0.0 });
                if let Ok(binormal) = binormal_of(segment, &opposite, dimension, false) {
                    let candidate = binormal.cross(&tangent);
                    let cn = candidate.norm();
                    if cn > TOLERANCE {
                        return Ok(candidate / cn);
                    }
                }
            }
            Err(GeometryError::UndefinedNormal { t: p.t() }.into())
        }
    }
}

fn binormal_of(
    segment: &Segment,
    p: &LocalParam,
    dimension: Dimension,
    allow_heuristic: bool,
) -> Result<Vector3> {
    let tangent = tangent_of(segment, p)?;
    let normal = normal_of(segment, p, dimension, allow_heuristic)?;
    Ok(tangent.cross(&normal))
}
