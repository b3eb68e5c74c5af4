use crate::error::{QueryError, Result};
use crate::geometry::{LocalParam, SegmentEvaluator};
use crate::math::{Point3, Vector3, PARAM_EPSILON};
use crate::path::Path;

/// Decomposes a real-valued path parameter into (segment index, local t).
///
/// The integer part of `u` selects the segment, the fractional part is the
/// local parameter. Values within [`PARAM_EPSILON`] of an integer are
/// snapped to it first, forgiving accumulated round-off at segment
/// boundaries. Closed paths wrap modulo the segment count (negative and
/// multi-lap parameters included); open paths reject parameters outside
/// `[0, segment_count]` and map `u == segment_count` to the last segment
/// at t = 1.
pub struct ParameterMapper<'a> {
    path: &'a Path,
}

impl<'a> ParameterMapper<'a> {
    /// Binds a mapper to a path.
    #[must_use]
    pub fn new(path: &'a Path) -> Self {
        Self { path }
    }

    /// Splits `u` into (segment index, local t ∈ [0, 1]).
    ///
    /// # Errors
    ///
    /// [`QueryError::ParameterOutOfRange`] for an empty path, or for an
    /// open-path parameter outside the domain.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn decompose(&self, u: f64) -> Result<(usize, f64)> {
        let count = self.path.segment_count();
        if count == 0 {
            return Err(QueryError::ParameterOutOfRange {
                value: u,
                max: 0.0,
            }
            .into());
        }
        let count_f = count as f64;
        let mut v = if self.path.is_closed() {
            u.rem_euclid(count_f)
        } else {
            if u < -PARAM_EPSILON || u > count_f + PARAM_EPSILON {
                return Err(QueryError::ParameterOutOfRange {
                    value: u,
                    max: count_f,
                }
                .into());
            }
            u.clamp(0.0, count_f)
        };
        let nearest = v.round();
        if (v - nearest).abs() < PARAM_EPSILON {
            v = nearest;
        }
        if v >= count_f {
            // Open: u == count maps to the last segment's end. Closed: the
            // snap can round count - ε back up to count, which wraps.
            return if self.path.is_closed() {
                Ok((0, 0.0))
            } else {
                Ok((count - 1, 1.0))
            };
        }
        let index = (v.floor() as usize).min(count - 1);
        let t = (v - index as f64).clamp(0.0, 1.0);
        Ok((index, t))
    }

    /// Builds a cached [`Location`] at `u`.
    ///
    /// # Errors
    ///
    /// As for [`ParameterMapper::decompose`].
    pub fn locate(&self, u: f64) -> Result<Location> {
        let (segment_index, t) = self.decompose(u)?;
        let evaluator = self.path.segment_evaluator(segment_index)?;
        Ok(Location {
            revision: self.path.revision(),
            segment_index,
            local: LocalParam::new(t),
            evaluator,
        })
    }
}

/// A transient cursor caching the decomposition of one path parameter.
///
/// Requesting many quantities at the same point through a `Location`
/// avoids re-decomposing the parameter and re-memoizing its powers. Every
/// accessor takes the path and re-validates the revision the cursor was
/// built at: after a rebuild the cursor is stale and all accessors fail.
#[derive(Debug, Clone, Copy)]
pub struct Location {
    revision: u64,
    segment_index: usize,
    local: LocalParam,
    evaluator: SegmentEvaluator,
}

impl Location {
    /// Segment index of the decomposed parameter.
    #[must_use]
    pub fn segment_index(&self) -> usize {
        self.segment_index
    }

    /// Local parameter within the segment.
    #[must_use]
    pub fn local_parameter(&self) -> f64 {
        self.local.t()
    }

    fn ensure_fresh(&self, path: &Path) -> Result<()> {
        let current = path.revision();
        if current != self.revision {
            return Err(QueryError::StaleLocation {
                built: self.revision,
                current,
            }
            .into());
        }
        Ok(())
    }

    /// Position at the cursor.
    ///
    /// # Errors
    ///
    /// [`QueryError::StaleLocation`] after a rebuild.
    pub fn position(&self, path: &Path) -> Result<Point3> {
        self.ensure_fresh(path)?;
        Ok(self.evaluator.position(&self.local))
    }

    /// First derivative dP/dt.
    ///
    /// # Errors
    ///
    /// [`QueryError::StaleLocation`] after a rebuild.
    pub fn velocity(&self, path: &Path) -> Result<Vector3> {
        self.ensure_fresh(path)?;
        Ok(self.evaluator.velocity(&self.local))
    }

    /// Second derivative d²P/dt².
    ///
    /// # Errors
    ///
    /// [`QueryError::StaleLocation`] after a rebuild.
    pub fn acceleration(&self, path: &Path) -> Result<Vector3> {
        self.ensure_fresh(path)?;
        Ok(self.evaluator.acceleration(&self.local))
    }

    /// Third derivative d³P/dt³.
    ///
    /// # Errors
    ///
    /// [`QueryError::StaleLocation`] after a rebuild.
    pub fn jerk(&self, path: &Path) -> Result<Vector3> {
        self.ensure_fresh(path)?;
        Ok(self.evaluator.jerk())
    }

    /// Arc-length derivative ds/dt.
    ///
    /// # Errors
    ///
    /// [`QueryError::StaleLocation`] after a rebuild.
    pub fn speed(&self, path: &Path) -> Result<f64> {
        self.ensure_fresh(path)?;
        Ok(self.evaluator.speed(&self.local))
    }

    /// Second arc-length derivative d²s/dt².
    ///
    /// # Errors
    ///
    /// [`QueryError::StaleLocation`] after a rebuild.
    pub fn speed_derivative(&self, path: &Path) -> Result<f64> {
        self.ensure_fresh(path)?;
        Ok(self.evaluator.speed_derivative(&self.local))
    }

    /// Whether the Frenet frame exists at the cursor.
    ///
    /// # Errors
    ///
    /// [`QueryError::StaleLocation`] after a rebuild.
    pub fn frame_defined(&self, path: &Path) -> Result<bool> {
        self.ensure_fresh(path)?;
        Ok(self.evaluator.frame_defined(&self.local))
    }

    /// Unit tangent.
    ///
    /// # Errors
    ///
    /// Staleness, or tangent nonexistence.
    pub fn tangent(&self, path: &Path) -> Result<Vector3> {
        self.ensure_fresh(path)?;
        self.evaluator.tangent(&self.local)
    }

    /// Unit principal normal.
    ///
    /// # Errors
    ///
    /// Staleness, or normal nonexistence.
    pub fn normal(&self, path: &Path) -> Result<Vector3> {
        self.ensure_fresh(path)?;
        self.evaluator.normal(&self.local)
    }

    /// Binormal.
    ///
    /// # Errors
    ///
    /// Staleness, or frame nonexistence.
    pub fn binormal(&self, path: &Path) -> Result<Vector3> {
        self.ensure_fresh(path)?;
        self.evaluator.binormal(&self.local)
    }

    /// Curvature.
    ///
    /// # Errors
    ///
    /// Staleness, or curvature nonexistence.
    pub fn curvature(&self, path: &Path) -> Result<f64> {
        self.ensure_fresh(path)?;
        self.evaluator.curvature(&self.local)
    }

    /// Torsion.
    ///
    /// # Errors
    ///
    /// Staleness, or torsion nonexistence.
    pub fn torsion(&self, path: &Path) -> Result<f64> {
        self.ensure_fresh(path)?;
        self.evaluator.torsion(&self.local)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ArclisError;
    use crate::geometry::Dimension;
    use crate::path::{PathCommand, PathConfig};

    fn pt(x: f64, y: f64) -> Point3 {
        Point3::new(x, y, 0.0)
    }

    fn open_two_segments() -> Path {
        Path::build(
            Dimension::Two,
            [
                PathCommand::MoveTo(pt(0.0, 0.0)),
                PathCommand::LineTo(pt(1.0, 0.0)),
                PathCommand::LineTo(pt(1.0, 1.0)),
            ],
            PathConfig::default(),
        )
        .unwrap()
    }

    fn closed_triangle() -> Path {
        Path::build(
            Dimension::Two,
            [
                PathCommand::MoveTo(pt(0.0, 0.0)),
                PathCommand::LineTo(pt(1.0, 0.0)),
                PathCommand::LineTo(pt(1.0, 1.0)),
                PathCommand::Close,
            ],
            PathConfig::default(),
        )
        .unwrap()
    }

    // ── decompose ──

    #[test]
    fn decomposes_interior_parameter() {
        let path = open_two_segments();
        let mapper = ParameterMapper::new(&path);
        let (index, t) = mapper.decompose(1.25).unwrap();
        assert_eq!(index, 1);
        assert!((t - 0.25).abs() < 1e-12);
    }

    #[test]
    fn end_parameter_maps_to_last_segment() {
        let path = open_two_segments();
        let mapper = ParameterMapper::new(&path);
        let (index, t) = mapper.decompose(2.0).unwrap();
        assert_eq!(index, 1);
        assert!((t - 1.0).abs() < 1e-12);
    }

    #[test]
    fn boundary_roundoff_is_forgiven() {
        let path = open_two_segments();
        let mapper = ParameterMapper::new(&path);
        // Marginally above the end of the domain: snapped, not rejected.
        let (index, t) = mapper.decompose(2.0 + 5e-11).unwrap();
        assert_eq!(index, 1);
        assert!((t - 1.0).abs() < 1e-12);
        // Marginally below a boundary: snapped up to the next segment.
        let (index, t) = mapper.decompose(1.0 - 5e-11).unwrap();
        assert_eq!(index, 1);
        assert!(t.abs() < 1e-12);
    }

    #[test]
    fn open_path_rejects_out_of_range() {
        let path = open_two_segments();
        let mapper = ParameterMapper::new(&path);
        assert!(matches!(
            mapper.decompose(-0.5),
            Err(ArclisError::Query(QueryError::ParameterOutOfRange { .. }))
        ));
        assert!(mapper.decompose(2.5).is_err());
    }

    #[test]
    fn closed_path_wraps_parameters() {
        let path = closed_triangle();
        let mapper = ParameterMapper::new(&path);
        let (index, t) = mapper.decompose(4.5).unwrap();
        assert_eq!(index, 1);
        assert!((t - 0.5).abs() < 1e-12);
        // Negative parameters wrap backwards.
        let (index, t) = mapper.decompose(-0.5).unwrap();
        assert_eq!(index, 2);
        assert!((t - 0.5).abs() < 1e-12);
        // An exact multiple of the count is the path start.
        let (index, t) = mapper.decompose(3.0).unwrap();
        assert_eq!(index, 0);
        assert!(t.abs() < 1e-12);
    }

    #[test]
    fn empty_path_has_no_domain() {
        let path = Path::build(Dimension::Two, [], PathConfig::default()).unwrap();
        let mapper = ParameterMapper::new(&path);
        assert!(mapper.decompose(0.0).is_err());
    }

    // ── location ──

    #[test]
    fn location_caches_decomposition() {
        let path = open_two_segments();
        let location = path.location(1.5).unwrap();
        assert_eq!(location.segment_index(), 1);
        assert!((location.local_parameter() - 0.5).abs() < 1e-12);
        let p = location.position(&path).unwrap();
        assert!((p - pt(1.0, 0.5)).norm() < 1e-12);
    }

    #[test]
    fn location_matches_direct_queries() {
        let path = closed_triangle();
        for u in [0.0, 0.3, 1.7, 2.5] {
            let location = path.location(u).unwrap();
            let direct = path.position(u).unwrap();
            let cached = location.position(&path).unwrap();
            assert!((direct - cached).norm() < 1e-12, "u = {u}");
        }
    }

    #[test]
    fn stale_location_is_rejected() {
        let mut path = open_two_segments();
        let location = path.location(0.5).unwrap();
        assert!(location.position(&path).is_ok());
        path.refresh().unwrap();
        assert!(matches!(
            location.position(&path),
            Err(ArclisError::Query(QueryError::StaleLocation { .. }))
        ));
        assert!(location.tangent(&path).is_err());
    }
}
