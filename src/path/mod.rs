//! Path assembly and the validated path snapshot.

mod builder;
pub mod command;
pub mod config;

pub use command::PathCommand;
pub use config::PathConfig;

use std::cell::{OnceCell, RefCell};
use std::fmt;

use crate::error::{QueryError, Result};
use crate::geometry::{Dimension, LocalParam, Segment, SegmentEvaluator, SegmentKind};
use crate::length::{CumulativeLengths, SublengthSpline};
use crate::math::quadrature::{QuadratureRule, GAUSS_LEGENDRE_8};
use crate::math::{Point3, Vector3};
use crate::query::{
    BoundingBox, ClosestPoint, ClosestPointResult, DistanceSolver, Location, ParameterBounds,
    ParameterMapper,
};

/// A validated, immutable snapshot of a piecewise-polynomial path.
///
/// Built from a drawing-command stream; structural errors are surfaced at
/// build time. The numeric caches (cumulative length table, per-segment
/// sublength splines) are built lazily on first query and dropped together
/// on every rebuild, which also bumps the revision counter that
/// invalidates outstanding [`Location`] cursors.
///
/// Queries and rebuilds are single-threaded by contract: the caches use
/// plain cell types and the path is deliberately not `Sync`.
#[derive(Debug)]
pub struct Path {
    dimension: Dimension,
    config: PathConfig,
    commands: Vec<PathCommand>,
    segments: Vec<Segment>,
    closed: bool,
    revision: u64,
    lengths: OnceCell<CumulativeLengths>,
    splines: RefCell<Vec<Option<SublengthSpline>>>,
}

impl Path {
    /// Builds a path from a command stream.
    ///
    /// # Errors
    ///
    /// [`crate::error::StructureError`] for a malformed stream.
    pub fn build(
        dimension: Dimension,
        commands: impl IntoIterator<Item = PathCommand>,
        config: PathConfig,
    ) -> Result<Self> {
        let commands: Vec<PathCommand> = commands.into_iter().collect();
        let (segments, closed) = builder::assemble(&commands)?;
        let slots = vec![None; segments.len()];
        Ok(Self {
            dimension,
            config,
            commands,
            segments,
            closed,
            revision: 0,
            lengths: OnceCell::new(),
            splines: RefCell::new(slots),
        })
    }

    /// Re-validates the stored command stream and rebuilds the segment
    /// array, dropping every numeric cache and invalidating outstanding
    /// locations.
    ///
    /// Rebuilding is deterministic: with no intervening mutation the
    /// resulting segment and length arrays are identical.
    ///
    /// # Errors
    ///
    /// [`crate::error::StructureError`] for a malformed stream.
    pub fn refresh(&mut self) -> Result<()> {
        let (segments, closed) = builder::assemble(&self.commands)?;
        let slots = vec![None; segments.len()];
        self.segments = segments;
        self.closed = closed;
        self.lengths = OnceCell::new();
        self.splines = RefCell::new(slots);
        self.revision += 1;
        Ok(())
    }

    /// Replaces the command stream and rebuilds.
    ///
    /// # Errors
    ///
    /// [`crate::error::StructureError`] for a malformed stream.
    pub fn rebuild(&mut self, commands: impl IntoIterator<Item = PathCommand>) -> Result<()> {
        self.commands = commands.into_iter().collect();
        self.refresh()
    }

    /// Ambient dimension.
    #[must_use]
    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Numeric configuration.
    #[must_use]
    pub fn config(&self) -> &PathConfig {
        &self.config
    }

    /// Whether the path is cyclic.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number of segments.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// The ordered segment array.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub(crate) fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn quadrature(&self) -> &'static QuadratureRule {
        &GAUSS_LEGENDRE_8
    }

    /// Evaluator for segment `index`, wired with the predecessor segment
    /// when `index` is the closing edge of a cyclic path.
    ///
    /// # Errors
    ///
    /// [`QueryError::ParameterOutOfRange`] when the index is out of range.
    #[allow(clippy::cast_precision_loss)]
    pub fn segment_evaluator(&self, index: usize) -> Result<SegmentEvaluator> {
        let segment = self.segments.get(index).ok_or_else(|| {
            QueryError::ParameterOutOfRange {
                value: index as f64,
                max: self.segments.len() as f64,
            }
        })?;
        let predecessor = if segment.is_closing() && index > 0 {
            Some(self.segments[index - 1])
        } else {
            None
        };
        Ok(SegmentEvaluator::new(*segment, predecessor, self.dimension))
    }

    /// The lazily built cumulative length table.
    pub(crate) fn cumulative(&self) -> &CumulativeLengths {
        self.lengths
            .get_or_init(|| CumulativeLengths::build(&self.segments, self.quadrature()))
    }

    /// Runs `f` against the lazily built sublength spline of one segment.
    ///
    /// `f` must not trigger population of another segment's spline (the
    /// cache cell is borrowed for the duration of the call); the query
    /// layer only ever uses one spline at a time.
    pub(crate) fn with_sublength<R>(&self, index: usize, f: impl FnOnce(&SublengthSpline) -> R) -> R {
        {
            let mut slots = self.splines.borrow_mut();
            if slots[index].is_none() {
                let base = self.cumulative().base(index);
                slots[index] = Some(SublengthSpline::build(
                    &self.segments[index],
                    base,
                    self.config.intervals(),
                    self.quadrature(),
                ));
            }
        }
        let slots = self.splines.borrow();
        match &slots[index] {
            Some(spline) => f(spline),
            None => unreachable!("sublength spline was just built"),
        }
    }

    // ── length and distance queries ──

    /// Total arc length of the path.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.cumulative().total()
    }

    /// Signed arc length between two path parameters.
    ///
    /// # Errors
    ///
    /// [`QueryError::ParameterOutOfRange`] for open-path parameters
    /// outside the domain.
    pub fn distance(&self, u1: f64, u2: f64) -> Result<f64> {
        DistanceSolver::new(self).distance(u1, u2)
    }

    /// The path parameter at arc length `s` from the start.
    ///
    /// # Errors
    ///
    /// [`QueryError::LengthOutOfRange`] for open-path arc lengths outside
    /// `[0, length()]`.
    pub fn parameter_at_length(&self, s: f64) -> Result<f64> {
        DistanceSolver::new(self).parameter_at_length(s)
    }

    // ── pointwise queries by path parameter ──

    fn at(&self, u: f64) -> Result<(SegmentEvaluator, LocalParam)> {
        let (index, t) = ParameterMapper::new(self).decompose(u)?;
        Ok((self.segment_evaluator(index)?, LocalParam::new(t)))
    }

    /// Position at path parameter `u`.
    ///
    /// # Errors
    ///
    /// Domain errors for open-path parameters outside `[0, segment_count]`.
    pub fn position(&self, u: f64) -> Result<Point3> {
        let (evaluator, local) = self.at(u)?;
        Ok(evaluator.position(&local))
    }

    /// First derivative dP/dt at `u`.
    ///
    /// # Errors
    ///
    /// Domain errors as for [`Path::position`].
    pub fn velocity(&self, u: f64) -> Result<Vector3> {
        let (evaluator, local) = self.at(u)?;
        Ok(evaluator.velocity(&local))
    }

    /// Second derivative d²P/dt² at `u`.
    ///
    /// # Errors
    ///
    /// Domain errors as for [`Path::position`].
    pub fn acceleration(&self, u: f64) -> Result<Vector3> {
        let (evaluator, local) = self.at(u)?;
        Ok(evaluator.acceleration(&local))
    }

    /// Third derivative d³P/dt³ at `u`.
    ///
    /// # Errors
    ///
    /// Domain errors as for [`Path::position`].
    pub fn jerk(&self, u: f64) -> Result<Vector3> {
        let (evaluator, _) = self.at(u)?;
        Ok(evaluator.jerk())
    }

    /// Arc-length derivative ds/dt at `u`.
    ///
    /// # Errors
    ///
    /// Domain errors as for [`Path::position`].
    pub fn speed(&self, u: f64) -> Result<f64> {
        let (evaluator, local) = self.at(u)?;
        Ok(evaluator.speed(&local))
    }

    /// Second arc-length derivative d²s/dt² at `u`.
    ///
    /// # Errors
    ///
    /// Domain errors as for [`Path::position`].
    pub fn speed_derivative(&self, u: f64) -> Result<f64> {
        let (evaluator, local) = self.at(u)?;
        Ok(evaluator.speed_derivative(&local))
    }

    /// Unit tangent at `u`.
    ///
    /// # Errors
    ///
    /// Domain errors, or tangent nonexistence on a degenerate segment.
    pub fn tangent(&self, u: f64) -> Result<Vector3> {
        let (evaluator, local) = self.at(u)?;
        evaluator.tangent(&local)
    }

    /// Unit principal normal at `u`.
    ///
    /// # Errors
    ///
    /// Domain errors, or normal nonexistence.
    pub fn normal(&self, u: f64) -> Result<Vector3> {
        let (evaluator, local) = self.at(u)?;
        evaluator.normal(&local)
    }

    /// Binormal at `u`.
    ///
    /// # Errors
    ///
    /// Domain errors, or frame nonexistence.
    pub fn binormal(&self, u: f64) -> Result<Vector3> {
        let (evaluator, local) = self.at(u)?;
        evaluator.binormal(&local)
    }

    /// Curvature at `u`: signed in 2D, magnitude in 3D.
    ///
    /// # Errors
    ///
    /// Domain errors, or curvature nonexistence.
    pub fn curvature(&self, u: f64) -> Result<f64> {
        let (evaluator, local) = self.at(u)?;
        evaluator.curvature(&local)
    }

    /// Torsion at `u`.
    ///
    /// # Errors
    ///
    /// Domain errors, or torsion nonexistence where curvature vanishes.
    pub fn torsion(&self, u: f64) -> Result<f64> {
        let (evaluator, local) = self.at(u)?;
        evaluator.torsion(&local)
    }

    /// Whether the Frenet frame exists at `u`.
    ///
    /// # Errors
    ///
    /// Domain errors as for [`Path::position`].
    pub fn frame_defined(&self, u: f64) -> Result<bool> {
        let (evaluator, local) = self.at(u)?;
        Ok(evaluator.frame_defined(&local))
    }

    /// A cached cursor for repeated queries at path parameter `u`.
    ///
    /// # Errors
    ///
    /// Domain errors as for [`Path::position`].
    pub fn location(&self, u: f64) -> Result<Location> {
        ParameterMapper::new(self).locate(u)
    }

    /// A cached cursor at arc length `s`.
    ///
    /// # Errors
    ///
    /// Length-domain errors, then as for [`Path::location`].
    pub fn location_at_length(&self, s: f64) -> Result<Location> {
        let u = self.parameter_at_length(s)?;
        self.location(u)
    }

    // ── supplementary queries ──

    /// Polyline approximation of the whole path within `tolerance`.
    #[must_use]
    pub fn flatten(&self, tolerance: f64) -> Vec<Point3> {
        crate::query::flatten(self, tolerance)
    }

    /// Axis-aligned bounds of the exact curve, or `None` for an empty
    /// path.
    #[must_use]
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        ParameterBounds::new(self).execute()
    }

    /// Nearest point on the path to `point`.
    ///
    /// # Errors
    ///
    /// [`QueryError::ParameterOutOfRange`] for an empty path.
    pub fn closest_point(&self, point: &Point3) -> Result<ClosestPointResult> {
        ClosestPoint::new(self, *point).execute()
    }
}

impl fmt::Display for Path {
    /// Human-readable segment dump for diagnostics. Not part of the
    /// correctness contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dim = match self.dimension {
            Dimension::Two => "2d",
            Dimension::Three => "3d",
        };
        writeln!(
            f,
            "path: {} segment(s), {}, {dim}, length {:.6}",
            self.segments.len(),
            if self.closed { "closed" } else { "open" },
            self.length(),
        )?;
        for (i, segment) in self.segments.iter().enumerate() {
            let kind = match segment.kind() {
                SegmentKind::Line => "line",
                SegmentKind::Quad => "quad",
                SegmentKind::Cubic => "cubic",
            };
            write!(f, "  [{i}] {kind}")?;
            for p in segment.control_points() {
                write!(f, " ({:.6}, {:.6}, {:.6})", p.x, p.y, p.z)?;
            }
            write!(f, ", length {:.6}", self.cumulative().segment_length(i))?;
            if segment.is_closing() {
                write!(f, " (closing)")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
