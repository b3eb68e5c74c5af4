use crate::error::{QueryError, Result};
use crate::length::arc_length_between;
use crate::math::roots::{brent, newton_bracketed};
use crate::math::summation::CompensatedSum;
use crate::math::PARAM_EPSILON;
use crate::path::Path;

use super::ParameterMapper;

/// Floor applied to the inversion tolerance when it feeds an iterative
/// solver, so a zero tolerance still terminates.
const SOLVER_TOLERANCE_FLOOR: f64 = 1e-14;

/// Forward (u → s) and inverse (s → u) arc-length mapping on a path.
///
/// Partial lengths go through the cached sublength splines by default, or
/// through direct re-integration of the analytic length formula in
/// enhanced-accuracy mode. The two pathways are distinct numeric modes; no
/// tolerance contract ties them together.
pub struct DistanceSolver<'a> {
    path: &'a Path,
}

impl<'a> DistanceSolver<'a> {
    /// Binds a solver to a path.
    #[must_use]
    pub fn new(path: &'a Path) -> Self {
        Self { path }
    }

    /// Signed arc length from parameter `u1` to parameter `u2`.
    ///
    /// Antisymmetric by construction: `distance(a, b) == -distance(b, a)`.
    /// On closed paths, spans exceeding one cycle contribute whole-lap
    /// multiples of the total length; the sub-cycle remainder decomposes
    /// into a leading-segment tail, whole interior segments taken from the
    /// cumulative table, and a trailing-segment head, all summed with
    /// compensation.
    ///
    /// # Errors
    ///
    /// [`QueryError::ParameterOutOfRange`] for open-path parameters
    /// outside `[0, segment_count]`.
    pub fn distance(&self, u1: f64, u2: f64) -> Result<f64> {
        if u2 < u1 {
            return Ok(-self.forward_distance(u2, u1)?);
        }
        self.forward_distance(u1, u2)
    }

    #[allow(clippy::cast_precision_loss)]
    fn forward_distance(&self, u1: f64, u2: f64) -> Result<f64> {
        let count = self.path.segment_count();
        let mapper = ParameterMapper::new(self.path);
        let (i1, t1) = mapper.decompose(u1)?;
        let (i2, t2) = mapper.decompose(u2)?;
        let count_f = count as f64;
        let span = u2 - u1;

        let mut sum = CompensatedSum::new();
        let remainder;
        if self.path.is_closed() {
            let laps = (span / count_f).floor();
            if laps > 0.0 {
                sum.add(laps * self.path.length());
            }
            remainder = span - laps * count_f;
        } else {
            remainder = span;
        }

        // Segment boundaries crossed by the sub-cycle remainder walk.
        let crossed = if self.path.is_closed() {
            let wrapped = (i2 + count - i1) % count;
            if wrapped == 0 && remainder > PARAM_EPSILON && (t2 < t1 || remainder >= 1.0) {
                // The walk goes all the way around back into the segment
                // it started in.
                count
            } else {
                wrapped
            }
        } else {
            i2 - i1
        };

        if crossed == 0 {
            sum.add(self.partial(i1, t1, t2));
        } else {
            // Leading tail, whole interior segments, trailing head.
            sum.add(self.partial(i1, t1, 1.0));
            sum.add(self.interior_length(i1 + 1, i1 + crossed));
            let head_index = (i1 + crossed) % count.max(1);
            sum.add(self.partial(head_index, 0.0, t2));
        }
        Ok(sum.value())
    }

    /// Length of the whole segments `[from, to)` in unwrapped indices
    /// (`to` may run past the seam of a closed path), as cumulative-table
    /// differences split at the seam.
    fn interior_length(&self, from: usize, to: usize) -> f64 {
        if to <= from {
            return 0.0;
        }
        let cumulative = self.path.cumulative();
        let count = cumulative.segment_count();
        if to <= count {
            cumulative.base(to) - cumulative.base(from)
        } else {
            (cumulative.total() - cumulative.base(from)) + cumulative.base(to - count)
        }
    }

    /// Arc length of segment `index` between local parameters `ta ≤ tb`,
    /// via the cached spline or, in enhanced-accuracy mode, direct
    /// re-integration.
    fn partial(&self, index: usize, ta: f64, tb: f64) -> f64 {
        if tb <= ta {
            return 0.0;
        }
        if self.path.config().enhanced_accuracy() {
            arc_length_between(
                &self.path.segments()[index],
                ta,
                tb,
                self.path.quadrature(),
            )
        } else {
            self.path
                .with_sublength(index, |spline| spline.value(tb) - spline.value(ta))
        }
    }

    /// The path parameter at arc length `s` from the path start.
    ///
    /// Locates the bracketing segment by bisecting the cumulative table,
    /// then inverts that segment's sublength spline through the fallback
    /// chain: interval cubic solve, Newton refinement against the exact
    /// integral (enhanced mode), Brent's method on the spline value, and
    /// finally an endpoint snap. On closed paths, `s` reduces modulo the
    /// total length and the returned parameter carries the lap offset;
    /// negative `s` walks backwards.
    ///
    /// # Errors
    ///
    /// [`QueryError::LengthOutOfRange`] for an empty path, a zero-length
    /// closed path, or an open-path `s` outside `[0, length]` beyond the
    /// inversion tolerance.
    #[allow(clippy::cast_precision_loss)]
    pub fn parameter_at_length(&self, s: f64) -> Result<f64> {
        let count = self.path.segment_count();
        let total = self.path.length();
        if count == 0 {
            return Err(QueryError::LengthOutOfRange {
                value: s,
                total: 0.0,
            }
            .into());
        }
        let tolerance = self.path.config().inversion_tolerance();
        let (laps, rem) = if self.path.is_closed() {
            if total <= 0.0 {
                return Err(QueryError::LengthOutOfRange { value: s, total }.into());
            }
            let laps = (s / total).floor();
            (laps, s - laps * total)
        } else {
            if s < -tolerance || s > total + tolerance {
                return Err(QueryError::LengthOutOfRange { value: s, total }.into());
            }
            (0.0, s.clamp(0.0, total))
        };
        let index = self.path.cumulative().segment_containing(rem);
        let t = self.invert_segment(index, rem);
        Ok(laps * count as f64 + index as f64 + t)
    }

    /// Inverts one segment's arc length for the local parameter, running
    /// the fallback chain. Infallible: the final endpoint snap always
    /// produces a parameter (acceptable only within numerical noise of a
    /// segment boundary, which is the only way the earlier steps can all
    /// fail).
    fn invert_segment(&self, index: usize, target: f64) -> f64 {
        let tolerance = self.path.config().inversion_tolerance();
        let solver_tolerance = tolerance.max(SOLVER_TOLERANCE_FLOOR);

        // 1. Cubic inversion of the bracketing spline interval.
        let estimate = self
            .path
            .with_sublength(index, |spline| spline.invert(target, tolerance));

        // 2. Enhanced accuracy: refine against the exact arc-length
        //    integral, bracketed by the knots surrounding the target.
        if self.path.config().enhanced_accuracy() {
            let (lo, hi) = self
                .path
                .with_sublength(index, |spline| spline.bracketing_knots(target));
            let seed = estimate.unwrap_or(0.5 * (lo + hi));
            let segment = &self.path.segments()[index];
            let base = self.path.cumulative().base(index);
            let rule = self.path.quadrature();
            let refined = newton_bracketed(
                |t| base + arc_length_between(segment, 0.0, t, rule) - target,
                |t| segment.speed(&crate::geometry::LocalParam::new(t)),
                seed,
                lo,
                hi,
                solver_tolerance,
            );
            if let Some(t) = refined {
                return t.clamp(0.0, 1.0);
            }
        }

        if let Some(t) = estimate {
            return t;
        }

        // 3. Brent's method over the whole segment on the monotone spline
        //    value; handles intervals where ds/dt ≈ 0 makes the cubic
        //    ill-conditioned.
        let fallback = self.path.with_sublength(index, |spline| {
            brent(|t| spline.value(t) - target, 0.0, 1.0, solver_tolerance)
        });
        if let Some(t) = fallback {
            return t.clamp(0.0, 1.0);
        }

        // 4. Endpoint snap.
        self.path.with_sublength(index, |spline| {
            if (spline.start_value() - target).abs() <= (spline.end_value() - target).abs() {
                0.0
            } else {
                1.0
            }
        })
    }
}
