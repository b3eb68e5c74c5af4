use thiserror::Error;

/// Top-level error type for the arclis path engine.
#[derive(Debug, Error)]
pub enum ArclisError {
    #[error(transparent)]
    Structure(#[from] StructureError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Query(#[from] QueryError),
}

/// Errors raised while assembling a path from a drawing-command stream.
///
/// These are fatal: a malformed stream is rejected at build time and is
/// never retried.
#[derive(Debug, Error)]
pub enum StructureError {
    #[error("drawing command before the initial move")]
    MissingInitialMove,

    #[error("move command after drawing began")]
    MoveAfterDraw,

    #[error("drawing command after the path was closed")]
    CommandAfterClose,
}

/// Errors raised by differential-geometric queries on a segment.
///
/// Each variant carries the local parameter at which the quantity failed
/// to exist; existence can be probed up front with
/// [`crate::geometry::SegmentEvaluator::frame_defined`].
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("tangent is undefined at t = {t}: all derivatives vanish")]
    UndefinedTangent { t: f64 },

    #[error("normal is undefined at t = {t}: curvature vanishes")]
    UndefinedNormal { t: f64 },

    #[error("curvature is undefined at t = {t}: velocity vanishes")]
    UndefinedCurvature { t: f64 },

    #[error("torsion is undefined at t = {t}: curvature vanishes")]
    UndefinedTorsion { t: f64 },
}

/// Errors raised by path-level parameter, length, and location queries.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("path parameter {value} is out of range [0, {max}]")]
    ParameterOutOfRange { value: f64, max: f64 },

    #[error("arc length {value} is out of range [0, {total}]")]
    LengthOutOfRange { value: f64, total: f64 },

    #[error("arc-length inversion failed to converge after {iterations} iterations")]
    NoConvergence { iterations: usize },

    #[error("stale location: built at revision {built}, path is at revision {current}")]
    StaleLocation { built: u64, current: u64 },
}

/// Convenience type alias for results using [`ArclisError`].
pub type Result<T> = std::result::Result<T, ArclisError>;
