/// Default number of sublength-spline knots per segment.
pub const DEFAULT_INTERVALS: usize = 64;

/// Minimum number of sublength-spline knots per segment.
pub const MIN_INTERVALS: usize = 5;

/// Default tolerance for accepting arc-length inversion roots.
pub const DEFAULT_INVERSION_TOLERANCE: f64 = 1e-9;

/// Per-path numeric configuration, fixed at build time.
///
/// The configuration is an immutable value object: changing it means
/// building a new path, so there is no shared default to guard against
/// concurrent swaps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathConfig {
    intervals: usize,
    inversion_tolerance: f64,
    enhanced_accuracy: bool,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            intervals: DEFAULT_INTERVALS,
            inversion_tolerance: DEFAULT_INVERSION_TOLERANCE,
            enhanced_accuracy: false,
        }
    }
}

impl PathConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of evenly spaced knots used when fitting each
    /// segment's sublength spline, clamped to [`MIN_INTERVALS`].
    #[must_use]
    pub fn with_intervals(mut self, intervals: usize) -> Self {
        self.intervals = intervals.max(MIN_INTERVALS);
        self
    }

    /// Sets the arc-length inversion tolerance. A negative value selects
    /// the library default [`DEFAULT_INVERSION_TOLERANCE`].
    #[must_use]
    pub fn with_inversion_tolerance(mut self, tolerance: f64) -> Self {
        self.inversion_tolerance = if tolerance < 0.0 {
            DEFAULT_INVERSION_TOLERANCE
        } else {
            tolerance
        };
        self
    }

    /// Selects between the cached-spline pathway (false, the default) and
    /// direct re-integration of the analytic length formula (true) for
    /// partial-length evaluation and inversion refinement.
    ///
    /// The two pathways are distinct numeric modes, not interchangeable
    /// approximations of one another.
    #[must_use]
    pub fn with_enhanced_accuracy(mut self, enhanced: bool) -> Self {
        self.enhanced_accuracy = enhanced;
        self
    }

    /// Number of sublength-spline knots per segment.
    #[must_use]
    pub fn intervals(&self) -> usize {
        self.intervals
    }

    /// Arc-length inversion tolerance.
    #[must_use]
    pub fn inversion_tolerance(&self) -> f64 {
        self.inversion_tolerance
    }

    /// Whether enhanced-accuracy (re-integration) mode is active.
    #[must_use]
    pub fn enhanced_accuracy(&self) -> bool {
        self.enhanced_accuracy
    }
}
