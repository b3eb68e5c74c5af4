use crate::geometry::Segment;
use crate::math::quadrature::QuadratureRule;
use crate::math::summation::CompensatedSum;

use super::segment_length;

/// Compensated prefix sums of segment lengths.
///
/// `base(i)` is the total length of all segments strictly before `i`; the
/// table is non-decreasing, strictly increasing except across zero-length
/// segments.
#[derive(Debug, Clone, PartialEq)]
pub struct CumulativeLengths {
    // prefix[i] = length of segments 0..i; prefix.len() = segment count + 1
    prefix: Vec<f64>,
}

impl CumulativeLengths {
    /// Measures every segment and accumulates the prefix table.
    #[must_use]
    pub fn build(segments: &[Segment], rule: &QuadratureRule) -> Self {
        let mut prefix = Vec::with_capacity(segments.len() + 1);
        let mut sum = CompensatedSum::new();
        prefix.push(0.0);
        for segment in segments {
            sum.add(segment_length(segment, rule));
            prefix.push(sum.value());
        }
        Self { prefix }
    }

    /// Number of segments covered.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.prefix.len() - 1
    }

    /// Length of all segments strictly before `index`.
    #[must_use]
    pub fn base(&self, index: usize) -> f64 {
        self.prefix[index]
    }

    /// Length of segment `index`.
    #[must_use]
    pub fn segment_length(&self, index: usize) -> f64 {
        self.prefix[index + 1] - self.prefix[index]
    }

    /// Total path length.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.prefix.last().copied().unwrap_or(0.0)
    }

    /// Index of the segment whose length range contains arc length `s`.
    ///
    /// Picks the greatest index with `base(index) ≤ s`, then steps back
    /// over trailing zero-length segments so the returned segment can
    /// actually be inverted for `s` (relevant at `s == total()` and on
    /// all-degenerate paths).
    #[must_use]
    pub fn segment_containing(&self, s: f64) -> usize {
        let count = self.segment_count();
        if count == 0 {
            return 0;
        }
        let upper = self.prefix.partition_point(|&p| p <= s);
        let mut index = upper.saturating_sub(1).min(count - 1);
        while index > 0 && self.segment_length(index) <= 0.0 {
            index -= 1;
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::quadrature::GAUSS_LEGENDRE_8;
    use crate::math::Point3;

    fn pt(x: f64, y: f64) -> Point3 {
        Point3::new(x, y, 0.0)
    }

    fn unit_steps() -> CumulativeLengths {
        let segments = vec![
            Segment::line(pt(0.0, 0.0), pt(1.0, 0.0)),
            Segment::line(pt(1.0, 0.0), pt(1.0, 1.0)),
            Segment::line(pt(1.0, 1.0), pt(1.0, 2.0)),
        ];
        CumulativeLengths::build(&segments, &GAUSS_LEGENDRE_8)
    }

    const TOL: f64 = 1e-12;

    #[test]
    fn prefix_values() {
        let table = unit_steps();
        assert_eq!(table.segment_count(), 3);
        assert!(table.base(0).abs() < TOL);
        assert!((table.base(1) - 1.0).abs() < TOL);
        assert!((table.base(2) - 2.0).abs() < TOL);
        assert!((table.total() - 3.0).abs() < TOL);
        assert!((table.segment_length(1) - 1.0).abs() < TOL);
    }

    #[test]
    fn bracketing_by_arc_length() {
        let table = unit_steps();
        assert_eq!(table.segment_containing(0.0), 0);
        assert_eq!(table.segment_containing(0.5), 0);
        assert_eq!(table.segment_containing(1.0), 1);
        assert_eq!(table.segment_containing(2.5), 2);
        // At the very end, the last segment is still the answer.
        assert_eq!(table.segment_containing(3.0), 2);
    }

    #[test]
    fn skips_trailing_zero_length_segment() {
        let segments = vec![
            Segment::line(pt(0.0, 0.0), pt(1.0, 0.0)),
            Segment::line(pt(1.0, 0.0), pt(1.0, 0.0)),
        ];
        let table = CumulativeLengths::build(&segments, &GAUSS_LEGENDRE_8);
        assert_eq!(table.segment_containing(1.0), 0);
    }

    #[test]
    fn empty_table() {
        let table = CumulativeLengths::build(&[], &GAUSS_LEGENDRE_8);
        assert!(table.total().abs() < TOL);
        assert_eq!(table.segment_containing(0.0), 0);
    }
}
