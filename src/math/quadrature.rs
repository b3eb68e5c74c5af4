//! Fixed-order Gauss–Legendre quadrature.
//!
//! The coefficient table is precomputed once and shared by reference across
//! all path instances; there is no mutable global state.

/// A Gauss–Legendre rule on `[-1, 1]`, stored as `(weight, abscissa)` pairs.
#[derive(Debug, Clone, Copy)]
pub struct QuadratureRule {
    coefficients: &'static [(f64, f64)],
}

/// Eight-point Gauss–Legendre rule, exact for polynomials up to degree 15.
///
/// Coefficients adapted from the Legendre–Gauss tables at
/// <https://pomax.github.io/bezierinfo/legendre-gauss.html>.
pub const GAUSS_LEGENDRE_8: QuadratureRule = QuadratureRule {
    coefficients: &[
        (0.362_683_783_378_362, -0.183_434_642_495_649_8),
        (0.362_683_783_378_362, 0.183_434_642_495_649_8),
        (0.313_706_645_877_887_3, -0.525_532_409_916_329),
        (0.313_706_645_877_887_3, 0.525_532_409_916_329),
        (0.222_381_034_453_374_5, -0.796_666_477_413_626_7),
        (0.222_381_034_453_374_5, 0.796_666_477_413_626_7),
        (0.101_228_536_290_376_3, -0.960_289_856_497_536_3),
        (0.101_228_536_290_376_3, 0.960_289_856_497_536_3),
    ],
};

impl QuadratureRule {
    /// Number of evaluation points in the rule.
    #[must_use]
    pub fn order(&self) -> usize {
        self.coefficients.len()
    }

    /// Integrates `f` over `[a, b]` by mapping the rule onto the interval.
    #[must_use]
    pub fn integrate(&self, a: f64, b: f64, f: impl Fn(f64) -> f64) -> f64 {
        let half = 0.5 * (b - a);
        let mid = 0.5 * (a + b);
        let sum: f64 = self
            .coefficients
            .iter()
            .map(|&(weight, abscissa)| weight * f(mid + half * abscissa))
            .sum();
        half * sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn weights_sum_to_two() {
        let total: f64 = GAUSS_LEGENDRE_8
            .coefficients
            .iter()
            .map(|&(w, _)| w)
            .sum();
        assert!((total - 2.0).abs() < TOL, "total = {total}");
    }

    #[test]
    fn integrates_constant() {
        let v = GAUSS_LEGENDRE_8.integrate(0.0, 3.0, |_| 2.0);
        assert!((v - 6.0).abs() < TOL, "v = {v}");
    }

    #[test]
    fn integrates_cubic_exactly() {
        // ∫₀¹ x³ dx = 1/4
        let v = GAUSS_LEGENDRE_8.integrate(0.0, 1.0, |x| x * x * x);
        assert!((v - 0.25).abs() < TOL, "v = {v}");
    }

    #[test]
    fn integrates_degree_fifteen_exactly() {
        // Eight points are exact through degree 2n-1 = 15: ∫₀¹ x¹⁵ dx = 1/16.
        let v = GAUSS_LEGENDRE_8.integrate(0.0, 1.0, |x| x.powi(15));
        assert!((v - 0.0625).abs() < TOL, "v = {v}");
    }

    #[test]
    fn reversed_interval_negates() {
        let forward = GAUSS_LEGENDRE_8.integrate(0.0, 1.0, |x| x);
        let backward = GAUSS_LEGENDRE_8.integrate(1.0, 0.0, |x| x);
        assert!((forward + backward).abs() < TOL);
    }
}
