//! Polynomial and general root finding.
//!
//! The arc-length inversion cascade is built from these pieces: the cubic
//! solver inverts one spline interval, and the bracketed Newton and Brent
//! iterations back it up when the cubic is ill-conditioned. Every routine
//! is bounded and reports failure through its return value; none of them
//! can loop indefinitely.

use arrayvec::ArrayVec;

/// Iteration bound for [`brent`].
pub const BRENT_MAX_ITERATIONS: usize = 100;

/// Iteration bound for [`newton_bracketed`].
pub const NEWTON_MAX_ITERATIONS: usize = 32;

/// Finds the real roots of `c0 + c1·x + c2·x² = 0`.
///
/// Nearly linear equations fall back to the linear root (the other root is
/// out of representable range). The root pair is computed from the stable
/// quadratic form, avoiding cancellation between `-c1` and the square root.
#[must_use]
pub fn solve_quadratic(c0: f64, c1: f64, c2: f64) -> ArrayVec<f64, 2> {
    let mut result = ArrayVec::new();
    let scaled_c0 = c0 / c2;
    let scaled_c1 = c1 / c2;
    if !scaled_c0.is_finite() || !scaled_c1.is_finite() {
        // c2 is zero or nearly so; treat as the linear equation c0 + c1·x = 0.
        let root = -c0 / c1;
        if root.is_finite() {
            result.push(root);
        } else if c0 == 0.0 && c1 == 0.0 {
            result.push(0.0);
        }
        return result;
    }
    let discriminant = scaled_c1 * scaled_c1 - 4.0 * scaled_c0;
    let root1 = if discriminant.is_finite() {
        if discriminant < 0.0 {
            return result;
        } else if discriminant == 0.0 {
            result.push(-0.5 * scaled_c1);
            return result;
        }
        -0.5 * (scaled_c1 + discriminant.sqrt().copysign(scaled_c1))
    } else {
        // scaled_c1² overflowed; one root is ≈ -scaled_c1, the other follows
        // from the product of roots.
        -scaled_c1
    };
    let root2 = scaled_c0 / root1;
    if root2.is_finite() {
        if root2 > root1 {
            result.push(root1);
            result.push(root2);
        } else {
            result.push(root2);
            result.push(root1);
        }
    } else {
        result.push(root1);
    }
    result
}

/// Finds the real roots of `c0 + c1·x + c2·x² + c3·x³ = 0`.
///
/// Uses the depressed-cubic discriminant split (one real root for negative
/// discriminant, a double root at zero, three real roots otherwise); a
/// vanishing leading coefficient falls back to [`solve_quadratic`].
#[must_use]
#[allow(clippy::many_single_char_names)]
pub fn solve_cubic(c0: f64, c1: f64, c2: f64, c3: f64) -> ArrayVec<f64, 3> {
    let mut result = ArrayVec::new();
    const ONE_THIRD: f64 = 1.0 / 3.0;
    let recip = c3.recip();
    let b2 = c2 * (ONE_THIRD * recip);
    let b1 = c1 * (ONE_THIRD * recip);
    let b0 = c0 * recip;
    if !(b0.is_finite() && b1.is_finite() && b2.is_finite()) {
        // Leading coefficient is zero or nearly so.
        for root in solve_quadratic(c0, c1, c2) {
            result.push(root);
        }
        return result;
    }
    // Hessian-style invariants of the depressed cubic.
    let d0 = (-b2).mul_add(b2, b1);
    let d1 = (-b1).mul_add(b2, b0);
    let d2 = b2 * b0 - b1 * b1;
    let discriminant = 4.0 * d0 * d2 - d1 * d1;
    let depressed = (-2.0 * b2).mul_add(d0, d1);
    if discriminant < 0.0 {
        let sq = (-0.25 * discriminant).sqrt();
        let r = -0.5 * depressed;
        let root = (r + sq).cbrt() + (r - sq).cbrt();
        result.push(root - b2);
    } else if discriminant == 0.0 {
        let root = (-d0).sqrt().copysign(depressed);
        result.push(root - b2);
        result.push(-2.0 * root - b2);
    } else {
        let theta = discriminant.sqrt().atan2(-depressed) * ONE_THIRD;
        let (sin, cos) = theta.sin_cos();
        let offset = sin * 3.0_f64.sqrt();
        let scale = 2.0 * (-d0).sqrt();
        result.push(scale.mul_add(cos, -b2));
        result.push(scale.mul_add(0.5 * (-cos + offset), -b2));
        result.push(scale.mul_add(0.5 * (-cos - offset), -b2));
    }
    result
}

/// Newton's method constrained to the bracket `[lo, hi]`.
///
/// Steps that leave the bracket are clamped back onto it. Converges when
/// the residual drops below `tolerance` or the step collapses; returns
/// `None` after [`NEWTON_MAX_ITERATIONS`] without convergence, or when the
/// derivative degenerates.
pub fn newton_bracketed(
    f: impl Fn(f64) -> f64,
    df: impl Fn(f64) -> f64,
    seed: f64,
    lo: f64,
    hi: f64,
    tolerance: f64,
) -> Option<f64> {
    let mut x = seed.clamp(lo, hi);
    for _ in 0..NEWTON_MAX_ITERATIONS {
        let fx = f(x);
        if fx.abs() <= tolerance {
            return Some(x);
        }
        let dx = df(x);
        if !dx.is_finite() || dx.abs() < f64::EPSILON {
            return None;
        }
        let next = (x - fx / dx).clamp(lo, hi);
        if (next - x).abs() <= f64::EPSILON * x.abs().max(1.0) {
            // Step collapsed against the bracket without meeting the
            // residual tolerance.
            return None;
        }
        x = next;
    }
    None
}

/// Brent–Dekker root finding on `[a, b]`.
///
/// Requires `f(a)` and `f(b)` to bracket a sign change; returns `None`
/// otherwise, or after [`BRENT_MAX_ITERATIONS`] without the interval
/// shrinking below `tolerance`.
#[allow(clippy::many_single_char_names, clippy::similar_names)]
pub fn brent(f: impl Fn(f64) -> f64, a: f64, b: f64, tolerance: f64) -> Option<f64> {
    let mut a = a;
    let mut b = b;
    let mut fa = f(a);
    let mut fb = f(b);
    if fa == 0.0 {
        return Some(a);
    }
    if fb == 0.0 {
        return Some(b);
    }
    if fa.signum() == fb.signum() {
        return None;
    }
    if fa.abs() < fb.abs() {
        std::mem::swap(&mut a, &mut b);
        std::mem::swap(&mut fa, &mut fb);
    }
    let mut c = a;
    let mut fc = fa;
    let mut d = b - a;
    let mut bisected = true;
    for _ in 0..BRENT_MAX_ITERATIONS {
        if fb == 0.0 || (b - a).abs() < tolerance {
            return Some(b);
        }
        let mut s = if fa != fc && fb != fc {
            // Inverse quadratic interpolation.
            a * fb * fc / ((fa - fb) * (fa - fc))
                + b * fa * fc / ((fb - fa) * (fb - fc))
                + c * fa * fb / ((fc - fa) * (fc - fb))
        } else {
            // Secant step.
            b - fb * (b - a) / (fb - fa)
        };
        let lo = 0.25 * (3.0 * a + b);
        let out_of_range = !((s > lo.min(b)) && (s < lo.max(b)));
        let slow_progress = if bisected {
            (s - b).abs() >= 0.5 * (b - c).abs() || (b - c).abs() < tolerance
        } else {
            (s - b).abs() >= 0.5 * (c - d).abs() || (c - d).abs() < tolerance
        };
        if out_of_range || slow_progress {
            s = 0.5 * (a + b);
            bisected = true;
        } else {
            bisected = false;
        }
        let fs = f(s);
        d = c;
        c = b;
        fc = fb;
        if fa.signum() == fs.signum() {
            a = s;
            fa = fs;
        } else {
            b = s;
            fb = fs;
        }
        if fa.abs() < fb.abs() {
            std::mem::swap(&mut a, &mut b);
            std::mem::swap(&mut fa, &mut fb);
        }
    }
    None
}
