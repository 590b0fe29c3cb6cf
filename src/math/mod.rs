//! Numerical kernels: the normal CDF, bracketed root finding,
//! sample statistics and seed streams.

pub mod rng;

use statrs::function::erf::erfc;
use std::f64::consts::SQRT_2;

#[derive(Debug, Clone, PartialEq)]
pub enum MathError {
    NonConvergence,
    /// `f(lo)` and `f(hi)` share a sign, so the interval holds no root.
    NotBracketed { f_lo: f64, f_hi: f64 },
    InvalidInput(&'static str),
}

impl std::fmt::Display for MathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonConvergence => write!(f, "root finder did not converge"),
            Self::NotBracketed { f_lo, f_hi } => {
                write!(f, "root not bracketed: f(lo)={f_lo:e}, f(hi)={f_hi:e}")
            }
            Self::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
        }
    }
}

impl std::error::Error for MathError {}

/// Standard normal CDF through `erfc`, accurate in both tails.
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

/// Brent's method on `[lo, hi]`.
///
/// Combines inverse quadratic interpolation, secant steps and bisection; the
/// iterate never leaves the current bracket, so convergence is guaranteed once
/// `f(lo)` and `f(hi)` differ in sign. Stops when the bracket is narrower than
/// `xtol` or `f` hits zero exactly.
pub fn brent_root<F>(f: F, lo: f64, hi: f64, xtol: f64, max_iter: usize) -> Result<f64, MathError>
where
    F: Fn(f64) -> f64,
{
    if xtol <= 0.0 {
        return Err(MathError::InvalidInput("xtol must be positive"));
    }
    if max_iter == 0 {
        return Err(MathError::InvalidInput("max_iter must be > 0"));
    }
    if lo.is_nan() || hi.is_nan() || lo >= hi {
        return Err(MathError::InvalidInput("lo must be < hi"));
    }

    let (mut a, mut b) = (lo, hi);
    let (mut fa, mut fb) = (f(a), f(b));
    if !fa.is_finite() || !fb.is_finite() {
        return Err(MathError::InvalidInput("objective must be finite at the bracket ends"));
    }
    if fa == 0.0 {
        return Ok(a);
    }
    if fb == 0.0 {
        return Ok(b);
    }
    if fa.signum() == fb.signum() {
        return Err(MathError::NotBracketed { f_lo: fa, f_hi: fb });
    }

    let mut c = a;
    let mut fc = fa;
    let mut d = b - a;
    let mut e = d;

    for _ in 0..max_iter {
        if fb.signum() == fc.signum() {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }

        let tol = 2.0 * f64::EPSILON * b.abs() + 0.5 * xtol;
        let m = 0.5 * (c - b);
        if m.abs() <= tol || fb == 0.0 {
            return Ok(b);
        }

        if e.abs() >= tol && fa.abs() > fb.abs() {
            let s = fb / fa;
            let (mut p, mut q) = if a == c {
                (2.0 * m * s, 1.0 - s)
            } else {
                let q = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * m * q * (q - r) - (b - a) * (r - 1.0)),
                    (q - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            } else {
                p = -p;
            }
            if 2.0 * p < (3.0 * m * q - (tol * q).abs()).min((e * q).abs()) {
                e = d;
                d = p / q;
            } else {
                d = m;
                e = m;
            }
        } else {
            d = m;
            e = m;
        }

        a = b;
        fa = fb;
        b += if d.abs() > tol { d } else { tol.copysign(m) };
        fb = f(b);
    }

    Err(MathError::NonConvergence)
}

/// Arithmetic mean; `None` for an empty sample.
pub fn mean(xs: &[f64]) -> Option<f64> {
    (!xs.is_empty()).then(|| xs.iter().sum::<f64>() / xs.len() as f64)
}

/// Unbiased sample standard deviation; zero for fewer than two points.
pub fn sample_std(xs: &[f64]) -> f64 {
    let n = xs.len();
    if n < 2 {
        return 0.0;
    }
    let m = xs.iter().sum::<f64>() / n as f64;
    let ss = xs.iter().map(|x| (x - m).powi(2)).sum::<f64>();
    (ss / (n as f64 - 1.0)).sqrt()
}

/// Pearson correlation of paired samples; `None` when undefined.
pub fn pearson_correlation<I>(pairs: I) -> Option<f64>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let (mut n, mut sx, mut sy, mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
    for (x, y) in pairs {
        n += 1.0;
        sx += x;
        sy += y;
        sxx += x * x;
        syy += y * y;
        sxy += x * y;
    }
    if n < 2.0 {
        return None;
    }
    let cov = sxy - sx * sy / n;
    let var_x = sxx - sx * sx / n;
    let var_y = syy - sy * sy / n;
    if var_x <= 0.0 || var_y <= 0.0 {
        return None;
    }
    Some(cov / (var_x * var_y).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn normal_cdf_sanity() {
        // statrs erfc is good to roughly 1e-11 near the centre.
        assert_relative_eq!(normal_cdf(0.0), 0.5, epsilon = 1e-14);
        assert_relative_eq!(normal_cdf(1.0), 0.841_344_746_068_543, epsilon = 1e-10);
        assert_relative_eq!(normal_cdf(-1.0), 0.158_655_253_931_457, epsilon = 1e-10);
        assert_relative_eq!(normal_cdf(-1.0), 1.0 - normal_cdf(1.0), epsilon = 1e-10);
        assert!(normal_cdf(-10.0) > 0.0 && normal_cdf(-10.0) < 1e-22);
    }

    #[test]
    fn brent_finds_sqrt_two() {
        let root = brent_root(|x| x * x - 2.0, 0.0, 2.0, 1e-14, 100).unwrap();
        assert_relative_eq!(root, 2.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn brent_handles_flat_then_steep_functions() {
        let root = brent_root(|x: f64| (x - 0.3).powi(3), -1.0, 4.0, 1e-12, 200).unwrap();
        assert!((root - 0.3).abs() < 1e-4);
    }

    #[test]
    fn brent_reports_missing_bracket() {
        let err = brent_root(|x| x * x + 1.0, -1.0, 1.0, 1e-12, 50).unwrap_err();
        assert!(matches!(err, MathError::NotBracketed { .. }));
        assert!(brent_root(|x| x, 1.0, -1.0, 1e-12, 50).is_err());
    }

    #[test]
    fn sample_statistics() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(mean(&xs).unwrap(), 2.5);
        assert!(mean(&[]).is_none());
        assert_relative_eq!(sample_std(&xs), (5.0_f64 / 3.0).sqrt(), epsilon = 1e-14);

        let perfect = xs.iter().map(|&x| (x, -2.0 * x + 1.0));
        assert_relative_eq!(pearson_correlation(perfect).unwrap(), -1.0, epsilon = 1e-12);
        assert!(pearson_correlation([(1.0, 2.0), (1.0, 3.0)]).is_none());
    }
}
