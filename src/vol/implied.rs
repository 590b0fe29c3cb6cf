//! Black-Scholes implied-volatility inversion.
//!
//! The scalar solver checks no-arbitrage bounds first, snaps prices sitting on
//! intrinsic to zero volatility, then runs Brent's method on a fixed bracket.
//! [`implied_vols`] applies it across a strike grid under a [`SolveMode`].

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::Serialize;

use crate::core::{OptionType, SmileError, SmileResult, SolveMode};
use crate::math::{MathError, brent_root};
use crate::pricing::european::{black_scholes_price, no_arbitrage_bounds};

/// Lower end of the volatility search bracket.
pub const VOL_LOWER: f64 = 1e-6;
/// Upper end of the volatility search bracket.
pub const VOL_UPPER: f64 = 5.0;
/// Absolute volatility tolerance.
pub const VOL_TOL: f64 = 1e-12;
const MAX_ITER: usize = 200;

/// Outcome of one inversion in a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImpliedVolResult {
    Solved { vol: f64 },
    Unsolved { reason: String },
}

impl ImpliedVolResult {
    pub fn vol(&self) -> Option<f64> {
        match self {
            Self::Solved { vol } => Some(*vol),
            Self::Unsolved { .. } => None,
        }
    }

    pub fn is_solved(&self) -> bool {
        matches!(self, Self::Solved { .. })
    }
}

/// Volatility `sigma >= 0` at which the zero-dividend Black-Scholes price equals `price`.
///
/// # Errors
/// - `InvalidConfiguration` when `s`, `k` or `t` is non-positive, or any of `s, k, r, t`
///   is non-finite.
/// - `ImpliedVolUnsolvable` when `price` is not finite, lies outside
///   `[intrinsic, upper]`, or is matched only by a volatility outside
///   `[VOL_LOWER, VOL_UPPER]`.
///
/// # Examples
/// ```
/// use heston_smile::core::OptionType;
/// use heston_smile::pricing::european::black_scholes_price;
/// use heston_smile::vol::implied::implied_vol;
///
/// let price = black_scholes_price(OptionType::Call, 100.0, 100.0, 0.03, 0.25, 1.0);
/// let iv = implied_vol(OptionType::Call, 100.0, 100.0, 0.03, 1.0, price).unwrap();
/// assert!((iv - 0.25).abs() < 1e-8);
/// ```
pub fn implied_vol(
    option_type: OptionType,
    s: f64,
    k: f64,
    r: f64,
    t: f64,
    price: f64,
) -> SmileResult<f64> {
    if !s.is_finite() || !k.is_finite() || !r.is_finite() || !t.is_finite() {
        return Err(SmileError::InvalidConfiguration(
            "implied-vol inputs must be finite".to_string(),
        ));
    }
    if s <= 0.0 || k <= 0.0 || t <= 0.0 {
        return Err(SmileError::InvalidConfiguration(format!(
            "implied vol needs s, k and t > 0, got s={s} k={k} t={t}"
        )));
    }
    let unsolvable = |reason: String| SmileError::ImpliedVolUnsolvable { strike: k, reason };
    if !price.is_finite() {
        return Err(unsolvable(format!("price is not finite: {price}")));
    }

    let (intrinsic, upper) = no_arbitrage_bounds(option_type, s, k, r, t);
    let price_tol = 32.0 * f64::EPSILON * (1.0 + upper.abs());
    if price < intrinsic - price_tol {
        return Err(unsolvable(format!(
            "price {price} below intrinsic value {intrinsic}"
        )));
    }
    if price > upper + price_tol {
        return Err(unsolvable(format!("price {price} above upper bound {upper}")));
    }
    if price <= intrinsic + price_tol {
        return Ok(0.0);
    }

    let objective = |sigma: f64| black_scholes_price(option_type, s, k, r, sigma, t) - price;
    brent_root(objective, VOL_LOWER, VOL_UPPER, VOL_TOL, MAX_ITER).map_err(|e| match e {
        MathError::NotBracketed { f_lo, .. } if f_lo > 0.0 => {
            unsolvable(format!("implied volatility below {VOL_LOWER}"))
        }
        MathError::NotBracketed { .. } => {
            unsolvable(format!("implied volatility above {VOL_UPPER}"))
        }
        other => unsolvable(other.to_string()),
    })
}

/// Inverts `prices[i]` at `strikes[i]` for every strike, in strike order.
///
/// In [`SolveMode::Strict`] the first unsolvable strike fails the batch with
/// `ImpliedVolUnsolvable`. In [`SolveMode::Permissive`] it becomes an
/// [`ImpliedVolResult::Unsolved`] marker and the rest of the batch is kept.
///
/// # Errors
/// `InvalidConfiguration` on mismatched lengths, `s0 <= 0` or `t <= 0`.
pub fn implied_vols(
    prices: &[f64],
    s0: f64,
    strikes: &[f64],
    t: f64,
    r: f64,
    option_type: OptionType,
    mode: SolveMode,
) -> SmileResult<Vec<ImpliedVolResult>> {
    if prices.len() != strikes.len() {
        return Err(SmileError::InvalidConfiguration(format!(
            "{} prices for {} strikes",
            prices.len(),
            strikes.len()
        )));
    }
    if !s0.is_finite() || s0 <= 0.0 || !t.is_finite() || t <= 0.0 {
        return Err(SmileError::InvalidConfiguration(format!(
            "implied vols need finite s0 > 0 and t > 0, got s0={s0} t={t}"
        )));
    }

    let solve = |(&price, &k): (&f64, &f64)| implied_vol(option_type, s0, k, r, t, price);
    #[cfg(feature = "parallel")]
    let solved: Vec<SmileResult<f64>> = prices.par_iter().zip(strikes.par_iter()).map(solve).collect();
    #[cfg(not(feature = "parallel"))]
    let solved: Vec<SmileResult<f64>> = prices.iter().zip(strikes.iter()).map(solve).collect();

    let mut out = Vec::with_capacity(solved.len());
    for outcome in solved {
        match (outcome, mode) {
            (Ok(vol), _) => out.push(ImpliedVolResult::Solved { vol }),
            (Err(e @ SmileError::ImpliedVolUnsolvable { .. }), SolveMode::Strict) => return Err(e),
            (Err(SmileError::ImpliedVolUnsolvable { strike, reason }), SolveMode::Permissive) => {
                tracing::warn!(strike, ?option_type, %reason, "implied vol unsolved");
                out.push(ImpliedVolResult::Unsolved { reason });
            }
            (Err(e), _) => return Err(e),
        }
    }

    tracing::debug!(
        ?option_type,
        ?mode,
        n_strikes = out.len(),
        unsolved = out.iter().filter(|r| !r.is_solved()).count(),
        "solved implied vols"
    );
    Ok(out)
}
