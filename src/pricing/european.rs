//! Closed-form Black-Scholes-Merton prices for European options.
//!
//! Used as the inversion target of the implied-volatility solver and as a
//! reference price in tests.

use crate::core::OptionType;
use crate::math::normal_cdf;

#[inline]
fn d1_d2(spot: f64, strike: f64, rate: f64, dividend_yield: f64, vol: f64, expiry: f64) -> (f64, f64) {
    let sig_sqrt_t = vol * expiry.sqrt();
    let d1 =
        ((spot / strike).ln() + (rate - dividend_yield + 0.5 * vol * vol) * expiry) / sig_sqrt_t;
    (d1, d1 - sig_sqrt_t)
}

/// Black-Scholes-Merton price with continuous dividend yield.
///
/// Edge cases:
/// - `expiry <= 0` returns the undiscounted intrinsic value.
/// - `vol <= 0` returns the discounted forward intrinsic value.
#[inline]
pub fn bs_price(
    option_type: OptionType,
    spot: f64,
    strike: f64,
    rate: f64,
    dividend_yield: f64,
    vol: f64,
    expiry: f64,
) -> f64 {
    if expiry <= 0.0 {
        return option_type.payoff(spot, strike);
    }
    let df_r = (-rate * expiry).exp();
    let df_q = (-dividend_yield * expiry).exp();
    if vol <= 0.0 {
        return option_type.payoff(spot * df_q, strike * df_r);
    }

    let (d1, d2) = d1_d2(spot, strike, rate, dividend_yield, vol, expiry);
    match option_type {
        OptionType::Call => spot * df_q * normal_cdf(d1) - strike * df_r * normal_cdf(d2),
        OptionType::Put => strike * df_r * normal_cdf(-d2) - spot * df_q * normal_cdf(-d1),
    }
}

/// Black-Scholes price with zero dividend yield.
///
/// # Examples
/// ```rust
/// use heston_smile::core::OptionType;
/// use heston_smile::pricing::european::black_scholes_price;
///
/// let call = black_scholes_price(OptionType::Call, 100.0, 100.0, 0.05, 0.20, 1.0);
/// let put = black_scholes_price(OptionType::Put, 100.0, 100.0, 0.05, 0.20, 1.0);
/// assert!(call > put);
/// ```
pub fn black_scholes_price(
    option_type: OptionType,
    s: f64,
    k: f64,
    r: f64,
    sigma: f64,
    t: f64,
) -> f64 {
    bs_price(option_type, s, k, r, 0.0, sigma, t)
}

/// Price range `(lower, upper)` reachable by some volatility in `[0, inf)`, zero dividend.
///
/// Lower is the discounted intrinsic value, upper is the spot for calls and the
/// discounted strike for puts.
pub fn no_arbitrage_bounds(option_type: OptionType, s: f64, k: f64, r: f64, t: f64) -> (f64, f64) {
    let df = (-r * t).exp();
    let lower = option_type.payoff(s, k * df);
    let upper = match option_type {
        OptionType::Call => s,
        OptionType::Put => k * df,
    };
    (lower, upper)
}
