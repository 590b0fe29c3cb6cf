//! Discounted Monte Carlo prices of European calls and puts from simulated terminal prices.

use ndarray::ArrayView1;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::Serialize;

use crate::core::{OptionType, SmileError, SmileResult};

/// Discounted payoff mean at one strike, with its Monte Carlo standard error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceQuote {
    pub strike: f64,
    pub price: f64,
    pub stderr: f64,
}

/// Call and put quotes, both in strike order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct OptionQuotes {
    pub calls: Vec<PriceQuote>,
    pub puts: Vec<PriceQuote>,
}

impl OptionQuotes {
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn call_prices(&self) -> Vec<f64> {
        self.calls.iter().map(|q| q.price).collect()
    }

    pub fn put_prices(&self) -> Vec<f64> {
        self.puts.iter().map(|q| q.price).collect()
    }
}

/// Prices a call and a put at every strike as `exp(-rT) * mean(payoff(S_T))`.
///
/// # Errors
/// `InvalidConfiguration` for an empty terminal sample, `t` not finite and > 0,
/// or a non-finite `r`. An empty strike list yields empty quotes.
pub fn price_options(
    terminal: ArrayView1<'_, f64>,
    strikes: &[f64],
    r: f64,
    t: f64,
) -> SmileResult<OptionQuotes> {
    if terminal.is_empty() {
        return Err(SmileError::InvalidConfiguration(
            "terminal price sample is empty".to_string(),
        ));
    }
    if !t.is_finite() || t <= 0.0 {
        return Err(SmileError::InvalidConfiguration(format!(
            "maturity must be finite and > 0, got {t}"
        )));
    }
    if !r.is_finite() {
        return Err(SmileError::InvalidConfiguration(format!(
            "rate must be finite, got {r}"
        )));
    }

    let discount_factor = (-r * t).exp();
    let price_strike = |&strike: &f64| {
        (
            quote(terminal, OptionType::Call, strike, discount_factor),
            quote(terminal, OptionType::Put, strike, discount_factor),
        )
    };

    #[cfg(feature = "parallel")]
    let (calls, puts) = strikes.par_iter().map(price_strike).unzip();
    #[cfg(not(feature = "parallel"))]
    let (calls, puts) = strikes.iter().map(price_strike).unzip();

    tracing::debug!(
        n_strikes = strikes.len(),
        n_paths = terminal.len(),
        "priced european options"
    );
    Ok(OptionQuotes { calls, puts })
}

fn quote(
    terminal: ArrayView1<'_, f64>,
    option_type: OptionType,
    strike: f64,
    discount_factor: f64,
) -> PriceQuote {
    let n = terminal.len() as f64;
    let mean = terminal.iter().map(|&s| option_type.payoff(s, strike)).sum::<f64>() / n;
    let var = if terminal.len() > 1 {
        terminal
            .iter()
            .map(|&s| (option_type.payoff(s, strike) - mean).powi(2))
            .sum::<f64>()
            / (n - 1.0)
    } else {
        0.0
    };

    PriceQuote {
        strike,
        price: discount_factor * mean,
        stderr: discount_factor * (var / n).sqrt(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{Array1, array};

    #[test]
    fn hand_computed_quotes() {
        let terminal = array![90.0, 100.0, 110.0, 120.0];
        let quotes = price_options(terminal.view(), &[100.0], 0.0, 1.0).unwrap();

        let call = quotes.calls[0];
        assert_relative_eq!(call.price, 7.5);
        // payoffs 0, 0, 10, 20: sample variance 91.666..
        assert_relative_eq!(call.stderr, (275.0 / 3.0 / 4.0_f64).sqrt(), epsilon = 1e-12);

        let put = quotes.puts[0];
        assert_relative_eq!(put.price, 2.5);
        assert_eq!(put.strike, 100.0);
    }

    #[test]
    fn discounting_is_applied() {
        let terminal = Array1::from_elem(10, 150.0);
        let quotes = price_options(terminal.view(), &[100.0], 0.05, 2.0).unwrap();
        assert_relative_eq!(quotes.calls[0].price, 50.0 * (-0.1_f64).exp(), epsilon = 1e-12);
        assert_relative_eq!(quotes.calls[0].stderr, 0.0);
        assert_relative_eq!(quotes.puts[0].price, 0.0);
    }

    #[test]
    fn quotes_follow_strike_order() {
        let terminal = array![80.0, 95.0, 105.0, 130.0];
        let strikes = [120.0, 60.0, 100.0];
        let quotes = price_options(terminal.view(), &strikes, 0.01, 0.5).unwrap();
        assert_eq!(quotes.len(), 3);
        for (q, k) in quotes.calls.iter().zip(strikes) {
            assert_eq!(q.strike, k);
        }
        assert!(quotes.calls[1].price > quotes.calls[2].price);
        assert!(quotes.calls[2].price > quotes.calls[0].price);
    }

    #[test]
    fn single_path_has_zero_stderr() {
        let terminal = array![105.0];
        let quotes = price_options(terminal.view(), &[100.0], 0.0, 1.0).unwrap();
        assert_relative_eq!(quotes.calls[0].price, 5.0);
        assert_eq!(quotes.calls[0].stderr, 0.0);
    }

    #[test]
    fn empty_strikes_give_empty_quotes() {
        let terminal = array![100.0];
        let quotes = price_options(terminal.view(), &[], 0.02, 1.0).unwrap();
        assert!(quotes.is_empty());
        assert!(quotes.puts.is_empty());
    }

    #[test]
    fn rejects_degenerate_inputs() {
        let empty = Array1::<f64>::zeros(0);
        assert!(matches!(
            price_options(empty.view(), &[100.0], 0.02, 1.0),
            Err(SmileError::InvalidConfiguration(_))
        ));
        let terminal = array![100.0];
        assert!(price_options(terminal.view(), &[100.0], 0.02, 0.0).is_err());
        assert!(price_options(terminal.view(), &[100.0], 0.02, f64::INFINITY).is_err());
        assert!(price_options(terminal.view(), &[100.0], f64::NAN, 1.0).is_err());
    }
}
