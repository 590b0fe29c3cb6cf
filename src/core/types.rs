use serde::{Deserialize, Serialize};

use super::{SmileError, SmileResult};

/// Plain-vanilla option side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionType {
    /// Call option payoff profile.
    Call,
    /// Put option payoff profile.
    Put,
}

impl OptionType {
    /// Returns +1.0 for calls and -1.0 for puts.
    pub fn sign(self) -> f64 {
        match self {
            Self::Call => 1.0,
            Self::Put => -1.0,
        }
    }

    /// Terminal payoff `max(sign * (spot - strike), 0)`.
    #[inline]
    pub fn payoff(self, spot: f64, strike: f64) -> f64 {
        (self.sign() * (spot - strike)).max(0.0)
    }
}

/// Failure policy for a batch of implied-volatility inversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveMode {
    /// The first unsolvable strike fails the whole batch.
    #[default]
    Strict,
    /// Unsolvable strikes are reported per entry; the batch succeeds.
    Permissive,
}

/// Ordered set of option strikes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrikeGrid {
    strikes: Vec<f64>,
}

impl StrikeGrid {
    /// Wraps explicit strikes, rejecting non-finite or non-positive levels.
    pub fn new(strikes: Vec<f64>) -> SmileResult<Self> {
        if let Some(bad) = strikes.iter().find(|k| !k.is_finite() || **k <= 0.0) {
            return Err(SmileError::InvalidConfiguration(format!(
                "strikes must be finite and > 0, got {bad}"
            )));
        }
        Ok(Self { strikes })
    }

    /// Half-open evenly spaced grid `start, start + step, ...` strictly below `stop`.
    pub fn arange(start: f64, stop: f64, step: f64) -> SmileResult<Self> {
        if !start.is_finite() || !stop.is_finite() || !step.is_finite() || step <= 0.0 {
            return Err(SmileError::InvalidConfiguration(format!(
                "strike range needs finite bounds and step > 0, got start={start} stop={stop} step={step}"
            )));
        }
        let count = ((stop - start) / step).ceil().max(0.0) as usize;
        Self::new((0..count).map(|i| start + i as f64 * step).collect())
    }

    /// `count` strikes evenly spaced over the closed interval `[lo, hi]`.
    pub fn linspace(lo: f64, hi: f64, count: usize) -> SmileResult<Self> {
        match count {
            0 => Self::new(Vec::new()),
            1 => Self::new(vec![lo]),
            _ => {
                let step = (hi - lo) / (count - 1) as f64;
                Self::new((0..count).map(|i| lo + i as f64 * step).collect())
            }
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.strikes
    }

    pub fn len(&self) -> usize {
        self.strikes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strikes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.strikes.iter()
    }
}

impl AsRef<[f64]> for StrikeGrid {
    fn as_ref(&self) -> &[f64] {
        &self.strikes
    }
}
