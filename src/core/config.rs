//! Simulation parameters and the application configuration built on top of them.
//!
//! `AppConfig` layers three sources: built-in defaults, an optional JSON file and
//! `HESTON_*` environment variables (a `.env` file is honoured through `dotenvy`).

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{SmileError, SmileResult, SolveMode, StrikeGrid};

/// Immutable Heston simulation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Initial asset price.
    #[serde(alias = "S0")]
    pub s0: f64,
    /// Initial variance.
    pub v0: f64,
    /// Mean-reversion speed of the variance.
    pub kappa: f64,
    /// Long-run variance level.
    pub theta: f64,
    /// Volatility of variance.
    pub sigma: f64,
    /// Correlation between price and variance shocks.
    pub rho: f64,
    /// Continuously compounded risk-free rate.
    pub r: f64,
    /// Horizon in years.
    #[serde(alias = "T")]
    pub t: f64,
    /// Number of time steps.
    #[serde(alias = "N")]
    pub n_steps: usize,
    /// Number of independent paths.
    #[serde(alias = "M")]
    pub n_paths: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            s0: 100.0,
            v0: 0.25 * 0.25,
            kappa: 3.0,
            theta: 0.20 * 0.20,
            sigma: 0.6,
            rho: -0.7,
            r: 0.02,
            t: 1.0,
            n_steps: 252,
            n_paths: 1000,
        }
    }
}

impl SimulationConfig {
    /// Time-step length `T / N`.
    #[inline]
    pub fn dt(&self) -> f64 {
        self.t / self.n_steps as f64
    }

    /// Discount factor `exp(-r T)`.
    #[inline]
    pub fn discount_factor(&self) -> f64 {
        (-self.r * self.t).exp()
    }

    /// `2 kappa theta > sigma^2`: the continuous variance process never touches zero.
    pub fn feller_condition_satisfied(&self) -> bool {
        2.0 * self.kappa * self.theta > self.sigma * self.sigma
    }

    /// Checks every parameter range; the simulator refuses to run on an invalid config.
    pub fn validate(&self) -> SmileResult<()> {
        let fields = [
            ("s0", self.s0),
            ("v0", self.v0),
            ("kappa", self.kappa),
            ("theta", self.theta),
            ("sigma", self.sigma),
            ("rho", self.rho),
            ("r", self.r),
            ("t", self.t),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(invalid(format!("{name} must be finite, got {value}")));
        }
        if self.n_steps == 0 {
            return Err(invalid("n_steps must be >= 1".to_string()));
        }
        if self.n_paths == 0 {
            return Err(invalid("n_paths must be >= 1".to_string()));
        }
        if self.t <= 0.0 {
            return Err(invalid(format!("t must be > 0, got {}", self.t)));
        }
        if self.s0 <= 0.0 {
            return Err(invalid(format!("s0 must be > 0, got {}", self.s0)));
        }
        if self.v0 < 0.0 {
            return Err(invalid(format!("v0 must be >= 0, got {}", self.v0)));
        }
        if self.kappa < 0.0 || self.theta < 0.0 || self.sigma < 0.0 {
            return Err(invalid(format!(
                "kappa, theta and sigma must be >= 0, got kappa={} theta={} sigma={}",
                self.kappa, self.theta, self.sigma
            )));
        }
        if !(-1.0..=1.0).contains(&self.rho) {
            return Err(invalid(format!("rho must lie in [-1, 1], got {}", self.rho)));
        }
        Ok(())
    }
}

fn invalid(msg: String) -> SmileError {
    SmileError::InvalidConfiguration(msg)
}

/// Half-open strike range, expanded with [`StrikeGrid::arange`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrikeRange {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl Default for StrikeRange {
    fn default() -> Self {
        Self {
            start: 20.0,
            stop: 180.0,
            step: 2.0,
        }
    }
}

impl StrikeRange {
    pub fn grid(&self) -> SmileResult<StrikeGrid> {
        StrikeGrid::arange(self.start, self.stop, self.step)
    }
}

/// Everything the reporting binary needs for one smile run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub simulation: SimulationConfig,
    pub strikes: StrikeRange,
    /// Fixed seed for reproducible runs; drawn from entropy when absent.
    pub seed: Option<u64>,
    pub call_mode: SolveMode,
    pub put_mode: SolveMode,
}

impl Default for AppConfig {
    /// Reference smile run: strict calls, permissive puts.
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            strikes: StrikeRange::default(),
            seed: None,
            call_mode: SolveMode::Strict,
            put_mode: SolveMode::Permissive,
        }
    }
}

impl AppConfig {
    /// Parses a JSON document; missing fields keep their defaults.
    pub fn from_json(json: &str) -> SmileResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads defaults, then the optional JSON file, then environment overrides,
    /// and validates the result.
    pub fn load(path: Option<&Path>) -> SmileResult<Self> {
        dotenvy::dotenv().ok();

        let mut cfg = match path {
            Some(p) => {
                tracing::info!(path = %p.display(), "loading smile config");
                Self::from_json(&std::fs::read_to_string(p)?)?
            }
            None => Self::default(),
        };
        cfg.apply_overrides(|key| std::env::var(key).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Applies `HESTON_PATHS`, `HESTON_STEPS`, `HESTON_RHO` and `HESTON_SEED`
    /// from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> SmileResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("HESTON_PATHS") {
            self.simulation.n_paths = parse_var("HESTON_PATHS", &raw)?;
        }
        if let Some(raw) = lookup("HESTON_STEPS") {
            self.simulation.n_steps = parse_var("HESTON_STEPS", &raw)?;
        }
        if let Some(raw) = lookup("HESTON_RHO") {
            self.simulation.rho = parse_var("HESTON_RHO", &raw)?;
        }
        if let Some(raw) = lookup("HESTON_SEED") {
            self.seed = Some(parse_var("HESTON_SEED", &raw)?);
        }
        Ok(())
    }

    pub fn validate(&self) -> SmileResult<()> {
        self.simulation.validate()?;
        self.strikes.grid().map(|_| ())
    }
}

fn parse_var<T>(key: &str, raw: &str) -> SmileResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| SmileError::Config(format!("{key}: {e}")))
}
