//! End-to-end smile pipeline: shocks, Heston paths, Monte Carlo quotes and implied vols.

use serde::Serialize;

use crate::core::{
    AppConfig, OptionType, SimulationConfig, SmileError, SmileResult, SolveMode, StrikeGrid,
};
use crate::math::{mean, sample_std};
use crate::mc::{generate_shocks, simulate};
use crate::pricing::monte_carlo::{OptionQuotes, PriceQuote, price_options};
use crate::vol::implied::{ImpliedVolResult, implied_vols};

/// Summary statistics of the simulated terminal prices `S_T`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TerminalStats {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    /// `exp(-rT) * mean(S_T)`; close to `S0` under the risk-neutral measure.
    pub discounted_mean: f64,
}

impl TerminalStats {
    fn from_sample(terminal: &[f64], discount_factor: f64) -> Option<Self> {
        let mean = mean(terminal)?;
        let (min, max) = terminal
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &s| (lo.min(s), hi.max(s)));
        Some(Self {
            mean,
            std_dev: sample_std(terminal),
            min,
            max,
            discounted_mean: discount_factor * mean,
        })
    }
}

/// One strike of a [`SmileReport`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmileRow<'a> {
    pub strike: f64,
    pub call: &'a PriceQuote,
    pub put: &'a PriceQuote,
    pub call_vol: &'a ImpliedVolResult,
    pub put_vol: &'a ImpliedVolResult,
}

/// Full output of one smile run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmileReport {
    pub config: SimulationConfig,
    pub seed: u64,
    pub strikes: Vec<f64>,
    pub quotes: OptionQuotes,
    pub call_vols: Vec<ImpliedVolResult>,
    pub put_vols: Vec<ImpliedVolResult>,
    pub terminal: TerminalStats,
    pub truncations: usize,
}

impl SmileReport {
    pub fn rows(&self) -> impl Iterator<Item = SmileRow<'_>> + '_ {
        self.strikes
            .iter()
            .zip(&self.quotes.calls)
            .zip(&self.quotes.puts)
            .zip(self.call_vols.iter().zip(&self.put_vols))
            .map(|(((&strike, call), put), (call_vol, put_vol))| SmileRow {
                strike,
                call,
                put,
                call_vol,
                put_vol,
            })
    }

    pub fn vols(&self, option_type: OptionType) -> &[ImpliedVolResult] {
        match option_type {
            OptionType::Call => &self.call_vols,
            OptionType::Put => &self.put_vols,
        }
    }

    /// Implied vol at the strike closest to `S0`, if that strike solved.
    pub fn atm_vol(&self, option_type: OptionType) -> Option<f64> {
        let s0 = self.config.s0;
        let idx = self
            .strikes
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| (*a - s0).abs().total_cmp(&(*b - s0).abs()))?
            .0;
        self.vols(option_type).get(idx)?.vol()
    }

    pub fn to_json(&self) -> SmileResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Heston smile run: parameters, strikes, seed and per-side failure policy.
#[derive(Debug, Clone, PartialEq)]
pub struct HestonSmile {
    pub config: SimulationConfig,
    pub strikes: StrikeGrid,
    pub seed: Option<u64>,
    pub call_mode: SolveMode,
    pub put_mode: SolveMode,
}

impl HestonSmile {
    /// Unseeded run with strict calls and permissive puts.
    pub fn new(config: SimulationConfig, strikes: StrikeGrid) -> Self {
        Self {
            config,
            strikes,
            seed: None,
            call_mode: SolveMode::Strict,
            put_mode: SolveMode::Permissive,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_modes(mut self, call_mode: SolveMode, put_mode: SolveMode) -> Self {
        self.call_mode = call_mode;
        self.put_mode = put_mode;
        self
    }

    pub fn from_app_config(app: &AppConfig) -> SmileResult<Self> {
        Ok(Self {
            config: app.simulation,
            strikes: app.strikes.grid()?,
            seed: app.seed,
            call_mode: app.call_mode,
            put_mode: app.put_mode,
        })
    }

    /// Runs the pipeline once. Deterministic when a seed is set.
    pub fn run(&self) -> SmileResult<SmileReport> {
        let cfg = &self.config;
        cfg.validate()?;

        let shocks = generate_shocks(cfg.n_steps, cfg.n_paths, cfg.rho, self.seed)?;
        let paths = simulate(cfg, &shocks)?;
        let terminal = paths.terminal_prices().to_vec();

        let strikes = self.strikes.as_slice();
        let quotes = price_options(paths.terminal_prices(), strikes, cfg.r, cfg.t)?;
        let call_vols = implied_vols(
            &quotes.call_prices(),
            cfg.s0,
            strikes,
            cfg.t,
            cfg.r,
            OptionType::Call,
            self.call_mode,
        )?;
        let put_vols = implied_vols(
            &quotes.put_prices(),
            cfg.s0,
            strikes,
            cfg.t,
            cfg.r,
            OptionType::Put,
            self.put_mode,
        )?;

        let terminal = TerminalStats::from_sample(&terminal, cfg.discount_factor())
            .ok_or_else(|| SmileError::InvalidConfiguration("no simulated paths".to_string()))?;

        let report = SmileReport {
            config: *cfg,
            seed: shocks.seed(),
            strikes: strikes.to_vec(),
            quotes,
            call_vols,
            put_vols,
            terminal,
            truncations: paths.truncations(),
        };
        tracing::info!(
            seed = report.seed,
            n_paths = cfg.n_paths,
            n_strikes = report.strikes.len(),
            mean_terminal = report.terminal.mean,
            unsolved_calls = report.call_vols.iter().filter(|v| !v.is_solved()).count(),
            unsolved_puts = report.put_vols.iter().filter(|v| !v.is_solved()).count(),
            "smile run complete"
        );
        Ok(report)
    }
}
