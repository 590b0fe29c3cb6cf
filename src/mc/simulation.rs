//! Heston path simulation over an injected shock tensor.
//!
//! The simulator never draws randomness: every path is a deterministic function
//! of its own column of the [`ShockTensor`], which keeps generation and evolution
//! separately testable and lets a run be replayed from its seed.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ArrayViewMut1, Zip};

use crate::core::{SimulationConfig, SmileError, SmileResult};
use crate::mc::ShockTensor;
use crate::models::Heston;

/// Simulated asset and variance grids, each `(N + 1) x M`; row 0 is the initial state.
#[derive(Debug, Clone, PartialEq)]
pub struct PathMatrix {
    prices: Array2<f64>,
    variances: Array2<f64>,
    maturity: f64,
    truncations: usize,
}

impl PathMatrix {
    pub fn prices(&self) -> ArrayView2<'_, f64> {
        self.prices.view()
    }

    pub fn variances(&self) -> ArrayView2<'_, f64> {
        self.variances.view()
    }

    /// `S[N, :]`, the input to terminal-payoff pricing.
    pub fn terminal_prices(&self) -> ArrayView1<'_, f64> {
        self.prices.row(self.n_steps())
    }

    pub fn n_steps(&self) -> usize {
        self.prices.nrows() - 1
    }

    pub fn n_paths(&self) -> usize {
        self.prices.ncols()
    }

    /// Observation times `0, dt, ..., T`.
    pub fn time_grid(&self) -> Array1<f64> {
        Array1::linspace(0.0, self.maturity, self.n_steps() + 1)
    }

    /// Number of variance updates that went negative and were floored at zero.
    pub fn truncations(&self) -> usize {
        self.truncations
    }
}

/// Integrates the Heston SDEs with full-truncation Euler (log-Euler for the price).
///
/// # Errors
/// - `InvalidConfiguration` when `config` fails validation or the shock tensor is not
///   `n_steps x n_paths x 2`.
/// - `NumericalDegeneracy` when a price overflows, turns NaN or underflows to zero.
pub fn simulate(config: &SimulationConfig, shocks: &ShockTensor) -> SmileResult<PathMatrix> {
    config.validate()?;
    let (n, m) = (config.n_steps, config.n_paths);
    if shocks.n_steps() != n || shocks.n_paths() != m {
        return Err(SmileError::InvalidConfiguration(format!(
            "shock tensor is {} x {} but config needs {n} x {m}",
            shocks.n_steps(),
            shocks.n_paths()
        )));
    }
    if shocks.rho() != config.rho {
        tracing::warn!(
            config_rho = config.rho,
            shock_rho = shocks.rho(),
            "shock correlation differs from configured rho"
        );
    }
    if !config.feller_condition_satisfied() {
        tracing::warn!(
            kappa = config.kappa,
            theta = config.theta,
            sigma = config.sigma,
            "Feller condition violated; variance will be truncated at zero"
        );
    }

    let model = Heston::from_config(config);
    let mut prices = Array2::<f64>::zeros((n + 1, m));
    let mut variances = Array2::<f64>::zeros((n + 1, m));
    prices.row_mut(0).fill(config.s0);
    variances.row_mut(0).fill(config.v0);

    let price_shocks = shocks.price_shocks();
    let variance_shocks = shocks.variance_shocks();
    let mut truncations = Array1::<usize>::zeros(m);
    let zip = Zip::from(prices.columns_mut())
        .and(variances.columns_mut())
        .and(price_shocks.columns())
        .and(variance_shocks.columns())
        .and(&mut truncations);

    #[cfg(feature = "parallel")]
    zip.par_for_each(|s, v, z1, z2, count| *count = evolve_path(&model, s, v, z1, z2));
    #[cfg(not(feature = "parallel"))]
    zip.for_each(|s, v, z1, z2, count| *count = evolve_path(&model, s, v, z1, z2));

    check_finite(&prices, &variances)?;

    let truncations = truncations.sum();
    tracing::debug!(n_steps = n, n_paths = m, truncations, "simulated heston paths");

    Ok(PathMatrix {
        prices,
        variances,
        maturity: config.t,
        truncations,
    })
}

/// Runs the time recurrence for one path and returns its truncation count.
fn evolve_path(
    model: &Heston,
    mut s: ArrayViewMut1<'_, f64>,
    mut v: ArrayViewMut1<'_, f64>,
    z1: ArrayView1<'_, f64>,
    z2: ArrayView1<'_, f64>,
) -> usize {
    let mut truncations = 0;
    for i in 1..s.len() {
        let step = model.step_full_truncation(s[i - 1], v[i - 1], z1[i - 1], z2[i - 1]);
        s[i] = step.s;
        v[i] = step.v;
        truncations += usize::from(step.truncated);
    }
    truncations
}

fn check_finite(prices: &Array2<f64>, variances: &Array2<f64>) -> SmileResult<()> {
    if let Some(((step, path), s)) = prices
        .indexed_iter()
        .find(|(_, s)| !s.is_finite() || **s <= 0.0)
    {
        return Err(SmileError::NumericalDegeneracy(format!(
            "asset price left the representable range at step {step}, path {path}: {s}"
        )));
    }
    if let Some(((step, path), v)) = variances.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(SmileError::NumericalDegeneracy(format!(
            "variance left the representable range at step {step}, path {path}: {v}"
        )));
    }
    Ok(())
}
