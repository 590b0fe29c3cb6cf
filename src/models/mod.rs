//! Heston stochastic-volatility dynamics.
//!
//! ```text
//! dS = r S dt + sqrt(v) S dW1
//! dv = kappa (theta - v) dt + sigma sqrt(v) dW2,   corr(dW1, dW2) = rho
//! ```

use crate::core::SimulationConfig;

/// Risk-neutral Heston coefficients plus the time step they are discretized on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Heston {
    pub r: f64,
    pub kappa: f64,
    pub theta: f64,
    pub sigma: f64,
    pub dt: f64,
}

/// One full-truncation Euler step for a single path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HestonStep {
    pub s: f64,
    /// Variance after clamping at zero.
    pub v: f64,
    /// The unclamped Euler update went negative.
    pub truncated: bool,
}

impl Heston {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            r: config.r,
            kappa: config.kappa,
            theta: config.theta,
            sigma: config.sigma,
            dt: config.dt(),
        }
    }

    /// Advances `(s, v)` by one step with correlated shocks `(z1, z2)`.
    ///
    /// The price uses a log-Euler update so it stays strictly positive; the
    /// variance uses `max(v, 0)` inside the square root and is floored at zero
    /// afterwards.
    #[inline]
    pub fn step_full_truncation(&self, s: f64, v: f64, z1: f64, z2: f64) -> HestonStep {
        let v_pos = v.max(0.0);
        let sqrt_v_dt = (v_pos * self.dt).sqrt();

        let s_next = s * ((self.r - 0.5 * v_pos) * self.dt + sqrt_v_dt * z1).exp();
        let v_raw = v + self.kappa * (self.theta - v) * self.dt + self.sigma * sqrt_v_dt * z2;

        HestonStep {
            s: s_next,
            v: v_raw.max(0.0),
            truncated: v_raw < 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn model() -> Heston {
        Heston {
            r: 0.02,
            kappa: 3.0,
            theta: 0.04,
            sigma: 0.6,
            dt: 1.0 / 252.0,
        }
    }

    #[test]
    fn large_negative_variance_shock_is_truncated() {
        let step = model().step_full_truncation(100.0, 0.001, 0.0, -15.0);
        assert!(step.truncated);
        assert_eq!(step.v, 0.0);
        assert!(step.s > 0.0);
    }

    #[test]
    fn zero_shocks_follow_the_drift() {
        let m = model();
        let step = m.step_full_truncation(100.0, 0.04, 0.0, 0.0);
        assert!(!step.truncated);
        assert_relative_eq!(step.s, 100.0 * ((0.02 - 0.02) * m.dt).exp(), epsilon = 1e-12);
        assert_relative_eq!(step.v, 0.04, epsilon = 1e-15);
    }

    #[test]
    fn zero_variance_freezes_price_diffusion() {
        let m = Heston { sigma: 0.0, theta: 0.0, ..model() };
        let step = m.step_full_truncation(100.0, 0.0, 5.0, 5.0);
        assert_relative_eq!(step.s, 100.0 * (0.02 * m.dt).exp(), epsilon = 1e-12);
        assert_eq!(step.v, 0.0);
    }

    #[test]
    fn from_config_copies_coefficients() {
        let cfg = SimulationConfig::default();
        let m = Heston::from_config(&cfg);
        assert_relative_eq!(m.dt, 1.0 / 252.0);
        assert_relative_eq!(m.kappa, cfg.kappa);
        assert_relative_eq!(m.sigma, cfg.sigma);
    }
}
