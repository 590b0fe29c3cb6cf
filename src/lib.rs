//! Heston stochastic-volatility Monte Carlo and implied-volatility smile reconstruction.
//!
//! The pipeline draws correlated Gaussian shocks, evolves asset and variance
//! paths with a full-truncation Euler scheme, prices European calls and puts from
//! the terminal prices, and inverts each quote through Black-Scholes into an
//! implied volatility.
//!
//! # Feature Flags
//! - `parallel` (default): Rayon-powered shock generation, path evolution and
//!   per-strike pricing and inversion. Results are bit-identical without it.
//!
//! # Quick Start
//! ```rust
//! use heston_smile::core::{SimulationConfig, SolveMode, StrikeGrid};
//! use heston_smile::vol::smile::HestonSmile;
//!
//! let config = SimulationConfig { n_steps: 50, n_paths: 2_000, ..SimulationConfig::default() };
//! let strikes = StrikeGrid::linspace(90.0, 110.0, 5).unwrap();
//! let report = HestonSmile::new(config, strikes)
//!     .with_seed(7)
//!     .with_modes(SolveMode::Permissive, SolveMode::Permissive)
//!     .run()
//!     .unwrap();
//! assert_eq!(report.strikes.len(), 5);
//! ```
//!
//! The stages are also usable on their own:
//! ```rust
//! use heston_smile::core::{OptionType, SimulationConfig, SolveMode};
//! use heston_smile::mc::{generate_shocks, simulate};
//! use heston_smile::pricing::monte_carlo::price_options;
//! use heston_smile::vol::implied::implied_vols;
//!
//! let cfg = SimulationConfig { n_steps: 20, n_paths: 1_000, ..SimulationConfig::default() };
//! let shocks = generate_shocks(cfg.n_steps, cfg.n_paths, cfg.rho, Some(1)).unwrap();
//! let paths = simulate(&cfg, &shocks).unwrap();
//! let strikes = [95.0, 100.0, 105.0];
//! let quotes = price_options(paths.terminal_prices(), &strikes, cfg.r, cfg.t).unwrap();
//! let ivs = implied_vols(
//!     &quotes.put_prices(), cfg.s0, &strikes, cfg.t, cfg.r, OptionType::Put, SolveMode::Permissive,
//! )
//! .unwrap();
//! assert_eq!(ivs.len(), 3);
//! ```

pub mod core;
pub mod math;
pub mod mc;
pub mod models;
pub mod pricing;
pub mod vol;

/// Common imports for ergonomic usage.
pub mod prelude {
    pub use crate::core::*;
    pub use crate::mc::{PathMatrix, ShockTensor, generate_shocks, simulate};
    pub use crate::pricing::monte_carlo::{OptionQuotes, PriceQuote, price_options};
    pub use crate::vol::implied::{ImpliedVolResult, implied_vol, implied_vols};
    pub use crate::vol::smile::{HestonSmile, SmileReport};
}
