//! Implied-volatility inversion and the smile pipeline built on it.

pub mod implied;
pub mod smile;

pub use implied::{ImpliedVolResult, implied_vol, implied_vols};
pub use smile::{HestonSmile, SmileReport, TerminalStats};
