//! Core error type, shared domain types and configuration.

pub mod config;
pub mod types;

pub use config::*;
pub use types::*;

/// Errors surfaced by the simulation, pricing and implied-vol pipeline.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SmileError {
    /// Input validation error, raised before any computation starts.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Simulated values left the representable range (overflow, NaN, underflow to zero).
    #[error("numerical degeneracy: {0}")]
    NumericalDegeneracy(String),

    /// A quote could not be inverted into an implied volatility.
    #[error("implied volatility unsolvable at strike {strike}: {reason}")]
    ImpliedVolUnsolvable { strike: f64, reason: String },

    /// Configuration file or environment could not be parsed.
    #[error("config error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for SmileError {
    fn from(e: serde_json::Error) -> Self {
        SmileError::Config(e.to_string())
    }
}

impl From<std::io::Error> for SmileError {
    fn from(e: std::io::Error) -> Self {
        SmileError::Config(e.to_string())
    }
}

pub type SmileResult<T> = Result<T, SmileError>;
