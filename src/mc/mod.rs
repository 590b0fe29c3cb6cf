//! Monte Carlo building blocks: correlated shock generation and Heston path evolution.

pub mod shocks;
pub mod simulation;

pub use shocks::{ShockTensor, generate_shocks};
pub use simulation::{PathMatrix, simulate};
