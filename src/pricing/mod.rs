pub mod european;
pub mod monte_carlo;

pub use crate::core::types::OptionType;
pub use monte_carlo::{OptionQuotes, PriceQuote, price_options};
