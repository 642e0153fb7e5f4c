//! Macro scenario stress testing
//!
//! Applies per-sector percentage shocks from a fixed scenario library to a
//! portfolio, with bounded per-holding noise standing in for idiosyncratic
//! volatility.

pub mod scenarios;
pub mod simulator;

pub use scenarios::ScenarioLibrary;
pub use simulator::{ScenarioSimulator, DEFAULT_NOISE_BOUND_PCT};
