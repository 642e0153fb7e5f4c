pub mod correlation;
pub mod diversification;
pub mod rebalancing;
pub mod shared_math;
pub mod weights;
#[cfg(test)]
mod tests;

pub use correlation::correlate;
pub use diversification::analyze_diversification;
pub use rebalancing::recommend_rebalancing;
pub use weights::portfolio_weights;
