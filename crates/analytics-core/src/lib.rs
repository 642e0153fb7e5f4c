pub mod error;
pub mod math;
pub mod traits;
pub mod types;

pub use error::*;
pub use math::{portfolio_total, trailing_return};
pub use traits::*;
pub use types::*;
