pub mod amount;
pub mod text;
pub mod types;

pub use amount::{Amount, AmountParseError};
pub use types::*;
