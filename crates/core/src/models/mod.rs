//! Data models for venue account state, market data, and orders

mod balance;
mod order;
mod ticker;

pub use balance::*;
pub use order::*;
pub use ticker::*;
