//! Liquidator Core - Shared data models, types, errors, and the venue capability set

pub mod errors;
pub mod models;
pub mod types;
pub mod venue;

pub use errors::{Error, Result};
pub use models::*;
pub use types::*;
pub use venue::Venue;
