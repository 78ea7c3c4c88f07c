//! OKX wire models and their conversion into domain models
//!
//! The raw HTTP client only moves JSON around; everything that knows how
//! OKX spells a field or a state lives here, including request validation.

mod account;
mod models;
mod trading;

pub use account::*;
pub use models::*;
pub use trading::*;
