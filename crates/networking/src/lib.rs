//! Liquidator Networking - OKX REST client, wire models, and a paper-trading venue

pub mod api;
pub mod http;
pub mod paper;

pub use http::{OkxClient, OkxConfig};
pub use paper::PaperVenue;
