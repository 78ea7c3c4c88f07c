//! Signed HTTP access to the OKX v5 REST API

mod client;
mod signing;

pub use client::{OkxClient, OkxConfig};
pub use signing::{sign_request, timestamp_now};
