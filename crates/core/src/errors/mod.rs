//! Venue and validation errors

use thiserror::Error;

/// Every fallible venue call returns this. The retry layer treats all
/// variants alike.
#[derive(Error, Debug)]
pub enum Error {
    /// Credentials missing, wrong, or refused (HTTP 401/403)
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// Venue answered with a non-zero response code
    #[error("Venue API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Order rejected by venue: {0}")]
    OrderRejected(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::NetworkError(format!("request timed out: {}", err))
        } else {
            Error::NetworkError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidData(format!("malformed venue payload: {}", err))
    }
}
