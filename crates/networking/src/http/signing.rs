//! OKX request signing
//!
//! `OK-ACCESS-SIGN` is base64(HMAC-SHA256(secret, timestamp + METHOD + requestPath + body)),
//! where requestPath includes the query string.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use liquidator_core::{Error, Result};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Compute the request signature
pub fn sign_request(
    secret: &str,
    timestamp: &str,
    method: &str,
    request_path: &str,
    body: &str,
) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| Error::AuthenticationError(format!("invalid secret key: {}", e)))?;

    mac.update(timestamp.as_bytes());
    mac.update(method.to_ascii_uppercase().as_bytes());
    mac.update(request_path.as_bytes());
    mac.update(body.as_bytes());

    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// ISO-8601 UTC timestamp with millisecond precision, as the venue expects
pub fn timestamp_now() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_get_with_query() {
        let sign = sign_request(
            "22582BD0CFF14C41EDBF1AB98506286D",
            "2020-12-08T09:08:57.715Z",
            "GET",
            "/api/v5/account/balance?ccy=BTC",
            "",
        )
        .unwrap();

        assert_eq!(sign, "HiZhvSfMtWJA3uUIVXV3a/bSXNPCWvYFXoGCVS8V4zY=");
    }

    #[test]
    fn test_sign_post_includes_body() {
        let sign = sign_request(
            "secret",
            "2020-12-08T09:08:57.715Z",
            "post",
            "/api/v5/trade/order",
            r#"{"instId":"GRASS-USDT"}"#,
        )
        .unwrap();

        assert_eq!(sign, "xezUXNwcYheAH/1RMonKR3WGzIIQ/HIS6zIPDMuV0x8=");
    }

    #[test]
    fn test_timestamp_format() {
        let ts = timestamp_now();
        assert!(ts.ends_with('Z'));
        assert_eq!(ts.len(), "2020-12-08T09:08:57.715Z".len());
    }
}
