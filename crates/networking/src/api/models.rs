//! Raw OKX v5 response and request bodies

use liquidator_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Every OKX response is wrapped in `{ "code": "0", "msg": "", "data": [...] }`
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub code: String,
    #[serde(default)]
    pub msg: String,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        self.code == "0"
    }

    /// Unwrap the data array, turning a non-zero code into an API error
    pub fn into_data(self) -> Result<Vec<T>> {
        if self.is_success() {
            Ok(self.data)
        } else {
            Err(Error::ApiError(format!("code {}: {}", self.code, self.msg)))
        }
    }
}

/// One account entry from `GET /api/v5/account/balance`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceData {
    #[serde(default)]
    pub details: Vec<BalanceDetail>,
}

/// Per-currency balance line
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceDetail {
    pub ccy: String,
    /// Available (free) balance
    #[serde(default, deserialize_with = "deserialize_f64_lenient")]
    pub avail_bal: f64,
}

/// Entry from `GET /api/v5/market/ticker`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerData {
    pub inst_id: String,
    #[serde(default, deserialize_with = "deserialize_opt_f64_lenient")]
    pub last: Option<f64>,
}

/// Body for `POST /api/v5/trade/order`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderBody {
    pub inst_id: String,
    pub td_mode: String,
    pub side: String,
    pub ord_type: String,
    pub sz: String,
    pub px: String,
}

/// Per-order acknowledgement from `POST /api/v5/trade/order`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderAck {
    #[serde(default)]
    pub ord_id: String,
    #[serde(default)]
    pub s_code: String,
    #[serde(default)]
    pub s_msg: String,
}

/// Order details from `GET /api/v5/trade/order`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderData {
    pub ord_id: String,
    pub state: String,
    #[serde(default, deserialize_with = "deserialize_f64_lenient")]
    pub sz: f64,
    #[serde(default, deserialize_with = "deserialize_f64_lenient")]
    pub acc_fill_sz: f64,
    #[serde(default, deserialize_with = "deserialize_opt_f64_lenient")]
    pub avg_px: Option<f64>,
}

/// Deserialize an f64 that may arrive as a number, a (possibly empty) string, or null
fn deserialize_f64_lenient<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(deserialize_opt_f64_lenient(deserializer)?.unwrap_or(0.0))
}

/// Like [`deserialize_f64_lenient`], keeping "no value" distinct from zero
fn deserialize_opt_f64_lenient<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de;

    struct OptF64Lenient;

    impl<'de> de::Visitor<'de> for OptF64Lenient {
        type Value = Option<f64>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a number, numeric string, empty string, or null")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Option<f64>, E> {
            Ok(Some(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Option<f64>, E> {
            Ok(Some(v as f64))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Option<f64>, E> {
            Ok(Some(v as f64))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Option<f64>, E> {
            let v = v.trim();
            if v.is_empty() {
                return Ok(None);
            }
            v.parse::<f64>().map(Some).map_err(de::Error::custom)
        }

        fn visit_none<E: de::Error>(self) -> std::result::Result<Option<f64>, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> std::result::Result<Option<f64>, E> {
            Ok(None)
        }
    }

    deserializer.deserialize_any(OptF64Lenient)
}
