//! OKX HTTP client with API-key authentication

use super::signing::{sign_request, timestamp_now};
use crate::api::{
    ack_from_wire, balance_from_wire, inst_id, order_body, order_from_wire, ticker_from_wire,
    BalanceData, Envelope, OrderData, PlaceOrderAck, TickerData,
};
use async_trait::async_trait;
use liquidator_core::{
    BalanceSnapshot, Error, MarketSymbol, OrderRequest, OrderResult, Result, TickerSnapshot, Venue,
};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE},
    Client, Method, Response,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, instrument};

const DEFAULT_BASE_URL: &str = "https://www.okx.com";

/// Connection and credential settings for the OKX client
#[derive(Clone, Deserialize)]
pub struct OkxConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub secret_key: String,
    #[serde(default)]
    pub passphrase: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Route requests to the demo trading environment
    #[serde(default)]
    pub simulated: bool,
    /// Order size precision accepted by the instrument
    #[serde(default = "default_size_decimals")]
    pub size_decimals: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String { DEFAULT_BASE_URL.to_string() }
fn default_size_decimals() -> u32 { 4 }
fn default_timeout_secs() -> u64 { 60 }

impl OkxConfig {
    pub fn has_credentials(&self) -> bool {
        !self.api_key.is_empty() && !self.secret_key.is_empty() && !self.passphrase.is_empty()
    }
}

impl Default for OkxConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            secret_key: String::new(),
            passphrase: String::new(),
            base_url: default_base_url(),
            simulated: false,
            size_decimals: default_size_decimals(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// Credentials stay out of logs
impl fmt::Debug for OkxConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OkxConfig")
            .field("api_key", &redact(&self.api_key))
            .field("secret_key", &redact(&self.secret_key))
            .field("passphrase", &redact(&self.passphrase))
            .field("base_url", &self.base_url)
            .field("simulated", &self.simulated)
            .field("size_decimals", &self.size_decimals)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() { "<unset>" } else { "<redacted>" }
}

/// HTTP client for the OKX v5 REST API (spot account)
pub struct OkxClient {
    http: Client,
    config: OkxConfig,
}

impl OkxClient {
    /// Create a new client. Fails only if the underlying HTTP client cannot be built.
    pub fn new(config: OkxConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::NetworkError(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Headers for a signed private-endpoint request
    fn auth_headers(&self, method: &Method, request_path: &str, body: &str) -> Result<HeaderMap> {
        let timestamp = timestamp_now();
        let signature = sign_request(
            &self.config.secret_key,
            &timestamp,
            method.as_str(),
            request_path,
            body,
        )?;

        let mut headers = HeaderMap::new();
        headers.insert("OK-ACCESS-KEY", header_value(&self.config.api_key)?);
        headers.insert("OK-ACCESS-SIGN", header_value(&signature)?);
        headers.insert("OK-ACCESS-TIMESTAMP", header_value(&timestamp)?);
        headers.insert("OK-ACCESS-PASSPHRASE", header_value(&self.config.passphrase)?);
        Ok(headers)
    }

    fn base_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if self.config.simulated {
            headers.insert("x-simulated-trading", HeaderValue::from_static("1"));
        }
        headers
    }

    /// Check if response indicates authentication failure
    fn check_auth_error(response: &Response) -> Option<Error> {
        match response.status().as_u16() {
            401 => Some(Error::AuthenticationError("API key rejected".to_string())),
            403 => Some(Error::AuthenticationError("Access forbidden".to_string())),
            _ => None,
        }
    }

    /// Send a request and decode the response envelope without judging its code
    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        request_path: &str,
        body: Option<String>,
        signed: bool,
    ) -> Result<Envelope<T>> {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), request_path);
        let body = body.unwrap_or_default();

        let mut headers = self.base_headers();
        if signed {
            headers.extend(self.auth_headers(&method, request_path, &body)?);
        }

        debug!("{} {}", method, url);

        let mut request = self.http.request(method, &url).headers(headers);
        if !body.is_empty() {
            request = request.body(body);
        }

        let response = request.send().await?;

        debug!("Response status: {}", response.status());

        if let Some(err) = Self::check_auth_error(&response) {
            return Err(err);
        }

        let status = response.status();
        let text = response.text().await?;

        // OKX reports business errors with HTTP 4xx and a JSON envelope; prefer the envelope
        match serde_json::from_str::<Envelope<T>>(&text) {
            Ok(envelope) => Ok(envelope),
            Err(e) if status.is_success() => {
                error!("Failed to parse response from {}: {}", request_path, e);
                Err(Error::InvalidData(e.to_string()))
            }
            Err(_) => {
                error!("Request to {} failed: HTTP {} {}", request_path, status, text);
                let preview: String = text.chars().take(500).collect();
                Err(Error::ApiError(format!("HTTP {}: {}", status, preview)))
            }
        }
    }

    /// Get free balances for all currencies in the trading account
    #[instrument(skip(self))]
    pub async fn get_balance(&self) -> Result<BalanceSnapshot> {
        let envelope: Envelope<BalanceData> = self
            .send(Method::GET, "/api/v5/account/balance", None, true)
            .await?;

        let snapshot = balance_from_wire(envelope.into_data()?);
        debug!("Balance fetched: {} currencies", snapshot.len());
        Ok(snapshot)
    }

    /// Get the latest ticker (public endpoint)
    #[instrument(skip(self, symbol), fields(symbol = %symbol))]
    pub async fn get_ticker(&self, symbol: &MarketSymbol) -> Result<TickerSnapshot> {
        let path = format!("/api/v5/market/ticker?instId={}", inst_id(symbol));
        let envelope: Envelope<TickerData> = self.send(Method::GET, &path, None, false).await?;

        let ticker = ticker_from_wire(symbol, envelope.into_data()?)?;
        debug!("Ticker fetched: {} last={:?}", symbol, ticker.last);
        Ok(ticker)
    }

    /// Place an order
    #[instrument(skip(self, request), fields(symbol = %request.symbol, qty = %request.quantity, px = %request.price))]
    pub async fn place_order(&self, request: &OrderRequest) -> Result<OrderResult> {
        let body = order_body(request, self.config.size_decimals)?;
        let json = serde_json::to_string(&body)?;

        let envelope: Envelope<PlaceOrderAck> = self
            .send(Method::POST, "/api/v5/trade/order", Some(json), true)
            .await?;

        // A rejected order comes back with a non-zero top-level code AND a per-order sCode;
        // the sCode carries the useful reason
        if !envelope.is_success() && envelope.data.is_empty() {
            return Err(Error::ApiError(format!("code {}: {}", envelope.code, envelope.msg)));
        }

        let result = ack_from_wire(envelope.data, request.quantity)?;
        debug!("Order accepted: {}", result.id);
        Ok(result)
    }

    /// Get order details
    #[instrument(skip(self, symbol), fields(symbol = %symbol))]
    pub async fn get_order(&self, order_id: &str, symbol: &MarketSymbol) -> Result<OrderResult> {
        let path = format!(
            "/api/v5/trade/order?instId={}&ordId={}",
            inst_id(symbol),
            order_id
        );
        let envelope: Envelope<OrderData> = self.send(Method::GET, &path, None, true).await?;

        let order = envelope
            .into_data()?
            .into_iter()
            .next()
            .ok_or_else(|| Error::OrderNotFound(order_id.to_string()))?;

        let result = order_from_wire(order);
        debug!(
            "Order {} state={} filled={} remaining={}",
            result.id, result.status, result.filled, result.remaining
        );
        Ok(result)
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| Error::AuthenticationError(format!("invalid header value: {}", e)))
}

#[async_trait]
impl Venue for OkxClient {
    fn name(&self) -> &str {
        "okx"
    }

    async fn fetch_balance(&self) -> Result<BalanceSnapshot> {
        self.get_balance().await
    }

    async fn fetch_ticker(&self, symbol: &MarketSymbol) -> Result<TickerSnapshot> {
        self.get_ticker(symbol).await
    }

    async fn create_order(&self, request: &OrderRequest) -> Result<OrderResult> {
        self.place_order(request).await
    }

    async fn fetch_order(&self, order_id: &str, symbol: &MarketSymbol) -> Result<OrderResult> {
        self.get_order(order_id, symbol).await
    }
}
