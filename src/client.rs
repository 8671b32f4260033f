//! Signed HTTP client for the DigiFlazz API.
//!
//! Every operation builds a signed payload, issues exactly one POST, and
//! normalizes the outcome: a 2xx response with a top-level `data` envelope is
//! success (the inner value is returned unchanged), everything else is an
//! [`ApiError`]. There are no retries and no caching at this layer; retry
//! policy belongs to the caller (see [`crate::job`]).
//!
//! # Example
//!
//! ```rust,no_run
//! use maxdigi::{ApiClient, Config, Credentials};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::new(Credentials::new("maxwell", "api-key")?);
//!     let client = ApiClient::new(&config)?;
//!
//!     let balance = client.check_balance().await?;
//!     println!("deposit: {}", balance["deposit"]);
//!     Ok(())
//! }
//! ```

use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use crate::config::{Config, Credentials};
use crate::error::{ApiError, ConfigError};
use crate::metrics::global_metrics;
use crate::signature;

/// Salt mixed into the balance-check signature.
const SALT_BALANCE: &str = "depo";
/// Salt mixed into the price-list signature.
const SALT_PRICELIST: &str = "pricelist";
/// Salt mixed into the deposit-ticket signature.
const SALT_DEPOSIT: &str = "deposit";

/// Client for the DigiFlazz remote API.
///
/// Holds the immutable credentials and a pooled `reqwest` client with a
/// request-level timeout, so instances are cheap to clone and safe to share
/// across tasks.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    credentials: Credentials,
    base_url: String,
    testing: bool,
}

impl ApiClient {
    /// Build a client from configuration.
    ///
    /// Credentials were already validated non-empty when the [`Config`] was
    /// constructed, so the only failure here is the HTTP client itself.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            http,
            credentials: config.credentials.clone(),
            base_url: config.base_url.clone(),
            testing: config.testing,
        })
    }

    /// Check the account deposit balance.
    ///
    /// POSTs to `cek-saldo`; returns the provider's `data` object, e.g.
    /// `{"deposit": 125000}`.
    #[instrument(skip(self))]
    pub async fn check_balance(&self) -> Result<Value, ApiError> {
        self.send_request("cek-saldo", self.balance_payload()).await
    }

    /// Fetch the prepaid product price list, optionally for one SKU.
    #[instrument(skip(self))]
    pub async fn price_list(&self, sku_code: Option<&str>) -> Result<Value, ApiError> {
        self.send_request("price-list", self.price_list_payload(sku_code))
            .await
    }

    /// Request a deposit ticket (amount to transfer plus bank instructions).
    #[instrument(skip(self))]
    pub async fn deposit(
        &self,
        amount: u64,
        bank: &str,
        owner_name: &str,
    ) -> Result<Value, ApiError> {
        self.send_request("deposit", self.deposit_payload(amount, bank, owner_name))
            .await
    }

    /// Execute a top-up transaction.
    ///
    /// `ref_id` is the caller-supplied idempotency key; the provider uses it
    /// to dedupe repeated submissions, and it doubles as the signature salt.
    #[instrument(skip(self), fields(ref_id = %ref_id))]
    pub async fn transact(
        &self,
        sku_code: &str,
        customer_no: &str,
        ref_id: &str,
    ) -> Result<Value, ApiError> {
        self.send_request(
            "transaction",
            self.transaction_payload(sku_code, customer_no, ref_id),
        )
        .await
    }

    fn sign(&self, salt: &str) -> String {
        signature::sign(self.credentials.username(), self.credentials.api_key(), salt)
    }

    fn balance_payload(&self) -> Value {
        json!({
            "cmd": "deposit",
            "username": self.credentials.username(),
            "sign": self.sign(SALT_BALANCE),
        })
    }

    fn price_list_payload(&self, sku_code: Option<&str>) -> Value {
        let mut payload = json!({
            "cmd": "prepaid",
            "username": self.credentials.username(),
            "sign": self.sign(SALT_PRICELIST),
        });
        if let Some(code) = sku_code {
            payload["code"] = json!(code);
        }
        payload
    }

    fn deposit_payload(&self, amount: u64, bank: &str, owner_name: &str) -> Value {
        // "Bank" is capitalized on the wire; provider quirk.
        json!({
            "username": self.credentials.username(),
            "amount": amount,
            "Bank": bank,
            "owner_name": owner_name,
            "sign": self.sign(SALT_DEPOSIT),
        })
    }

    fn transaction_payload(&self, sku_code: &str, customer_no: &str, ref_id: &str) -> Value {
        json!({
            "username": self.credentials.username(),
            "buyer_sku_code": sku_code,
            "customer_no": customer_no,
            "ref_id": ref_id,
            "testing": self.testing,
            "sign": self.sign(ref_id),
        })
    }

    /// Send one signed request and normalize the response.
    ///
    /// Success requires both an HTTP 2xx status and a non-null top-level
    /// `data` field; either one failing is an error, never a partial success.
    async fn send_request(&self, endpoint: &str, payload: Value) -> Result<Value, ApiError> {
        let metrics = global_metrics();
        metrics.inc_api_requests();

        let url = format!("{}{}", self.base_url, endpoint);
        debug!(%url, "Sending API request");

        let result = self.dispatch(&url, &payload).await;
        if result.is_err() {
            metrics.inc_api_errors();
        }
        result
    }

    async fn dispatch(&self, url: &str, payload: &Value) -> Result<Value, ApiError> {
        let response = self.http.post(url).json(payload).send().await?;
        let status = response.status();
        let text = response.text().await?;
        let body: Option<Value> = serde_json::from_str(&text).ok();

        if !status.is_success() {
            // Prefer the provider's own message over the transport reason.
            let message = body
                .as_ref()
                .and_then(|b| b.pointer("/data/message"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("unknown error")
                        .to_string()
                });
            warn!(status = status.as_u16(), %message, "Provider rejected request");
            return Err(ApiError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let body = body.ok_or_else(|| {
            ApiError::MalformedResponse("response body is not valid JSON".to_string())
        })?;

        match body.get("data") {
            Some(data) if !data.is_null() => Ok(data.clone()),
            _ => Err(ApiError::MalformedResponse(
                "response is missing the \"data\" key".to_string(),
            )),
        }
    }
}
