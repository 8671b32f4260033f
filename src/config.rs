//! Configuration loading for the maxdigi client.
//!
//! Three secrets drive the integration: the API username, the API key, and
//! the webhook shared secret. All are supplied through environment variables;
//! nothing sensitive is ever hardcoded or logged.
//!
//! # Environment Variables
//!
//! - `DIGIFLAZZ_USERNAME` (required): API username
//! - `DIGIFLAZZ_API_KEY` (required): API key
//! - `DIGIFLAZZ_WEBHOOK_SECRET` (optional): shared secret for inbound
//!   webhooks; when unset, every webhook is rejected
//! - `DIGIFLAZZ_BASE_URL` (optional): API base URL override
//! - `DIGIFLAZZ_TESTING` (optional): send transactions in testing mode
//!   (default: true)
//! - `DIGIFLAZZ_TIMEOUT_SECS` (optional): HTTP request timeout (default: 30)

use std::env;
use std::fmt;
use std::time::Duration;

use tracing::warn;

use crate::error::ConfigError;

/// Default API base URL. Always ends with a trailing slash.
pub const DEFAULT_BASE_URL: &str = "https://api.digiflazz.com/v1/";

/// Default request timeout for outbound API calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// API credentials, validated non-empty at construction.
///
/// Immutable once constructed and owned by the client. The `Debug`
/// implementation redacts the key so credentials can appear in logs safely.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    api_key: String,
}

impl Credentials {
    /// Create credentials, rejecting missing or empty values.
    pub fn new(
        username: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let username = username.into();
        let api_key = api_key.into();
        if username.trim().is_empty() {
            return Err(ConfigError::MissingUsername);
        }
        if api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(Self { username, api_key })
    }

    /// The API username (sent in every request payload).
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The API key. Only ever fed into the signature computation.
    pub(crate) fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Full integration configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// API credentials
    pub credentials: Credentials,
    /// Shared secret for verifying inbound webhooks, if configured
    pub webhook_secret: Option<String>,
    /// API base URL, trailing slash included
    pub base_url: String,
    /// Whether transactions are sent in the provider's testing mode
    pub testing: bool,
    /// Request timeout applied to every outbound call
    pub timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Fails fast when the username or API key is absent; a missing webhook
    /// secret only degrades the webhook endpoint (all deliveries rejected).
    pub fn from_env() -> Result<Self, ConfigError> {
        let username = env::var("DIGIFLAZZ_USERNAME").unwrap_or_default();
        let api_key = env::var("DIGIFLAZZ_API_KEY").unwrap_or_default();
        let credentials = Credentials::new(username, api_key)?;

        let webhook_secret = env::var("DIGIFLAZZ_WEBHOOK_SECRET")
            .ok()
            .filter(|s| !s.trim().is_empty());
        if webhook_secret.is_none() {
            warn!("DIGIFLAZZ_WEBHOOK_SECRET not set; all inbound webhooks will be rejected");
        }

        let base_url = env::var("DIGIFLAZZ_BASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(|url| if url.ends_with('/') { url } else { format!("{url}/") })
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let testing = match env::var("DIGIFLAZZ_TESTING") {
            Err(_) => true,
            Ok(v) => match v.to_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                other => {
                    return Err(ConfigError::InvalidValue {
                        var: "DIGIFLAZZ_TESTING",
                        message: format!("expected a boolean, got {other:?}"),
                    })
                }
            },
        };

        let timeout = match env::var("DIGIFLAZZ_TIMEOUT_SECS") {
            Err(_) => DEFAULT_TIMEOUT,
            Ok(v) => {
                let secs: u64 = v.parse().map_err(|_| ConfigError::InvalidValue {
                    var: "DIGIFLAZZ_TIMEOUT_SECS",
                    message: format!("expected seconds as an integer, got {v:?}"),
                })?;
                if secs == 0 {
                    return Err(ConfigError::InvalidValue {
                        var: "DIGIFLAZZ_TIMEOUT_SECS",
                        message: "timeout cannot be 0".to_string(),
                    });
                }
                Duration::from_secs(secs)
            }
        };

        Ok(Self {
            credentials,
            webhook_secret,
            base_url,
            testing,
            timeout,
        })
    }

    /// Build a configuration directly, for embedding and tests.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            webhook_secret: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            testing: true,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the API base URL. A trailing slash is appended when missing.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let url = base_url.into();
        self.base_url = if url.ends_with('/') { url } else { format!("{url}/") };
        self
    }

    /// Set the webhook shared secret.
    pub fn with_webhook_secret(mut self, secret: impl Into<String>) -> Self {
        self.webhook_secret = Some(secret.into());
        self
    }

    /// Toggle the provider's testing mode for transactions.
    pub fn with_testing(mut self, testing: bool) -> Self {
        self.testing = testing;
        self
    }
}
