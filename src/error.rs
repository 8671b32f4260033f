//! Error types for the maxdigi client.
//!
//! All remote-call failures are normalized into [`ApiError`] at the client
//! boundary, so upstream components (the top-up job in particular) never need
//! to inspect transport-level detail. Configuration problems are fatal at
//! construction time and get their own type.

use thiserror::Error;

/// The main error type for maxdigi operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (missing credentials, bad env values)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// API errors surfaced by the client
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Terminal top-up job failures
    #[error("Job error: {0}")]
    Job(#[from] JobError),

    /// I/O errors (server binding, shutdown)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Construction-time configuration errors
///
/// These are fatal: an [`crate::ApiClient`] is never constructed without both
/// credentials present, so per-call code does not re-check them.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// API username missing or empty
    #[error("DIGIFLAZZ_USERNAME is not set or empty")]
    MissingUsername,

    /// API key missing or empty
    #[error("DIGIFLAZZ_API_KEY is not set or empty")]
    MissingApiKey,

    /// An environment variable had an unusable value
    #[error("Invalid value for {var}: {message}")]
    InvalidValue {
        /// The offending variable name
        var: &'static str,
        /// What was wrong with it
        message: String,
    },

    /// The underlying HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// The single error type produced by [`crate::ApiClient`] operations.
///
/// Variants distinguish the failure class so the job layer can classify
/// without parsing message text. Messages may embed the provider-supplied
/// `data.message`, never local key material.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The provider answered with a non-2xx status
    #[error("Provider returned HTTP {status}: {message}")]
    Provider {
        /// HTTP status code of the response
        status: u16,
        /// Provider `data.message` when present, else the transport message
        message: String,
    },

    /// The request never completed (DNS, connect, timeout)
    #[error("Request to provider failed: {0}")]
    Transport(String),

    /// 2xx response without a usable `data` envelope
    #[error("Invalid provider response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

/// A terminal top-up job failure, carrying the refId it belongs to.
#[derive(Error, Debug)]
#[error("Top-up job for ref_id {ref_id} failed: {source}")]
pub struct JobError {
    /// Caller-supplied idempotency key of the failed transaction
    pub ref_id: String,
    /// The underlying client error
    #[source]
    pub source: ApiError,
}

/// Result type alias for maxdigi operations
pub type Result<T> = std::result::Result<T, Error>;
