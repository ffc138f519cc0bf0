//! Error types for the quickstart
//!
//! `QuickstartError` is the crate-wide error. Provider-facing failures get their own
//! types (`ExchangeError`, `ApiError`) so callers can branch on the provider message
//! without digging through a generic error.

use serde::Deserialize;
use thiserror::Error;

/// Main error type for quickstart operations
#[derive(Error, Debug)]
pub enum QuickstartError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Token exchange failed: {0}")]
    Exchange(#[from] ExchangeError),

    #[error("HubSpot API error: {0}")]
    Api(#[from] ApiError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Template rendering failed: {0}")]
    Template(#[from] minijinja::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenient result type for quickstart operations
pub type Result<T> = std::result::Result<T, QuickstartError>;

impl QuickstartError {
    /// Create a config error
    #[inline]
    pub fn config<S: Into<String>>(msg: S) -> Self {
        QuickstartError::Config(msg.into())
    }
}

/// A token endpoint exchange that did not yield tokens.
///
/// `status` is `None` when the request never got an HTTP response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ExchangeError {
    pub status: Option<u16>,
    pub message: String,
}

impl ExchangeError {
    /// The provider rejected the grant with a non-2xx response.
    pub fn rejected(status: u16, body: &str) -> Self {
        Self {
            status: Some(status),
            message: describe_failure(status, body),
        }
    }

    /// The request failed before a response arrived.
    pub fn transport(err: reqwest::Error) -> Self {
        Self {
            status: None,
            message: err.to_string(),
        }
    }

    /// A 2xx response whose body is not a token response.
    pub fn invalid_response(err: serde_json::Error) -> Self {
        Self {
            status: None,
            message: format!("invalid token response: {}", err),
        }
    }

    /// Message reported by the provider (or the transport)
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A failed call to the HubSpot CRM API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    pub status: Option<u16>,
    pub message: String,
}

impl ApiError {
    pub fn rejected(status: u16, body: &str) -> Self {
        Self {
            status: Some(status),
            message: describe_failure(status, body),
        }
    }

    pub fn transport(err: reqwest::Error) -> Self {
        Self {
            status: None,
            message: err.to_string(),
        }
    }

    pub fn invalid_response(err: serde_json::Error) -> Self {
        Self {
            status: None,
            message: format!("invalid API response: {}", err),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Error body shapes returned by HubSpot and by RFC 6749 token endpoints
#[derive(Debug, Default, Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Pick the most useful human-readable message out of a failed provider response.
///
/// Preference: HubSpot `message`, then `error_description`, then `error`,
/// then the raw body, then the bare HTTP status.
pub fn describe_failure(status: u16, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ProviderErrorBody>(body) {
        let candidate = [parsed.message, parsed.error_description, parsed.error]
            .into_iter()
            .flatten()
            .find(|m| !m.trim().is_empty());
        if let Some(message) = candidate {
            return message;
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status)
    } else {
        trimmed.to_string()
    }
}
