//! REST client for the POS catalog and sales API.
//!
//! # Architecture
//!
//! - The remote API is the source of truth for the catalog; nothing is synced
//!   locally except the cart and the logged-in user
//! - Product detail responses are cached in memory via `moka` (5 minute TTL)
//! - Every response is wrapped in an `{ error, msg, data }` envelope
//!
//! # Example
//!
//! ```rust,ignore
//! use pos_storefront::api::PosApiClient;
//!
//! let client = PosApiClient::new(&config.api)?;
//!
//! let product = client.get_product(&product_id).await?;
//! cart.add_or_increment(CartLineItem::from_product(&product));
//! ```

mod client;

pub use client::PosApiClient;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when talking to the remote API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not have the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Server answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Server answered `error: true` in the envelope.
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// Envelope carried no data.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Endpoint URL could not be built from the configured base.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Message suitable for showing to the user.
    ///
    /// Server-provided messages are passed through; transport details are not.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected(msg) | Self::Status { message: msg, .. } if !msg.is_empty() => {
                msg.clone()
            }
            Self::NotFound(what) => format!("{what} not found"),
            _ => "Request failed, please try again".to_string(),
        }
    }
}

/// Response envelope used by every endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl Envelope {
    /// Unwrap the payload, mapping `error: true` to [`ApiError::Rejected`].
    pub(crate) fn into_data(self, what: &str) -> Result<Value, ApiError> {
        if self.error {
            return Err(ApiError::Rejected(
                self.msg.unwrap_or_else(|| format!("{what} request failed")),
            ));
        }
        match self.data {
            Some(Value::Null) | None => Err(ApiError::NotFound(what.to_string())),
            Some(data) => Ok(data),
        }
    }
}
