//! Unified error handling.
//!
//! Each boundary has its own error enum. `AppError` aggregates them for
//! callers that drive several boundaries at once, such as the CLI.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::services::checkout::CheckoutError;
use crate::services::session::SessionError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Local storage operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Remote API operation failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Checkout could not be completed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Session could not be changed.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input from the caller.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Message suitable for showing to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(err) | Self::Checkout(CheckoutError::Api(err)) => err.user_message(),
            Self::Checkout(CheckoutError::EmptyCart) => "Your cart is empty".to_string(),
            Self::Checkout(CheckoutError::NotLoggedIn) => "Please log in to check out".to_string(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::BadRequest(msg) => msg.clone(),
            Self::Config(err) => err.to_string(),
            Self::Storage(_) | Self::Session(_) => "Could not save changes on this device".to_string(),
        }
    }
}

/// Result type alias for storefront operations.
pub type Result<T> = std::result::Result<T, AppError>;
