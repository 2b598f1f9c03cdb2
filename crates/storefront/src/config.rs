//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `POS_API_BASE_URL` - Catalog/sales API root (default: the production API)
//! - `POS_DATA_DIR` - Directory for the persisted cart and user (default: `.pos-storefront`)
//! - `POS_HTTP_TIMEOUT_SECS` - Request timeout in seconds (default: 30)
//! - `POS_SALES_PERSON` - Sales person id recorded on every sale (required to check out)
//! - `POS_PICKUP_LOCATION` - Pickup location named in the sale notes (default: `Default location`)
//! - `POS_TERMS` - Terms and conditions attached to every sale (default: `No returns after 7 days.`)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use pos_storefront_core::UserId;

/// Production API root.
pub const DEFAULT_API_BASE_URL: &str =
    "https://pos-api-dot-ancient-episode-256312.de.r.appspot.com/api/v1/";

const DEFAULT_DATA_DIR: &str = ".pos-storefront";
const DEFAULT_TIMEOUT_SECS: &str = "30";
const DEFAULT_PICKUP_LOCATION: &str = "Default location";
const DEFAULT_TERMS: &str = "No returns after 7 days.";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Remote API settings
    pub api: ApiConfig,
    /// Directory holding the persisted cart and user record
    pub data_dir: PathBuf,
    /// Values stamped onto every sale order
    pub checkout: CheckoutDefaults,
}

/// Remote API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// API root; always ends with `/` so endpoint paths join beneath it
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
}

/// Order fields the client fills in rather than the customer.
#[derive(Debug, Clone)]
pub struct CheckoutDefaults {
    /// Sales person credited with online orders
    pub sales_person: Option<UserId>,
    /// Pickup location named in the order notes
    pub pickup_location: String,
    /// Terms and conditions text
    pub terms: String,
}

impl Default for CheckoutDefaults {
    fn default() -> Self {
        Self {
            sales_person: None,
            pickup_location: DEFAULT_PICKUP_LOCATION.to_string(),
            terms: DEFAULT_TERMS.to_string(),
        }
    }
}

impl CheckoutDefaults {
    /// Sales person id; checkout cannot proceed without one.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `POS_SALES_PERSON` was not set.
    pub fn require_sales_person(&self) -> Result<&UserId, ConfigError> {
        self.sales_person
            .as_ref()
            .ok_or_else(|| ConfigError::MissingEnvVar("POS_SALES_PERSON".to_string()))
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = parse_base_url(
            "POS_API_BASE_URL",
            &get_env_or_default(&lookup, "POS_API_BASE_URL", DEFAULT_API_BASE_URL),
        )?;

        let timeout_secs = get_env_or_default(&lookup, "POS_HTTP_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("POS_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
            })?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "POS_HTTP_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            api: ApiConfig {
                base_url,
                timeout: Duration::from_secs(timeout_secs),
            },
            data_dir: PathBuf::from(get_env_or_default(&lookup, "POS_DATA_DIR", DEFAULT_DATA_DIR)),
            checkout: CheckoutDefaults {
                sales_person: get_optional_env(&lookup, "POS_SALES_PERSON").map(UserId::new),
                pickup_location: get_env_or_default(
                    &lookup,
                    "POS_PICKUP_LOCATION",
                    DEFAULT_PICKUP_LOCATION,
                ),
                terms: get_env_or_default(&lookup, "POS_TERMS", DEFAULT_TERMS),
            },
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional variable. Blank values count as unset.
fn get_optional_env(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Get a variable with a default value.
fn get_env_or_default(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> String {
    get_optional_env(lookup, key).unwrap_or_else(|| default.to_string())
}

/// Parse an API root, adding the trailing slash `Url::join` needs.
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
