//! Command implementations.
//!
//! Every command loads configuration and opens the data directory through
//! [`Context`]. Stores are opened per command and torn down before it returns,
//! so the persisted cart is always written before the process exits.

pub mod account;
pub mod cart;
pub mod catalog;

use std::sync::Arc;

use pos_storefront::api::PosApiClient;
use pos_storefront::cart::CartStore;
use pos_storefront::config::StorefrontConfig;
use pos_storefront::models::UserSession;
use pos_storefront::services::SessionStore;
use pos_storefront::storage::FileStore;
use pos_storefront::{AppError, Result};

/// Shared state for a single command.
pub struct Context {
    pub config: StorefrontConfig,
    storage: Arc<FileStore>,
}

impl Context {
    /// Load configuration and open the data directory.
    pub async fn load() -> Result<Self> {
        let config = StorefrontConfig::from_env()?;
        let storage = Arc::new(FileStore::open(config.data_dir.clone()).await?);

        Ok(Self { config, storage })
    }

    pub fn client(&self) -> Result<PosApiClient> {
        Ok(PosApiClient::new(&self.config.api)?)
    }

    pub async fn cart(&self) -> CartStore {
        CartStore::initialize(Arc::clone(&self.storage)).await
    }

    pub async fn session(&self) -> SessionStore<FileStore> {
        SessionStore::load(Arc::clone(&self.storage)).await
    }
}

/// The logged-in user, or an error asking to log in.
pub fn require_user(session: &SessionStore<FileStore>) -> Result<&UserSession> {
    session
        .current()
        .ok_or_else(|| AppError::BadRequest("Please log in first (pos-cli login)".to_string()))
}
