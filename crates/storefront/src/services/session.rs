//! The logged-in user.
//!
//! The user record is persisted under [`keys::USER`] so the session survives a
//! restart. Memory only changes after storage has accepted the change.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::models::{UserSession, keys};
use crate::storage::{KeyValueStore, StorageError};

/// Errors that can occur when changing the session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Holds the current user and keeps the persisted copy in step.
pub struct SessionStore<S> {
    storage: Arc<S>,
    current: Option<UserSession>,
}

impl<S> std::fmt::Debug for SessionStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("user", &self.current.as_ref().map(|user| user.id.as_str()))
            .finish_non_exhaustive()
    }
}

impl<S: KeyValueStore> SessionStore<S> {
    /// Restore the persisted user.
    ///
    /// A missing, unreadable or corrupt record means nobody is logged in.
    #[instrument(skip(storage))]
    pub async fn load(storage: Arc<S>) -> Self {
        let current = match storage.get(keys::USER).await {
            Ok(Some(raw)) => match serde_json::from_str::<UserSession>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!(error = %e, "Ignoring corrupt persisted user");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Failed to read persisted user");
                None
            }
        };

        if let Some(user) = &current {
            info!(user_id = %user.id, "Session restored");
        }
        Self { storage, current }
    }

    /// The logged-in user, if any.
    #[must_use]
    pub const fn current(&self) -> Option<&UserSession> {
        self.current.as_ref()
    }

    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.current.is_some()
    }

    /// Persist `user` and make it the current user.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the record cannot be written; the previous
    /// user stays current.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn login(&mut self, user: UserSession) -> Result<(), SessionError> {
        let raw = serde_json::to_string(&user)?;
        self.storage.set(keys::USER, &raw).await?;

        info!("User logged in");
        self.current = Some(user);
        Ok(())
    }

    /// Erase the persisted user and forget the current one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the record cannot be deleted; the user stays
    /// logged in.
    #[instrument(skip(self))]
    pub async fn logout(&mut self) -> Result<(), SessionError> {
        self.storage.delete(keys::USER).await?;

        if let Some(user) = self.current.take() {
            info!(user_id = %user.id, "User logged out");
        }
        Ok(())
    }
}
