//! # Vault Backend Interface
//!
//! The capability the client wraps: a single "fetch secret" call against a
//! vault endpoint. Implementations handle provider-specific transport and
//! authentication and report failures as [`VaultError`].

use crate::{errors::VaultError, secret::FetchedSecret};
use async_trait::async_trait;

/// Interface to a secret vault
///
/// Implementations must report throttling as an HTTP 429
/// [`VaultError::Http`] so callers can back off.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VaultBackend: Send + Sync {
    /// Fetch a secret from the vault at `vault_url`
    ///
    /// An empty `version` selects the latest version.
    ///
    /// # Errors
    /// - `VaultError::Http` with status 429 when throttled
    /// - `VaultError::Http` for any other non-success response
    /// - `VaultError::Authentication` when no token could be obtained
    /// - `VaultError::Transport` when the request could not be completed
    async fn fetch_secret(
        &self,
        vault_url: &str,
        secret_name: &str,
        version: &str,
    ) -> Result<FetchedSecret, VaultError>;
}
