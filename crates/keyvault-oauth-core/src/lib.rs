//! # Key Vault OAuth Core
//!
//! Secret client for Azure Key Vault that authenticates with either a
//! managed identity or a service principal, derives vault endpoints from
//! short vault names, and backs off when the vault throttles requests.
//!
//! ## Architecture
//!
//! - [`SecretClient`] owns a [`VaultBackend`] and delegates fetches to it
//! - The [`AuthProvider`] is selected once, from [`ClientConfig`]
//! - Backends: [`InMemoryVaultBackend`] for tests and local development,
//!   `AzureVaultBackend` behind the `azure` feature
//!
//! ## Usage
//!
//! ```rust
//! use keyvault_oauth_core::{ClientConfig, InMemoryVaultBackend, SecretClient};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), keyvault_oauth_core::SecretClientError> {
//! let backend = InMemoryVaultBackend::new();
//! backend.add_secret("https://mykv.vault.azure.net/", "db-password", "v1", "s3cr3t");
//!
//! let config = ClientConfig::managed_identity(None);
//! let client = SecretClient::with_backend(&config, Arc::new(backend))?;
//!
//! let secret = client.get_secret_by_vault_name("mykv", "db-password").await?;
//! assert_eq!(secret.expose_secret(), "s3cr3t");
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod auth;
pub mod backend;
pub mod client;
pub mod cloud;
pub mod config;
pub mod errors;
pub mod retry;
pub mod secret;

pub use adapters::{FetchCall, InMemoryVaultBackend};
pub use auth::{AuthMode, AuthProvider, ClientCredentialsProvider, ManagedIdentityProvider};
pub use backend::VaultBackend;
pub use client::{FetchOptions, SecretClient};
pub use cloud::{CloudEnvironment, VaultUrlTemplate};
pub use config::ClientConfig;
pub use errors::{SecretClientError, VaultError, TOO_MANY_REQUESTS};
pub use retry::{RetryPolicy, RetryState};
pub use secret::{FetchedSecret, SecretValue, SecretVersion};

#[cfg(feature = "azure")]
pub use adapters::AzureVaultBackend;
