//! # Vault Adapters
//!
//! Implementations of [`VaultBackend`](crate::VaultBackend).

pub mod memory_vault;

#[cfg(feature = "azure")]
pub mod azure_key_vault;

pub use memory_vault::{FetchCall, InMemoryVaultBackend};

#[cfg(feature = "azure")]
pub use azure_key_vault::AzureVaultBackend;
