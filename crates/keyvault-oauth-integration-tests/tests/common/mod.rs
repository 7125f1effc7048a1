//! Common test utilities for keyvault-oauth integration tests
//!
//! This module provides:
//! - A scripted vault backend that replays a fixed sequence of outcomes
//! - Configuration builders for both authentication modes

use async_trait::async_trait;
use keyvault_oauth_core::{ClientConfig, FetchedSecret, VaultBackend, VaultError};
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};
use tokio::time::Instant;

pub const VAULT_NAME: &str = "mykv";
pub const VAULT_URL: &str = "https://mykv.vault.azure.net/";

// ============================================================================
// Scripted Backend
// ============================================================================

/// Vault backend answering each fetch with the next scripted outcome
///
/// Runs out of script with a 500 so an unexpected extra fetch is visible.
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct ScriptedBackend {
    outcomes: Arc<Mutex<VecDeque<Result<String, VaultError>>>>,
    fetches: Arc<Mutex<Vec<Instant>>>,
}

#[allow(dead_code)]
impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_throttle(self) -> Self {
        self.push(Err(VaultError::throttled("Too many requests")))
    }

    pub fn then_fail(self, error: VaultError) -> Self {
        self.push(Err(error))
    }

    pub fn then_return(self, value: &str) -> Self {
        self.push(Ok(value.to_string()))
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.lock().unwrap().len()
    }

    /// Time between consecutive fetches
    pub fn gaps(&self) -> Vec<std::time::Duration> {
        self.fetches
            .lock()
            .unwrap()
            .windows(2)
            .map(|pair| pair[1] - pair[0])
            .collect()
    }

    fn push(self, outcome: Result<String, VaultError>) -> Self {
        self.outcomes.lock().unwrap().push_back(outcome);
        self
    }
}

#[async_trait]
impl VaultBackend for ScriptedBackend {
    async fn fetch_secret(
        &self,
        _vault_url: &str,
        _secret_name: &str,
        _version: &str,
    ) -> Result<FetchedSecret, VaultError> {
        self.fetches.lock().unwrap().push(Instant::now());

        match self.outcomes.lock().unwrap().pop_front() {
            Some(Ok(value)) => Ok(FetchedSecret::new(value)),
            Some(Err(error)) => Err(error),
            None => Err(VaultError::http(500, "script exhausted")),
        }
    }
}

// ============================================================================
// Configuration Builders
// ============================================================================

#[allow(dead_code)]
pub fn service_principal_config() -> ClientConfig {
    ClientConfig::client_credentials(
        "00000000-0000-0000-0000-000000000001",
        "client-secret-value",
        "00000000-0000-0000-0000-0000000000aa",
    )
}

#[allow(dead_code)]
pub fn managed_identity_config() -> ClientConfig {
    ClientConfig::managed_identity(None)
}
