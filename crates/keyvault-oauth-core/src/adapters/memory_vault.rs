//! # In-Memory Vault Implementation
//!
//! Thread-safe in-memory backend for testing and development.
//! Secrets are keyed by vault URL and name and may hold several versions.
//! Failures can be scripted ahead of time to simulate throttling or outages.

use crate::{
    backend::VaultBackend,
    errors::VaultError,
    secret::{FetchedSecret, SecretValue},
};
use async_trait::async_trait;
use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard},
};
use tokio::time::Instant;

/// A fetch observed by the in-memory backend
#[derive(Debug, Clone)]
pub struct FetchCall {
    /// Vault URL the fetch was sent to
    pub vault_url: String,

    /// Requested secret name
    pub secret_name: String,

    /// Requested version (empty for latest)
    pub version: String,

    /// When the fetch arrived, on the tokio clock
    pub at: Instant,
}

#[derive(Default)]
struct State {
    // (vault_url, secret_name) -> versions, oldest first
    secrets: HashMap<(String, String), Vec<(String, SecretValue)>>,
    failures: VecDeque<VaultError>,
    calls: Vec<FetchCall>,
}

/// In-memory vault backend
///
/// Clones share the same storage, so a test can keep a handle while the
/// client owns another.
#[derive(Clone, Default)]
pub struct InMemoryVaultBackend {
    state: Arc<Mutex<State>>,
}

impl InMemoryVaultBackend {
    /// Create new empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new version of a secret; it becomes the latest
    pub fn add_secret(
        &self,
        vault_url: impl Into<String>,
        secret_name: impl Into<String>,
        version: impl Into<String>,
        value: impl Into<SecretValue>,
    ) {
        self.lock()
            .secrets
            .entry((vault_url.into(), secret_name.into()))
            .or_default()
            .push((version.into(), value.into()));
    }

    /// Remove every version of a secret
    pub fn remove_secret(&self, vault_url: &str, secret_name: &str) {
        self.lock()
            .secrets
            .remove(&(vault_url.to_string(), secret_name.to_string()));
    }

    /// Fail the next fetch with `error`
    ///
    /// Scripted failures are consumed in order, one per fetch, before any
    /// lookup happens.
    pub fn enqueue_failure(&self, error: VaultError) {
        self.lock().failures.push_back(error);
    }

    /// Throttle the next `count` fetches with HTTP 429
    pub fn throttle_next(&self, count: usize) {
        let mut state = self.lock();
        for _ in 0..count {
            state
                .failures
                .push_back(VaultError::throttled("Too many requests"));
        }
    }

    /// Fetches observed so far
    pub fn calls(&self) -> Vec<FetchCall> {
        self.lock().calls.clone()
    }

    /// Number of fetches observed so far
    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    /// Scripted failures not yet consumed
    pub fn pending_failures(&self) -> usize {
        self.lock().failures.len()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl VaultBackend for InMemoryVaultBackend {
    async fn fetch_secret(
        &self,
        vault_url: &str,
        secret_name: &str,
        version: &str,
    ) -> Result<FetchedSecret, VaultError> {
        let mut state = self.lock();

        state.calls.push(FetchCall {
            vault_url: vault_url.to_string(),
            secret_name: secret_name.to_string(),
            version: version.to_string(),
            at: Instant::now(),
        });

        if let Some(error) = state.failures.pop_front() {
            return Err(error);
        }

        let versions = state
            .secrets
            .get(&(vault_url.to_string(), secret_name.to_string()))
            .ok_or_else(|| {
                VaultError::http(404, format!("Secret not found: {}", secret_name))
            })?;

        let found = if version.is_empty() {
            versions.last()
        } else {
            versions.iter().find(|(v, _)| v == version)
        };

        found
            .map(|(v, value)| FetchedSecret::new(value.clone()).with_version(v.clone()))
            .ok_or_else(|| {
                VaultError::http(
                    404,
                    format!("Secret version not found: {}/{}", secret_name, version),
                )
            })
    }
}

#[cfg(test)]
#[path = "memory_vault_tests.rs"]
mod tests;
