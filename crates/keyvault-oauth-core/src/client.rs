//! # Secret Client
//!
//! Wraps a [`VaultBackend`] with authentication selection, vault URL
//! derivation and backoff on throttling.
//!
//! A fetch that the vault answers with HTTP 429 is retried after
//! `base_delay * 2^min(attempt, exponent_cap)`; every other failure is
//! returned on the spot.

use crate::{
    auth::{AuthMode, AuthProvider},
    backend::VaultBackend,
    cloud::VaultUrlTemplate,
    config::ClientConfig,
    errors::{SecretClientError, VaultError},
    retry::{RetryPolicy, RetryState},
    secret::{SecretValue, SecretVersion},
};
use std::{fmt, sync::Arc};
use tracing::{debug, error, info, instrument, warn, Instrument, Span};

/// Per-call fetch options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Version to fetch
    pub version: SecretVersion,

    /// Retry budget for this call; `None` uses the client's policy
    pub max_retries: Option<u32>,
}

impl FetchOptions {
    /// Options fetching the latest version with the client's retry policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a specific version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = SecretVersion::new(version);
        self
    }

    /// Override the retry budget
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }
}

/// Key Vault secret client
///
/// Holds the vault capability as a field and delegates fetches to it. The
/// authentication flow is fixed at construction.
pub struct SecretClient {
    backend: Arc<dyn VaultBackend>,
    auth: AuthProvider,
    url_template: VaultUrlTemplate,
    retry_policy: RetryPolicy,
    span: Span,
}

impl SecretClient {
    /// Create a client
    ///
    /// The authentication provider is selected from `config` and handed to
    /// `init_backend`, which builds the vault capability for it.
    ///
    /// # Errors
    /// `SecretClientError::Configuration` when the configuration is invalid or
    /// the backend cannot be initialised.
    #[instrument(skip(config, init_backend), fields(auth_mode))]
    pub fn new<F>(config: &ClientConfig, init_backend: F) -> Result<Self, SecretClientError>
    where
        F: FnOnce(&AuthProvider) -> Result<Arc<dyn VaultBackend>, VaultError>,
    {
        if let Err(e) = config.validate() {
            error!(error = %e, "Invalid secret client configuration");
            return Err(e);
        }

        let auth = AuthProvider::from_config(config)?;
        Span::current().record("auth_mode", tracing::field::display(auth.mode()));

        let url_template = VaultUrlTemplate::for_cloud(&config.cloud);

        let backend = init_backend(&auth).map_err(|e| {
            error!(error = %e, "Failed to initialise vault backend");
            SecretClientError::configuration(format!("failed to initialise vault backend: {}", e))
        })?;

        info!(
            url_template = %url_template,
            max_retries = config.retry.max_retries,
            "Secret client created"
        );

        Ok(Self {
            backend,
            auth,
            url_template,
            retry_policy: config.retry.clone(),
            span: Span::none(),
        })
    }

    /// Create a client around an existing backend
    pub fn with_backend(
        config: &ClientConfig,
        backend: Arc<dyn VaultBackend>,
    ) -> Result<Self, SecretClientError> {
        Self::new(config, |_| Ok(backend))
    }

    /// Create a client backed by Azure Key Vault
    #[cfg(feature = "azure")]
    pub fn azure(config: &ClientConfig) -> Result<Self, SecretClientError> {
        Self::new(config, |auth| {
            let backend = crate::adapters::AzureVaultBackend::new(auth)?;
            Ok(Arc::new(backend) as Arc<dyn VaultBackend>)
        })
    }

    /// Emit this client's log events inside `span`
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Endpoint URL for a vault short name
    pub fn vault_url(&self, vault_name: &str) -> String {
        self.url_template.render(vault_name)
    }

    /// Template vault URLs are rendered from
    pub fn url_template(&self) -> &VaultUrlTemplate {
        &self.url_template
    }

    /// Authentication flow in use
    pub fn auth_mode(&self) -> AuthMode {
        self.auth.mode()
    }

    /// Authentication provider in use
    pub fn auth_provider(&self) -> &AuthProvider {
        &self.auth
    }

    /// Retry policy applied when a call does not override it
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Fetch the latest version of a secret by vault short name
    pub async fn get_secret_by_vault_name(
        &self,
        vault_name: &str,
        secret_name: &str,
    ) -> Result<SecretValue, SecretClientError> {
        self.get_secret_by_vault_name_with(vault_name, secret_name, &FetchOptions::default())
            .await
    }

    /// Fetch a secret by vault short name
    ///
    /// Throttled (HTTP 429) attempts are retried with exponential backoff
    /// until the retry budget is spent, so at most `max_retries + 1` fetches
    /// are made.
    ///
    /// # Errors
    /// - `SecretClientError::Throttled` when every attempt was throttled
    /// - `SecretClientError::Vault` for any other backend failure, on the
    ///   attempt it happened
    pub async fn get_secret_by_vault_name_with(
        &self,
        vault_name: &str,
        secret_name: &str,
        options: &FetchOptions,
    ) -> Result<SecretValue, SecretClientError> {
        self.fetch_with_backoff(vault_name, secret_name, options)
            .instrument(self.span.clone())
            .await
    }

    async fn fetch_with_backoff(
        &self,
        vault_name: &str,
        secret_name: &str,
        options: &FetchOptions,
    ) -> Result<SecretValue, SecretClientError> {
        let vault_url = self.vault_url(vault_name);
        let auth_mode = self.auth.mode();
        let policy = match options.max_retries {
            Some(max_retries) => self.retry_policy.clone().with_max_retries(max_retries),
            None => self.retry_policy.clone(),
        };
        let mut retry_state = RetryState::new();

        loop {
            match self
                .backend
                .fetch_secret(&vault_url, secret_name, options.version.as_str())
                .await
            {
                Ok(fetched) => {
                    debug!(
                        vault_url = %vault_url,
                        secret_name,
                        secret_version = fetched.version.as_deref().unwrap_or("unknown"),
                        total_attempts = retry_state.total_attempts,
                        "Fetched secret"
                    );
                    return Ok(fetched.value);
                }

                Err(error) if error.is_throttled() && retry_state.can_retry(&policy) => {
                    let delay = retry_state.get_delay(&policy);

                    warn!(
                        vault_url = %vault_url,
                        secret_name,
                        secret_version = %options.version,
                        auth_mode = %auth_mode,
                        attempt = retry_state.total_attempts,
                        delay_secs = delay.as_secs(),
                        "Secret fetch throttled, backing off"
                    );

                    tokio::time::sleep(delay).await;
                    retry_state.next_attempt();
                }

                Err(error) => {
                    error!(
                        vault_url = %vault_url,
                        secret_name,
                        secret_version = %options.version,
                        auth_mode = %auth_mode,
                        error = %error,
                        total_attempts = retry_state.total_attempts,
                        "Failed to fetch secret"
                    );

                    if error.is_throttled() {
                        return Err(SecretClientError::Throttled {
                            vault_url,
                            secret_name: secret_name.to_string(),
                            attempts: retry_state.total_attempts,
                            source: error,
                        });
                    }

                    return Err(SecretClientError::Vault(error));
                }
            }
        }
    }
}

impl fmt::Debug for SecretClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretClient")
            .field("auth_mode", &self.auth.mode())
            .field("url_template", &self.url_template)
            .field("retry_policy", &self.retry_policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
