//! # Azure Key Vault Implementation
//!
//! Production backend on the Azure SDK. Tokens come from either a managed
//! identity credential or a client secret credential, picked from the
//! client's [`AuthProvider`].

use crate::{
    auth::{AuthProvider, ClientCredentialsProvider, ManagedIdentityProvider},
    backend::VaultBackend,
    errors::VaultError,
    secret::FetchedSecret,
};
use async_trait::async_trait;
use azure_core::{auth::TokenCredential, error::ErrorKind, Url};
use azure_identity::{
    ClientSecretCredential, TokenCredentialOptions, VirtualMachineManagedIdentityCredential,
};
use azure_security_keyvault::SecretClient;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Build the SDK credential for a provider
///
/// # Errors
/// `VaultError::Authentication` if the provider settings cannot be turned
/// into a credential: a malformed authority host, or a user-assigned managed
/// identity.
pub fn token_credential(provider: &AuthProvider) -> Result<Arc<dyn TokenCredential>, VaultError> {
    match provider {
        AuthProvider::ManagedIdentity(settings) => managed_identity_credential(settings),
        AuthProvider::ClientCredentials(settings) => client_secret_credential(settings),
    }
}

/// System-assigned managed identity credential
///
/// The VM identity credential in azure_identity 0.21 cannot select a
/// user-assigned identity, so a client ID is rejected instead of being
/// dropped.
fn managed_identity_credential(
    settings: &ManagedIdentityProvider,
) -> Result<Arc<dyn TokenCredential>, VaultError> {
    if let Some(client_id) = settings.client_id() {
        return Err(VaultError::authentication(format!(
            "user-assigned managed identity '{}' is not supported by the Azure backend; \
             unset the client ID to use the system-assigned identity",
            client_id
        )));
    }

    Ok(Arc::new(VirtualMachineManagedIdentityCredential::new(
        TokenCredentialOptions::default(),
    )))
}

fn client_secret_credential(
    settings: &ClientCredentialsProvider,
) -> Result<Arc<dyn TokenCredential>, VaultError> {
    let authority_host = Url::parse(settings.authority_host()).map_err(|e| {
        VaultError::authentication(format!(
            "invalid authority host '{}': {}",
            settings.authority_host(),
            e
        ))
    })?;

    Ok(Arc::new(ClientSecretCredential::new(
        azure_core::new_http_client(),
        authority_host,
        settings.tenant_id().to_string(),
        settings.client_id().to_string(),
        settings.client_secret().expose_secret().to_string(),
    )))
}

/// Azure Key Vault backend
///
/// A `SecretClient` is bound to a single vault URL, so one is created per
/// fetch; the credential (and its token cache) is shared.
pub struct AzureVaultBackend {
    credential: Arc<dyn TokenCredential>,
}

impl AzureVaultBackend {
    /// Create backend authenticating with the given provider
    #[instrument(skip(provider), fields(auth_mode = %provider.mode()))]
    pub fn new(provider: &AuthProvider) -> Result<Self, VaultError> {
        Ok(Self {
            credential: token_credential(provider)?,
        })
    }

    /// Create backend with a custom credential
    ///
    /// Useful for testing or custom authentication scenarios
    pub fn with_credential(credential: Arc<dyn TokenCredential>) -> Self {
        Self { credential }
    }
}

#[async_trait]
impl VaultBackend for AzureVaultBackend {
    async fn fetch_secret(
        &self,
        vault_url: &str,
        secret_name: &str,
        version: &str,
    ) -> Result<FetchedSecret, VaultError> {
        debug!(vault_url, secret_name, version, "Fetching secret from Azure Key Vault");

        let client = SecretClient::new(vault_url, Arc::clone(&self.credential))
            .map_err(map_azure_error)?;

        let mut request = client.get(secret_name);
        if !version.is_empty() {
            request = request.version(version);
        }

        let secret = request.await.map_err(map_azure_error)?;

        let fetched = FetchedSecret::new(secret.value);
        Ok(match version_from_id(&secret.id) {
            Some(version) => fetched.with_version(version),
            None => fetched,
        })
    }
}

/// Map Azure SDK error to VaultError
///
/// HTTP responses keep their status so throttling (429) stays recognisable.
fn map_azure_error(error: azure_core::Error) -> VaultError {
    match error.kind() {
        ErrorKind::HttpResponse { status, .. } => VaultError::http(u16::from(*status), error.to_string()),
        ErrorKind::Credential => VaultError::authentication(error.to_string()),
        _ => VaultError::transport(error.to_string()),
    }
}

/// Version segment of a secret ID (`https://{vault}/secrets/{name}/{version}`)
fn version_from_id(id: &str) -> Option<&str> {
    let mut segments = id.trim_end_matches('/').rsplit('/');
    let version = segments.next()?;
    let _name = segments.next()?;
    (segments.next()? == "secrets").then_some(version)
}

#[cfg(test)]
#[path = "azure_key_vault_tests.rs"]
mod tests;
