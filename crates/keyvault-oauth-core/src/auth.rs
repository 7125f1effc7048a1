//! # Authentication Providers
//!
//! The two ways the client can obtain tokens for Key Vault:
//! - Managed identity (system- or user-assigned), no secrets in config
//! - Service principal client credentials (client ID, secret and tenant)
//!
//! The provider is chosen once, when the client is built. Token acquisition
//! itself belongs to the vault SDK; a provider only carries what its flow
//! needs.

use crate::{
    cloud::CloudEnvironment, config::ClientConfig, errors::SecretClientError, secret::SecretValue,
};
use serde::Serialize;
use std::fmt;

/// Which authentication flow a client uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Managed identity endpoint
    ManagedIdentity,

    /// Client ID + secret exchanged with the tenant's authority
    ClientCredentials,
}

impl AuthMode {
    /// Check if this is managed identity auth
    pub fn is_managed_identity(&self) -> bool {
        matches!(self, Self::ManagedIdentity)
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ManagedIdentity => write!(f, "managed_identity"),
            Self::ClientCredentials => write!(f, "client_credentials"),
        }
    }
}

/// Managed identity token provider settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedIdentityProvider {
    client_id: Option<String>,
    resource: String,
}

impl ManagedIdentityProvider {
    /// Create provider for the given resource
    ///
    /// `client_id` selects a user-assigned identity; `None` uses the
    /// system-assigned one.
    pub fn new(client_id: Option<String>, resource: impl Into<String>) -> Self {
        Self {
            client_id: client_id.filter(|id| !id.trim().is_empty()),
            resource: resource.into(),
        }
    }

    /// Client ID of a user-assigned identity
    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    /// Resource tokens are requested for
    pub fn resource(&self) -> &str {
        &self.resource
    }
}

/// Service principal (client credential) token provider settings
#[derive(Debug, Clone)]
pub struct ClientCredentialsProvider {
    tenant_id: String,
    client_id: String,
    client_secret: SecretValue,
    resource: String,
    authority_host: String,
}

impl ClientCredentialsProvider {
    /// Create provider for the given tenant and application
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: SecretValue,
        cloud: &CloudEnvironment,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret,
            resource: cloud.vault_resource().to_string(),
            authority_host: cloud.authority_host().to_string(),
        }
    }

    /// Azure AD tenant ID
    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    /// Application (client) ID
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Client secret
    pub fn client_secret(&self) -> &SecretValue {
        &self.client_secret
    }

    /// Resource tokens are requested for
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Azure AD authority host
    pub fn authority_host(&self) -> &str {
        &self.authority_host
    }
}

/// Token provider selected for a client
#[derive(Debug, Clone)]
pub enum AuthProvider {
    ManagedIdentity(ManagedIdentityProvider),
    ClientCredentials(ClientCredentialsProvider),
}

impl AuthProvider {
    /// Select the provider described by a configuration
    ///
    /// # Errors
    /// `SecretClientError::Configuration` when managed identity is off and any
    /// of client ID, client secret or tenant ID is missing.
    pub fn from_config(config: &ClientConfig) -> Result<Self, SecretClientError> {
        if config.use_managed_identity {
            return Ok(Self::ManagedIdentity(ManagedIdentityProvider::new(
                config.client_id.clone(),
                config.cloud.vault_resource(),
            )));
        }

        match (
            non_empty(&config.client_id),
            non_empty(&config.client_secret),
            non_empty(&config.tenant_id),
        ) {
            (Some(client_id), Some(client_secret), Some(tenant_id)) => {
                Ok(Self::ClientCredentials(ClientCredentialsProvider::new(
                    tenant_id,
                    client_id,
                    SecretValue::from(client_secret),
                    &config.cloud,
                )))
            }
            _ => Err(SecretClientError::configuration(
                ClientConfig::MISSING_CREDENTIALS_MESSAGE,
            )),
        }
    }

    /// Flow this provider uses
    pub fn mode(&self) -> AuthMode {
        match self {
            Self::ManagedIdentity(_) => AuthMode::ManagedIdentity,
            Self::ClientCredentials(_) => AuthMode::ClientCredentials,
        }
    }

    /// Resource tokens are requested for
    pub fn resource(&self) -> &str {
        match self {
            Self::ManagedIdentity(provider) => provider.resource(),
            Self::ClientCredentials(provider) => provider.resource(),
        }
    }

    /// Client ID in use, if any
    pub fn client_id(&self) -> Option<&str> {
        match self {
            Self::ManagedIdentity(provider) => provider.client_id(),
            Self::ClientCredentials(provider) => Some(provider.client_id()),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
