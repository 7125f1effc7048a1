//! # Client Configuration
//!
//! Credentials, cloud selection and retry settings for a
//! [`SecretClient`](crate::SecretClient).
//!
//! Configuration can be built in code, read from the standard Azure
//! environment variables, or layered from a file plus `KEYVAULT_*`
//! environment overrides.

use crate::{cloud::CloudEnvironment, errors::SecretClientError, retry::RetryPolicy};
use serde::{Deserialize, Serialize};
use std::{fmt, path::Path};

/// Environment variable holding the application (client) ID
pub const ENV_CLIENT_ID: &str = "AZURE_CLIENT_ID";
/// Environment variable holding the client secret
pub const ENV_CLIENT_SECRET: &str = "AZURE_CLIENT_SECRET";
/// Environment variable holding the tenant ID
pub const ENV_TENANT_ID: &str = "AZURE_TENANT_ID";
/// Environment variable enabling managed identity
pub const ENV_USE_MSI: &str = "KEYVAULT_USE_MSI";
/// Environment variable selecting the cloud
pub const ENV_CLOUD: &str = "KEYVAULT_CLOUD";

/// Prefix for layered environment overrides in [`ClientConfig::load`]
const ENV_PREFIX: &str = "KEYVAULT";

/// Secret client configuration
///
/// Either `use_managed_identity` is set, or `client_id`, `client_secret` and
/// `tenant_id` are all present. With managed identity, `client_id` optionally
/// names a user-assigned identity.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Application (client) ID
    pub client_id: Option<String>,

    /// Client secret for service principal auth
    pub client_secret: Option<String>,

    /// Azure AD tenant ID
    pub tenant_id: Option<String>,

    /// Authenticate with managed identity instead of client credentials
    #[serde(alias = "use_msi")]
    pub use_managed_identity: bool,

    /// Cloud the vaults live in
    pub cloud: CloudEnvironment,

    /// Backoff applied to throttled fetches
    pub retry: RetryPolicy,
}

impl ClientConfig {
    pub(crate) const MISSING_CREDENTIALS_MESSAGE: &'static str =
        "You should either use managed identity, or pass a valid client ID, secret and tenant ID";

    /// Configuration for service principal auth
    pub fn client_credentials(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        tenant_id: impl Into<String>,
    ) -> Self {
        Self {
            client_id: Some(client_id.into()),
            client_secret: Some(client_secret.into()),
            tenant_id: Some(tenant_id.into()),
            ..Default::default()
        }
    }

    /// Configuration for managed identity auth
    ///
    /// Pass a client ID to use a user-assigned identity.
    pub fn managed_identity(client_id: Option<String>) -> Self {
        Self {
            client_id,
            use_managed_identity: true,
            ..Default::default()
        }
    }

    /// Set the cloud environment
    pub fn with_cloud(mut self, cloud: CloudEnvironment) -> Self {
        self.cloud = cloud;
        self
    }

    /// Set the retry policy
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Load configuration from the standard Azure environment variables
    ///
    /// Reads:
    /// - `AZURE_CLIENT_ID`, `AZURE_CLIENT_SECRET`, `AZURE_TENANT_ID`
    /// - `KEYVAULT_USE_MSI`: `true`/`1` enables managed identity
    /// - `KEYVAULT_CLOUD`: `public` (default), `china` or `usgov`
    ///
    /// # Errors
    /// Returns error if the variables do not form a valid configuration
    pub fn from_env() -> Result<Self, SecretClientError> {
        let use_managed_identity = match std::env::var(ENV_USE_MSI) {
            Ok(value) => parse_flag(ENV_USE_MSI, &value)?,
            Err(_) => false,
        };

        let cloud = match std::env::var(ENV_CLOUD) {
            Ok(value) => value.parse::<CloudEnvironment>()?,
            Err(_) => CloudEnvironment::default(),
        };

        let config = Self {
            client_id: std::env::var(ENV_CLIENT_ID).ok(),
            client_secret: std::env::var(ENV_CLIENT_SECRET).ok(),
            tenant_id: std::env::var(ENV_TENANT_ID).ok(),
            use_managed_identity,
            cloud,
            retry: RetryPolicy::default(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from an optional file with environment overrides
    ///
    /// Sources, later ones winning:
    /// 1. Built-in defaults
    /// 2. The file at `path` (TOML, YAML or JSON by extension), if given
    /// 3. `KEYVAULT_*` environment variables, `__` separating nested keys
    ///    (e.g. `KEYVAULT_RETRY__MAX_RETRIES=3`)
    ///
    /// # Errors
    /// Returns error if a source cannot be read or the result is invalid
    pub fn load(path: Option<&Path>) -> Result<Self, SecretClientError> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| {
                SecretClientError::configuration(format!("failed to read configuration: {}", e))
            })?;

        let config: Self = settings.try_deserialize().map_err(|e| {
            SecretClientError::configuration(format!("invalid configuration: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    ///
    /// Checks:
    /// - Without managed identity, client ID, secret and tenant ID are all set
    /// - A custom cloud is fully described
    pub fn validate(&self) -> Result<(), SecretClientError> {
        if !self.use_managed_identity {
            let present = |value: &Option<String>| {
                value.as_deref().is_some_and(|v| !v.trim().is_empty())
            };

            if !(present(&self.client_id) && present(&self.client_secret) && present(&self.tenant_id))
            {
                return Err(SecretClientError::configuration(
                    Self::MISSING_CREDENTIALS_MESSAGE,
                ));
            }
        }

        self.cloud.validate()
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("tenant_id", &self.tenant_id)
            .field("use_managed_identity", &self.use_managed_identity)
            .field("cloud", &self.cloud)
            .field("retry", &self.retry)
            .finish()
    }
}

fn parse_flag(variable: &str, value: &str) -> Result<bool, SecretClientError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "" | "0" | "false" | "no" => Ok(false),
        other => Err(SecretClientError::configuration(format!(
            "{} must be true or false, got '{}'",
            variable, other
        ))),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
