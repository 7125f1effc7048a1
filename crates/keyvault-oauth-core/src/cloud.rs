//! # Cloud Environments
//!
//! Endpoint suffixes for the Azure clouds and the per-vault URL template
//! derived from them.

use crate::errors::SecretClientError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Placeholder substituted with the vault short name
const VAULT_NAME_PLACEHOLDER: &str = "{name}";

/// Azure cloud the vault lives in
///
/// Determines the vault DNS suffix, the token resource for Key Vault and the
/// Azure AD authority host used by client-credential auth.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloudEnvironment {
    /// Azure public cloud (`vault.azure.net`)
    #[default]
    #[serde(rename = "public")]
    AzurePublic,

    /// Azure China cloud (`vault.azure.cn`)
    #[serde(rename = "china")]
    AzureChina,

    /// Azure US Government cloud (`vault.usgovcloudapi.net`)
    #[serde(rename = "usgov")]
    AzureUsGovernment,

    /// Any other cloud, described explicitly
    #[serde(rename = "custom")]
    Custom {
        /// DNS suffix of vault endpoints, e.g. `vault.example.net`
        vault_dns_suffix: String,
        /// Token resource for the vault service
        resource: String,
        /// Azure AD authority host
        authority_host: String,
    },
}

impl CloudEnvironment {
    /// DNS suffix appended to the vault short name
    pub fn vault_dns_suffix(&self) -> &str {
        match self {
            Self::AzurePublic => "vault.azure.net",
            Self::AzureChina => "vault.azure.cn",
            Self::AzureUsGovernment => "vault.usgovcloudapi.net",
            Self::Custom {
                vault_dns_suffix, ..
            } => vault_dns_suffix,
        }
    }

    /// Resource tokens are requested for
    pub fn vault_resource(&self) -> &str {
        match self {
            Self::AzurePublic => "https://vault.azure.net",
            Self::AzureChina => "https://vault.azure.cn",
            Self::AzureUsGovernment => "https://vault.usgovcloudapi.net",
            Self::Custom { resource, .. } => resource,
        }
    }

    /// Azure AD authority host for client-credential token exchange
    pub fn authority_host(&self) -> &str {
        match self {
            Self::AzurePublic => "https://login.microsoftonline.com",
            Self::AzureChina => "https://login.chinacloudapi.cn",
            Self::AzureUsGovernment => "https://login.microsoftonline.us",
            Self::Custom { authority_host, .. } => authority_host,
        }
    }

    /// Check that a custom cloud is fully described
    pub fn validate(&self) -> Result<(), SecretClientError> {
        if let Self::Custom {
            vault_dns_suffix,
            resource,
            authority_host,
        } = self
        {
            let suffix = normalise_dns_suffix(vault_dns_suffix);

            if suffix.is_empty() {
                return Err(SecretClientError::configuration(
                    "custom cloud requires a vault DNS suffix",
                ));
            }

            if suffix.contains('/') {
                return Err(SecretClientError::configuration(format!(
                    "vault DNS suffix '{}' must be a bare host suffix",
                    vault_dns_suffix
                )));
            }

            for (field, value) in [("resource", resource), ("authority_host", authority_host)] {
                if !value.starts_with("https://") {
                    return Err(SecretClientError::configuration(format!(
                        "custom cloud {} must use HTTPS, got '{}'",
                        field, value
                    )));
                }
            }
        }

        Ok(())
    }
}

impl fmt::Display for CloudEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AzurePublic => write!(f, "public"),
            Self::AzureChina => write!(f, "china"),
            Self::AzureUsGovernment => write!(f, "usgov"),
            Self::Custom {
                vault_dns_suffix, ..
            } => write!(f, "custom({})", vault_dns_suffix),
        }
    }
}

impl FromStr for CloudEnvironment {
    type Err = SecretClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "public" | "azurecloud" => Ok(Self::AzurePublic),
            "china" | "azurechinacloud" => Ok(Self::AzureChina),
            "usgov" | "azureusgovernment" => Ok(Self::AzureUsGovernment),
            other => Err(SecretClientError::configuration(format!(
                "unknown cloud '{}', expected one of: public, china, usgov",
                other
            ))),
        }
    }
}

/// Template for per-vault endpoint URLs
///
/// Built once from a vault DNS suffix, e.g. `https://{name}.vault.azure.net/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultUrlTemplate {
    template: String,
}

impl VaultUrlTemplate {
    /// Create a template for vaults under the given DNS suffix
    pub fn from_dns_suffix(suffix: &str) -> Self {
        let suffix = normalise_dns_suffix(suffix);
        Self {
            template: format!("https://{}.{}/", VAULT_NAME_PLACEHOLDER, suffix),
        }
    }

    /// Create a template for the given cloud
    pub fn for_cloud(cloud: &CloudEnvironment) -> Self {
        Self::from_dns_suffix(cloud.vault_dns_suffix())
    }

    /// Render the endpoint URL for a vault short name
    pub fn render(&self, vault_name: &str) -> String {
        self.template.replace(VAULT_NAME_PLACEHOLDER, vault_name)
    }

    /// Get the raw template string
    pub fn as_str(&self) -> &str {
        &self.template
    }
}

impl fmt::Display for VaultUrlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.template)
    }
}

/// Strip surrounding whitespace, a leading `.` and trailing `/`
fn normalise_dns_suffix(suffix: &str) -> &str {
    suffix.trim().trim_start_matches('.').trim_end_matches('/')
}

#[cfg(test)]
#[path = "cloud_tests.rs"]
mod tests;
