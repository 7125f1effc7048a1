//! # Secret Types
//!
//! Value containers shared by the client and the vault backends.

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroizing;

/// Secure container for secret values
///
/// The buffer is zeroed when the value is dropped. Secret values are never
/// included in Debug output or logs.
#[derive(Clone)]
pub struct SecretValue {
    inner: Zeroizing<String>,
}

impl SecretValue {
    /// Create secret value from string
    ///
    /// Takes ownership of the string so the only copy lives in the
    /// zeroizing buffer.
    pub fn from_string(value: String) -> Self {
        Self {
            inner: Zeroizing::new(value),
        }
    }

    /// Get secret as string (only for immediate use)
    ///
    /// # Security Warning
    /// The returned string contains the actual secret value.
    /// Use immediately and avoid storing in variables.
    pub fn expose_secret(&self) -> &str {
        &self.inner
    }

    /// Check if secret is empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Get secret length without exposing content
    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretValue")
            .field("length", &self.len())
            .field("value", &"[REDACTED]")
            .finish()
    }
}

impl From<String> for SecretValue {
    fn from(value: String) -> Self {
        Self::from_string(value)
    }
}

impl From<&str> for SecretValue {
    fn from(value: &str) -> Self {
        Self::from_string(value.to_string())
    }
}

/// Version selector for a secret fetch
///
/// Key Vault addresses the current version of a secret with an empty version
/// segment, so `Latest` is rendered as `""` on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SecretVersion {
    /// Current version of the secret
    #[default]
    Latest,

    /// A specific version identifier
    Specific(String),
}

impl SecretVersion {
    /// Create a version selector from an identifier; empty means latest
    pub fn new(version: impl Into<String>) -> Self {
        let version = version.into();
        if version.is_empty() {
            Self::Latest
        } else {
            Self::Specific(version)
        }
    }

    /// Version segment passed to the backend
    pub fn as_str(&self) -> &str {
        match self {
            Self::Latest => "",
            Self::Specific(version) => version,
        }
    }

    /// Whether this selects the current version
    pub fn is_latest(&self) -> bool {
        matches!(self, Self::Latest)
    }
}

impl fmt::Display for SecretVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => write!(f, "latest"),
            Self::Specific(version) => write!(f, "{}", version),
        }
    }
}

/// A secret as returned by a vault backend
#[derive(Debug, Clone)]
pub struct FetchedSecret {
    /// Secret value
    pub value: SecretValue,

    /// Version identifier reported by the vault, if any
    pub version: Option<String>,
}

impl FetchedSecret {
    /// Create a fetched secret without version information
    pub fn new(value: impl Into<SecretValue>) -> Self {
        Self {
            value: value.into(),
            version: None,
        }
    }

    /// Attach the version reported by the vault
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

#[cfg(test)]
#[path = "secret_tests.rs"]
mod tests;
