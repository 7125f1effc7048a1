//! # Error Types
//!
//! `VaultError` is what a vault backend reports; `SecretClientError` is what
//! the client hands back to its callers.

/// HTTP status used by Key Vault to signal throttling
pub const TOO_MANY_REQUESTS: u16 = 429;

/// Errors reported by a vault backend
///
/// Backends map their native failures onto these variants. Anything with an
/// HTTP status goes into `Http` so the client can recognise throttling.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("Vault request failed with HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Vault request could not be completed: {message}")]
    Transport { message: String },
}

impl VaultError {
    /// Create an HTTP error
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Create a throttling (HTTP 429) error
    pub fn throttled(message: impl Into<String>) -> Self {
        Self::http(TOO_MANY_REQUESTS, message)
    }

    /// Create an authentication error
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// HTTP status carried by the error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if the vault asked us to slow down
    pub fn is_throttled(&self) -> bool {
        self.status_code() == Some(TOO_MANY_REQUESTS)
    }
}

/// Errors returned by [`SecretClient`](crate::SecretClient)
#[derive(Debug, thiserror::Error)]
pub enum SecretClientError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Throttled fetching secret {secret_name} from {vault_url} after {attempts} attempts")]
    Throttled {
        vault_url: String,
        secret_name: String,
        attempts: u32,
        #[source]
        source: VaultError,
    },

    /// Any other backend failure, passed through unchanged
    #[error(transparent)]
    Vault(#[from] VaultError),
}

impl SecretClientError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Check if this is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Check if the retry budget was spent on throttling
    pub fn is_throttled(&self) -> bool {
        matches!(self, Self::Throttled { .. })
    }

    /// Underlying backend error, if this error came from the vault
    pub fn vault_error(&self) -> Option<&VaultError> {
        match self {
            Self::Throttled { source, .. } => Some(source),
            Self::Vault(error) => Some(error),
            Self::Configuration { .. } => None,
        }
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;
