//! # Retry Policy Module
//!
//! Exponential backoff for throttled secret fetches.
//!
//! Delays grow as `base_delay * 2^attempt` until the exponent reaches
//! `exponent_cap`, after which every further retry waits the capped delay.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry policy configuration for exponential backoff
///
/// # Examples
///
/// ```rust
/// use keyvault_oauth_core::RetryPolicy;
/// use std::time::Duration;
///
/// // Default policy: 5 retries, 1s base, exponent capped at 4 (16s)
/// let policy = RetryPolicy::default();
/// assert_eq!(policy.calculate_delay(0), Duration::from_secs(1));
/// assert_eq!(policy.calculate_delay(9), Duration::from_secs(16));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts after the initial try
    pub max_retries: u32,

    /// Delay before the first retry, in seconds
    pub base_delay_seconds: u64,

    /// Largest exponent applied to the base delay
    pub exponent_cap: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay_seconds: 1,
            exponent_cap: 4,
        }
    }
}

impl RetryPolicy {
    /// Create a new retry policy
    ///
    /// # Arguments
    ///
    /// * `max_retries` - Retries after the initial attempt
    /// * `base_delay_seconds` - Delay before the first retry
    /// * `exponent_cap` - Largest exponent, bounding the longest delay
    pub fn new(max_retries: u32, base_delay_seconds: u64, exponent_cap: u32) -> Self {
        Self {
            max_retries,
            base_delay_seconds,
            exponent_cap,
        }
    }

    /// Same policy with a different retry budget
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Calculate delay before a specific retry attempt
    ///
    /// Formula: `base_delay * 2^min(attempt, exponent_cap)`
    ///
    /// # Arguments
    ///
    /// * `attempt` - Retry attempt number (0-based)
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(self.exponent_cap);
        let factor = 2u64.checked_pow(exponent).unwrap_or(u64::MAX);

        Duration::from_secs(self.base_delay_seconds.saturating_mul(factor))
    }

    /// Check if we should retry for this attempt number
    ///
    /// # Arguments
    ///
    /// * `attempt` - Current attempt number (0-based, where 0 is first retry)
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }

    /// Get total number of attempts (initial + retries)
    pub fn total_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Longest single delay this policy will ever produce
    pub fn max_delay(&self) -> Duration {
        self.calculate_delay(self.exponent_cap)
    }
}

/// Progress through a retry loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryState {
    /// Current retry attempt (0-based)
    pub attempt: u32,

    /// Fetches made so far, including the initial one
    pub total_attempts: u32,
}

impl Default for RetryState {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryState {
    /// Create new retry state for the initial attempt
    pub fn new() -> Self {
        Self {
            attempt: 0,
            total_attempts: 1,
        }
    }

    /// Move on to the next retry attempt
    pub fn next_attempt(&mut self) {
        self.attempt += 1;
        self.total_attempts += 1;
    }

    /// Delay to wait before the next attempt
    pub fn get_delay(&self, policy: &RetryPolicy) -> Duration {
        policy.calculate_delay(self.attempt)
    }

    /// Check if the policy allows another attempt
    pub fn can_retry(&self, policy: &RetryPolicy) -> bool {
        policy.should_retry(self.attempt)
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
