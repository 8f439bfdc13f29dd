use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

const DEFAULT_TIMEOUT_MS: u64 = 30 * 60 * 1000;

/// Deadline settings for signal receives.
///
/// ```toml
/// timeout-ms = 1800000
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ReceiveConfig {
    timeout_ms: u64,
}

impl Default for ReceiveConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl ReceiveConfig {
    /// Parse a configuration table. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the input is not valid TOML or a key
    /// has the wrong type.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
