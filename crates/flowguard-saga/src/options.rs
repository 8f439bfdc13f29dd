use serde::Deserialize;

use crate::error::ConfigError;

/// How a saga runs its compensations.
///
/// Read from a TOML table with kebab-case keys; missing keys are `false`:
///
/// ```toml
/// parallel-compensation = true
/// continue-with-error = false
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SagaOptions {
    parallel_compensation: bool,
    continue_with_error: bool,
}

impl SagaOptions {
    /// Compensate one step at a time, most recent first, stopping at the
    /// first failure.
    #[must_use]
    pub fn sequential() -> Self {
        Self::default()
    }

    /// Compensate all steps concurrently and collect every failure.
    #[must_use]
    pub fn parallel() -> Self {
        Self {
            parallel_compensation: true,
            ..Self::default()
        }
    }

    /// Keep compensating older steps after one fails. Only affects
    /// sequential compensation.
    #[must_use]
    pub fn with_continue_with_error(mut self, continue_with_error: bool) -> Self {
        self.continue_with_error = continue_with_error;
        self
    }

    /// Parse options from a TOML table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the input is not valid TOML or a key
    /// has the wrong type.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    #[must_use]
    pub fn parallel_compensation(&self) -> bool {
        self.parallel_compensation
    }

    #[must_use]
    pub fn continue_with_error(&self) -> bool {
        self.continue_with_error
    }
}
