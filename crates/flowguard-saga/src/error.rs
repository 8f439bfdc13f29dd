use std::fmt;

use thiserror::Error;

/// A single compensation that reported failure.
#[derive(Debug, Error)]
#[error("compensation '{step}' failed")]
pub struct CompensationFailure<E> {
    /// Name the compensation was registered under.
    pub step: String,
    /// The error the compensation returned.
    #[source]
    pub error: E,
}

/// Failures collected while running compensations in parallel.
///
/// Failures are kept in registration order, not in the order the
/// compensations finished.
#[derive(Debug)]
pub struct CompensationError<E> {
    failures: Vec<CompensationFailure<E>>,
}

impl<E> CompensationError<E> {
    pub(crate) fn new() -> Self {
        Self {
            failures: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, failure: CompensationFailure<E>) {
        self.failures.push(failure);
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.failures.is_empty()
    }

    #[must_use]
    pub fn failures(&self) -> &[CompensationFailure<E>] {
        &self.failures
    }

    #[must_use]
    pub fn into_failures(self) -> Vec<CompensationFailure<E>> {
        self.failures
    }
}

impl<E: fmt::Display> fmt::Display for CompensationError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failures.is_empty() {
            return write!(f, "no errors in saga compensation");
        }
        write!(f, "error(s) in saga compensation: ")?;
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", failure.error)?;
        }
        Ok(())
    }
}

impl<E> std::error::Error for CompensationError<E> where E: fmt::Debug + fmt::Display {}

/// Error from running a saga's compensations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SagaError<E> {
    /// A sequential compensation failed; older compensations were skipped.
    #[error("compensation '{step}' failed")]
    StepFailed {
        /// Name of the compensation that failed.
        step: String,
        /// The error it returned.
        #[source]
        source: E,
    },

    /// One or more parallel compensations failed.
    #[error(transparent)]
    Compensation(CompensationError<E>),

    /// Compensation was requested on a saga that already compensated.
    ///
    /// This is a programming error, never a business failure, and must not
    /// be retried.
    #[error("saga compensation must only run once")]
    AlreadyCompensated,
}

impl<E> SagaError<E> {
    /// Whether this error reports misuse of the saga rather than a failed
    /// compensation.
    #[must_use]
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::AlreadyCompensated)
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid saga options: {0}")]
    Parse(#[from] toml::de::Error),
}
