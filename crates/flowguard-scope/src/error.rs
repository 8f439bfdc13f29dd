use thiserror::Error;

/// A wait resolved because its scope was cancelled before it completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("scope was cancelled")]
pub struct Cancelled;
