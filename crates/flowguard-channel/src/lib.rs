//! Receive primitives for workflow signal channels.
//!
//! [`receive_with_timeout`] waits for the next signal while racing a deadline
//! and the cancellation of the enclosing [`Scope`](flowguard_scope::Scope).
//! [`drain`] discards everything currently buffered without waiting.

mod channel;
mod config;
mod drain;
mod error;
mod receive;

pub use channel::ReceiveChannel;
pub use config::ReceiveConfig;
pub use drain::{drain, drain_with};
pub use error::ConfigError;
pub use receive::{ReceiveOutcome, receive_or_timeout, receive_with_timeout};
