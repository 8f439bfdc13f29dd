//! Saga compensation for long-running workflows.
//!
//! A [`Saga`] records the undo action of every forward step as the workflow
//! makes progress. When a later step fails, [`Saga::compensate`] runs those
//! undo actions exactly once, either most-recent-first or all at once as
//! configured by [`SagaOptions`].
//!
//! ```
//! use flowguard_saga::{Saga, SagaOptions};
//! use flowguard_scope::Scope;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let workflow = Scope::new();
//! let mut saga: Saga<std::io::Error> = Saga::new(&workflow, SagaOptions::sequential());
//!
//! // reserve a seat, then:
//! saga.add_compensation("release seat", |_scope| async { Ok(()) });
//!
//! // a later step failed:
//! assert!(saga.compensate().await.is_ok());
//! assert!(saga.compensate().await.is_err());
//! # }
//! ```

mod audit;
mod compensation;
mod error;
mod options;
mod saga;

pub use audit::{CompensationAuditLog, CompensationRecord, CompensationStatus};
pub use error::{CompensationError, CompensationFailure, ConfigError, SagaError};
pub use options::SagaOptions;
pub use saga::Saga;
