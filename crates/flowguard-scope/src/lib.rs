//! Cancellable execution scopes for cooperatively scheduled workflows.
//!
//! A [`Scope`] is the context every wait in a workflow runs under. Scopes
//! form a tree: cancelling a scope resolves the pending waits of every scope
//! derived from it, while cancelling a derived scope leaves its parent alone.

mod error;
mod guard;
mod scope;

pub use error::Cancelled;
pub use guard::ScopeGuard;
pub use scope::Scope;
