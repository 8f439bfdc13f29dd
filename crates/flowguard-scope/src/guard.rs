use crate::scope::Scope;

/// Cancels the wrapped scope when dropped.
///
/// Used to release a scope that only lives for the duration of a single
/// operation, whichever way that operation exits.
#[derive(Debug)]
#[must_use = "the scope is cancelled as soon as the guard is dropped"]
pub struct ScopeGuard {
    scope: Scope,
}

impl ScopeGuard {
    pub(crate) fn new(scope: Scope) -> Self {
        Self { scope }
    }

    /// The guarded scope.
    #[must_use]
    pub fn scope(&self) -> &Scope {
        &self.scope
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        self.scope.cancel();
    }
}
