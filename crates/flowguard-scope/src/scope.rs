use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::watch;
use tracing::trace;

use crate::error::Cancelled;
use crate::guard::ScopeGuard;

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

/// A cancellable execution context.
///
/// Cloning a `Scope` yields another handle to the same context. Scopes
/// derived with [`Scope::child`] are cancelled together with their parent;
/// scopes derived with [`Scope::detached`] are not.
#[derive(Clone)]
pub struct Scope {
    inner: Arc<Inner>,
}

struct Inner {
    id: u64,
    cancelled: watch::Sender<bool>,
    children: Mutex<Vec<Weak<Inner>>>,
}

impl Inner {
    fn new() -> Self {
        let (cancelled, _) = watch::channel(false);
        Self {
            id: NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed),
            cancelled,
            children: Mutex::new(Vec::new()),
        }
    }

    fn cancel(&self) {
        if self.cancelled.send_replace(true) {
            return;
        }
        trace!(scope = self.id, "scope cancelled");

        // The flag is set before the children are taken, so a child that
        // registers concurrently either lands in this list or sees the flag.
        let children = std::mem::take(
            &mut *self
                .children
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        for child in children.iter().filter_map(Weak::upgrade) {
            child.cancel();
        }
    }
}

impl Scope {
    /// Create a root scope.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner::new()),
        }
    }

    /// Derive a scope that is cancelled whenever `self` is.
    ///
    /// Cancelling the returned scope does not affect `self`. A child of an
    /// already-cancelled scope starts out cancelled.
    #[must_use]
    pub fn child(&self) -> Self {
        let child = Self::new();
        {
            let mut children = self
                .inner
                .children
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            children.retain(|c| c.strong_count() > 0);
            children.push(Arc::downgrade(&child.inner));
        }
        trace!(scope = child.id(), parent = self.id(), "derived child scope");

        if self.is_cancelled() {
            child.inner.cancel();
        }
        child
    }

    /// Derive a scope that outlives the cancellation of `self`.
    ///
    /// The returned scope only ends through its own [`Scope::cancel`].
    #[must_use]
    pub fn detached(&self) -> Self {
        let detached = Self::new();
        trace!(
            scope = detached.id(),
            parent = self.id(),
            "derived detached scope"
        );
        detached
    }

    /// Process-unique identifier, used in log fields.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Cancel this scope and every scope derived from it with [`Scope::child`].
    ///
    /// Cancelling twice is a no-op.
    pub fn cancel(&self) {
        self.inner.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.inner.cancelled.borrow()
    }

    /// Resolve once this scope is cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.inner.cancelled.subscribe();
        // The sender lives in `self`, so the wait only ends through cancellation.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }

    /// Wait for `duration` to elapse under this scope.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if the scope is cancelled before the duration
    /// elapses, immediately if it already is.
    pub async fn timer(&self, duration: Duration) -> Result<(), Cancelled> {
        tokio::select! {
            biased;
            () = self.cancelled() => Err(Cancelled),
            () = tokio::time::sleep(duration) => Ok(()),
        }
    }

    /// Wrap this scope in a guard that cancels it when dropped.
    pub fn cancel_on_drop(self) -> ScopeGuard {
        ScopeGuard::new(self)
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("id", &self.inner.id)
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_scope_is_not_cancelled() {
        let scope = Scope::new();
        assert!(!scope.is_cancelled());
    }

    #[test]
    fn clones_share_cancellation() {
        let scope = Scope::new();
        let handle = scope.clone();

        handle.cancel();

        assert!(scope.is_cancelled());
        assert_eq!(scope.id(), handle.id());
    }

    #[test]
    fn cancelling_parent_cancels_descendants() {
        let root = Scope::new();
        let child = root.child();
        let grandchild = child.child();

        root.cancel();

        assert!(child.is_cancelled());
        assert!(grandchild.is_cancelled());
    }

    #[test]
    fn cancelling_child_leaves_parent_and_siblings() {
        let root = Scope::new();
        let first = root.child();
        let second = root.child();

        first.cancel();

        assert!(!root.is_cancelled());
        assert!(!second.is_cancelled());
    }

    #[test]
    fn child_of_cancelled_scope_starts_cancelled() {
        let root = Scope::new();
        root.cancel();

        assert!(root.child().is_cancelled());
    }

    #[test]
    fn detached_scope_ignores_parent_cancellation() {
        let root = Scope::new();
        let detached = root.detached();

        root.cancel();

        assert!(!detached.is_cancelled());
        assert_ne!(root.id(), detached.id());
    }

    #[test]
    fn dropped_children_are_pruned_on_next_registration() {
        let root = Scope::new();
        for _ in 0..8 {
            let _ = root.child();
        }
        let _kept = root.child();

        let registered = root
            .inner
            .children
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        assert!(registered <= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn timer_fires_after_duration() {
        let scope = Scope::new();
        let started = tokio::time::Instant::now();

        let result = scope.timer(Duration::from_secs(30)).await;

        assert_eq!(result, Ok(()));
        assert!(started.elapsed() >= Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn timer_on_cancelled_scope_resolves_immediately() {
        let scope = Scope::new();
        scope.cancel();
        let started = tokio::time::Instant::now();

        let result = scope.timer(Duration::from_secs(3600)).await;

        assert_eq!(result, Err(Cancelled));
        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}
