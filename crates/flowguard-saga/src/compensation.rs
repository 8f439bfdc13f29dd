use std::future::Future;

use flowguard_scope::Scope;
use futures::FutureExt;
use futures::future::BoxFuture;

type CompensationFn<E> = Box<dyn Fn(Scope) -> BoxFuture<'static, Result<(), E>> + Send + Sync>;

/// A registered undo action and the name it is reported under.
pub(crate) struct Compensation<E> {
    name: String,
    op: CompensationFn<E>,
}

impl<E> Compensation<E> {
    pub(crate) fn new<F, Fut>(name: String, op: F) -> Self
    where
        F: Fn(Scope) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
    {
        Self {
            name,
            op: Box::new(move |scope: Scope| op(scope).boxed()),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Start the undo action under `scope`.
    pub(crate) fn run(&self, scope: Scope) -> BoxFuture<'static, Result<(), E>> {
        (self.op)(scope)
    }
}
