use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use flowguard_scope::Scope;
use futures::future::join_all;
use tracing::{debug, error, warn};

use crate::audit::CompensationAuditLog;
use crate::compensation::Compensation;
use crate::error::{CompensationError, CompensationFailure, SagaError};
use crate::options::SagaOptions;

/// Compensation state of a long-running operation.
///
/// Register an undo action after each forward step succeeds; if a later step
/// fails, call [`Saga::compensate`] once to undo what was done. Compensations
/// run under the saga's own scope, which is detached from the parent: they
/// still run when the parent has been cancelled, and only [`Saga::cancel`]
/// cancels them.
pub struct Saga<E> {
    scope: Scope,
    options: SagaOptions,
    compensations: Vec<Compensation<E>>,
    compensated: AtomicBool,
}

impl<E> Saga<E>
where
    E: fmt::Display + Send + 'static,
{
    /// Start a saga on a scope derived from `parent`.
    #[must_use]
    pub fn new(parent: &Scope, options: SagaOptions) -> Self {
        let scope = parent.detached();
        debug!(
            scope = scope.id(),
            parent = parent.id(),
            parallel = options.parallel_compensation(),
            continue_with_error = options.continue_with_error(),
            "saga started"
        );
        Self {
            scope,
            options,
            compensations: Vec::new(),
            compensated: AtomicBool::new(false),
        }
    }

    /// Register the undo action for a forward step that just succeeded.
    ///
    /// The action receives the saga's scope when it runs. Registering after
    /// compensation has started is a caller error: the action is dropped and
    /// a warning logged.
    pub fn add_compensation<F, Fut>(&mut self, name: impl Into<String>, op: F)
    where
        F: Fn(Scope) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
    {
        let name = name.into();
        if self.is_compensated() {
            warn!(
                step = %name,
                "compensation registered after saga compensation started, ignoring"
            );
            return;
        }
        debug!(
            step = %name,
            position = self.compensations.len(),
            "registered compensation"
        );
        self.compensations.push(Compensation::new(name, op));
    }

    /// Cancel the saga's scope. Compensations started afterwards observe a
    /// cancelled scope.
    pub fn cancel(&self) {
        debug!(scope = self.scope.id(), "cancelling saga");
        self.scope.cancel();
    }

    /// The scope compensations run under.
    #[must_use]
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    #[must_use]
    pub fn options(&self) -> SagaOptions {
        self.options
    }

    /// Number of registered compensations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.compensations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.compensations.is_empty()
    }

    /// Whether [`Saga::compensate`] has been called.
    #[must_use]
    pub fn is_compensated(&self) -> bool {
        self.compensated.load(Ordering::Acquire)
    }

    /// Run the registered compensations.
    ///
    /// Sequential compensation undoes the most recent step first. Parallel
    /// compensation runs every undo action concurrently and waits for all of
    /// them; side effects then happen in no particular order.
    ///
    /// # Errors
    ///
    /// Returns `SagaError::StepFailed` if a sequential compensation fails and
    /// the saga does not continue past errors.
    /// Returns `SagaError::Compensation` if any parallel compensation fails.
    /// Returns `SagaError::AlreadyCompensated` on every call after the first.
    pub async fn compensate(&self) -> Result<(), SagaError<E>> {
        let (result, _audit_log) = self.compensate_with_audit().await;
        result
    }

    /// Run the registered compensations and return an audit log alongside
    /// the result.
    ///
    /// The audit log also lists failures that sequential compensation
    /// continued past. It is empty if compensation already ran.
    pub async fn compensate_with_audit(
        &self,
    ) -> (Result<(), SagaError<E>>, CompensationAuditLog) {
        if self.compensated.swap(true, Ordering::AcqRel) {
            error!(
                scope = self.scope.id(),
                "saga compensation invoked more than once"
            );
            return (
                Err(SagaError::AlreadyCompensated),
                CompensationAuditLog::new(),
            );
        }

        let mut audit_log =
            CompensationAuditLog::with_pending(self.compensations.iter().map(Compensation::name));
        let result = if self.options.parallel_compensation() {
            self.compensate_parallel(&mut audit_log).await
        } else {
            self.compensate_sequential(&mut audit_log).await
        };
        (result, audit_log)
    }

    async fn compensate_sequential(
        &self,
        audit_log: &mut CompensationAuditLog,
    ) -> Result<(), SagaError<E>> {
        debug!(
            count = self.compensations.len(),
            "compensating in reverse registration order"
        );

        for (index, compensation) in self.compensations.iter().enumerate().rev() {
            audit_log.record_start(index);
            match compensation.run(self.scope.clone()).await {
                Ok(()) => {
                    audit_log.record_compensated(index, Instant::now());
                    debug!(step = compensation.name(), "compensated");
                }
                Err(error) => {
                    audit_log.record_failure(index, Instant::now(), error.to_string());
                    if self.options.continue_with_error() {
                        warn!(
                            step = compensation.name(),
                            error = %error,
                            "compensation failed, continuing with older steps"
                        );
                        continue;
                    }
                    warn!(
                        step = compensation.name(),
                        error = %error,
                        skipped = index,
                        "compensation failed, skipping older steps"
                    );
                    audit_log.record_skipped(..index);
                    return Err(SagaError::StepFailed {
                        step: compensation.name().to_string(),
                        source: error,
                    });
                }
            }
        }
        Ok(())
    }

    async fn compensate_parallel(
        &self,
        audit_log: &mut CompensationAuditLog,
    ) -> Result<(), SagaError<E>> {
        debug!(count = self.compensations.len(), "compensating in parallel");

        let runs = self
            .compensations
            .iter()
            .enumerate()
            .map(|(index, compensation)| {
                audit_log.record_start(index);
                let run = compensation.run(self.scope.clone());
                async move {
                    let result = run.await;
                    (result, Instant::now())
                }
            })
            .collect::<Vec<_>>();
        let outcomes = join_all(runs).await;

        let mut compensation_error = CompensationError::new();
        for (index, (compensation, (result, completed_at))) in
            self.compensations.iter().zip(outcomes).enumerate()
        {
            match result {
                Ok(()) => audit_log.record_compensated(index, completed_at),
                Err(error) => {
                    warn!(
                        step = compensation.name(),
                        error = %error,
                        "parallel compensation failed"
                    );
                    audit_log.record_failure(index, completed_at, error.to_string());
                    compensation_error.push(CompensationFailure {
                        step: compensation.name().to_string(),
                        error,
                    });
                }
            }
        }

        if compensation_error.has_errors() {
            Err(SagaError::Compensation(compensation_error))
        } else {
            Ok(())
        }
    }
}

impl<E> fmt::Debug for Saga<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.compensations.iter().map(Compensation::name).collect();
        f.debug_struct("Saga")
            .field("scope", &self.scope)
            .field("options", &self.options)
            .field("compensations", &names)
            .field("compensated", &self.compensated.load(Ordering::Acquire))
            .finish()
    }
}
