use std::ops::RangeTo;
use std::time::Instant;

/// Status of a compensation in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum CompensationStatus {
    /// Registered, not run yet.
    Pending,
    /// Undo action completed successfully.
    Compensated,
    /// Undo action returned an error.
    Failed,
    /// Never run because an earlier sequential compensation failed.
    Skipped,
}

/// Record of one registered compensation.
#[derive(Debug)]
pub struct CompensationRecord {
    /// Name the compensation was registered under.
    pub name: String,
    /// Current status.
    pub status: CompensationStatus,
    /// When the undo action started.
    pub started_at: Option<Instant>,
    /// When the undo action finished, successfully or not.
    pub completed_at: Option<Instant>,
    /// The rendered error, if the undo action failed.
    pub failure: Option<String>,
}

/// Audit log of a saga's compensation run, one record per registered
/// compensation in registration order.
///
/// Failures that sequential compensation continues past are not part of the
/// returned result; this log is where they stay visible.
#[derive(Debug, Default)]
pub struct CompensationAuditLog {
    records: Vec<CompensationRecord>,
}

impl CompensationAuditLog {
    /// Create a new empty audit log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a log with one pending record per name.
    pub(crate) fn with_pending<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let records = names
            .into_iter()
            .map(|name| CompensationRecord {
                name: name.to_string(),
                status: CompensationStatus::Pending,
                started_at: None,
                completed_at: None,
                failure: None,
            })
            .collect();
        Self { records }
    }

    pub(crate) fn record_start(&mut self, index: usize) {
        if let Some(record) = self.records.get_mut(index) {
            record.started_at = Some(Instant::now());
        }
    }

    pub(crate) fn record_compensated(&mut self, index: usize, completed_at: Instant) {
        if let Some(record) = self.records.get_mut(index) {
            record.status = CompensationStatus::Compensated;
            record.completed_at = Some(completed_at);
        }
    }

    pub(crate) fn record_failure(&mut self, index: usize, completed_at: Instant, failure: String) {
        if let Some(record) = self.records.get_mut(index) {
            record.status = CompensationStatus::Failed;
            record.completed_at = Some(completed_at);
            record.failure = Some(failure);
        }
    }

    /// Mark every still-pending record in `range` as skipped.
    pub(crate) fn record_skipped(&mut self, range: RangeTo<usize>) {
        let end = range.end.min(self.records.len());
        for record in &mut self.records[..end] {
            if record.status == CompensationStatus::Pending {
                record.status = CompensationStatus::Skipped;
            }
        }
    }

    /// Get all records in the audit log.
    #[must_use]
    pub fn records(&self) -> &[CompensationRecord] {
        &self.records
    }

    /// Records of compensations that failed, in registration order.
    pub fn failures(&self) -> impl Iterator<Item = &CompensationRecord> {
        self.records
            .iter()
            .filter(|record| record.status == CompensationStatus::Failed)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get a summary of the compensation run for display.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        for record in &self.records {
            let status = match record.status {
                CompensationStatus::Pending => "·",
                CompensationStatus::Compensated => "↩",
                CompensationStatus::Failed => "⚠",
                CompensationStatus::Skipped => "⏭",
            };
            match &record.failure {
                Some(failure) => lines.push(format!("{status} {}: {failure}", record.name)),
                None => lines.push(format!("{status} {}", record.name)),
            }
        }
        lines.join("\n")
    }
}
