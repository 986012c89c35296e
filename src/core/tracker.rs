use crate::domain::model::{Artifact, AuditEntry, BatchResult, RecordOutcome};
use std::time::Instant;

/// Running totals for one batch. Owned by the record loop and consumed by
/// [`AuditTracker::finish`].
#[derive(Debug)]
pub struct AuditTracker {
    conversion_requested: bool,
    started: Instant,
    rendered: usize,
    converted: usize,
    audit: Vec<AuditEntry>,
}

impl AuditTracker {
    pub fn new(conversion_requested: bool) -> Self {
        Self {
            conversion_requested,
            started: Instant::now(),
            rendered: 0,
            converted: 0,
            audit: Vec::new(),
        }
    }

    /// Appends the audit entry for one record and bumps the counters.
    pub fn record(&mut self, name: impl Into<String>, outcome: RecordOutcome) -> &AuditEntry {
        if outcome.is_rendered() {
            self.rendered += 1;
        }
        if outcome.is_converted() {
            self.converted += 1;
        }

        self.audit.push(AuditEntry::new(name, outcome));
        &self.audit[self.audit.len() - 1]
    }

    pub fn processed(&self) -> usize {
        self.audit.len()
    }

    pub fn finish(self, artifacts: Vec<Artifact>) -> BatchResult {
        BatchResult {
            total: self.audit.len(),
            rendered: self.rendered,
            converted: self.converted,
            conversion_requested: self.conversion_requested,
            elapsed: self.started.elapsed(),
            audit: self.audit,
            artifacts,
        }
    }
}
