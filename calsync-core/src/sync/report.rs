//! What a sync run did (or, in dry-run mode, would do).

use serde::Serialize;

use crate::date_range::DateRange;
use crate::diff::{Conflict, DiffKind, Operation};
use crate::direction::{Side, SyncDirection};
use crate::identity::SyncKey;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Executed against the provider
    Applied,
    /// Dry run: would have been executed
    Planned,
    /// Not executed because the sync direction forbids writing to the target
    Skipped,
    Failed(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct OperationOutcome {
    pub operation: Operation,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConflictReport {
    pub conflict: Conflict,
    /// Side whose version was applied; None when left for the user
    pub resolved_by: Option<Side>,
}

/// A single operation that could not be applied.
#[derive(Debug, Clone, Serialize)]
pub struct FailureReport {
    pub sync_key: SyncKey,
    pub side: Side,
    pub provider: String,
    pub kind: DiffKind,
    pub title: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub direction: SyncDirection,
    pub dry_run: bool,
    pub window: DateRange,
    pub provider_a: String,
    pub provider_b: String,

    /// Events listed on both sides together
    pub events_processed: usize,
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    /// Already in sync, or held back by the sync direction
    pub skipped: usize,
    /// Conflicts nobody resolved
    pub conflicted: usize,
    pub failed: usize,

    pub outcomes: Vec<OperationOutcome>,
    pub conflicts: Vec<ConflictReport>,
    pub failures: Vec<FailureReport>,
}

impl SyncReport {
    pub fn new(
        direction: SyncDirection,
        dry_run: bool,
        window: DateRange,
        provider_a: &str,
        provider_b: &str,
    ) -> Self {
        SyncReport {
            direction,
            dry_run,
            window,
            provider_a: provider_a.to_string(),
            provider_b: provider_b.to_string(),
            events_processed: 0,
            created: 0,
            updated: 0,
            deleted: 0,
            skipped: 0,
            conflicted: 0,
            failed: 0,
            outcomes: Vec::new(),
            conflicts: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn provider_name(&self, side: Side) -> &str {
        match side {
            Side::A => &self.provider_a,
            Side::B => &self.provider_b,
        }
    }

    pub(crate) fn record(&mut self, operation: Operation, status: OutcomeStatus) {
        match &status {
            OutcomeStatus::Applied | OutcomeStatus::Planned => match operation.kind {
                DiffKind::Create => self.created += 1,
                DiffKind::Update => self.updated += 1,
                DiffKind::Delete => self.deleted += 1,
            },
            OutcomeStatus::Skipped => self.skipped += 1,
            OutcomeStatus::Failed(reason) => {
                self.failed += 1;
                self.failures.push(FailureReport {
                    sync_key: operation.sync_key.clone(),
                    side: operation.target,
                    provider: self.provider_name(operation.target).to_string(),
                    kind: operation.kind,
                    title: operation.event.title.clone(),
                    reason: reason.clone(),
                });
            }
        }
        self.outcomes.push(OperationOutcome { operation, status });
    }

    pub(crate) fn record_conflict(&mut self, conflict: Conflict, resolved_by: Option<Side>) {
        if resolved_by.is_none() {
            self.conflicted += 1;
        }
        self.conflicts.push(ConflictReport {
            conflict,
            resolved_by,
        });
    }

    /// Nothing to create, update or delete, and nothing left unresolved.
    pub fn is_clean(&self) -> bool {
        self.created + self.updated + self.deleted + self.conflicted + self.failed == 0
    }

    pub fn unresolved_conflicts(&self) -> impl Iterator<Item = &Conflict> {
        self.conflicts
            .iter()
            .filter(|c| c.resolved_by.is_none())
            .map(|c| &c.conflict)
    }
}
