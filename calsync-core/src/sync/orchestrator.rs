//! One sync run: fetch, reconcile, resolve, execute, persist.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::date_range::DateRange;
use crate::diff::{ChangePlan, DiffKind, Operation};
use crate::direction::{Side, SyncDirection};
use crate::error::{CalSyncError, CalSyncResult};
use crate::event::ProviderId;
use crate::mapping::MappingStore;
use crate::remote::ProviderAdapter;
use crate::sync::report::{OutcomeStatus, SyncReport};

pub struct Orchestrator<A, B, S> {
    a: A,
    b: B,
    store: S,
    source_of_truth: Option<Side>,
}

impl<A, B, S> Orchestrator<A, B, S>
where
    A: ProviderAdapter,
    B: ProviderAdapter,
    S: MappingStore,
{
    pub fn new(a: A, b: B, store: S) -> Self {
        Orchestrator {
            a,
            b,
            store,
            source_of_truth: None,
        }
    }

    /// Side whose version wins conflicts when syncing both ways.
    pub fn with_source_of_truth(mut self, side: Option<Side>) -> Self {
        self.source_of_truth = side;
        self
    }

    /// Reconcile both providers over `window`.
    ///
    /// Auth failures and a corrupt mapping abort the run. Any other failure
    /// is recorded against its operation and the run moves on. Rows for
    /// operations that succeeded before an abort are still persisted.
    pub async fn run(
        &self,
        direction: SyncDirection,
        window: &DateRange,
        dry_run: bool,
    ) -> CalSyncResult<SyncReport> {
        let mut mapping = self.store.load()?;
        mapping.validate()?;

        let mut a_events = self.a.list_events(window).await?;
        let mut b_events = self.b.list_events(window).await?;
        a_events.sort_by_key(|e| e.start);
        b_events.sort_by_key(|e| e.start);

        info!(
            provider_a = self.a.name(),
            provider_b = self.b.name(),
            a_events = a_events.len(),
            b_events = b_events.len(),
            mapped = mapping.len(),
            %direction,
            dry_run,
            "reconciling"
        );

        let ChangePlan {
            mut operations,
            conflicts,
            mapping_updates,
            unchanged,
        } = ChangePlan::diff(&a_events, &b_events, &mapping, window);

        let mut report = SyncReport::new(direction, dry_run, *window, self.a.name(), self.b.name());
        report.events_processed = a_events.len() + b_events.len();
        report.skipped = unchanged;

        let winner = direction.winner(self.source_of_truth);
        for conflict in conflicts {
            match winner.and_then(|side| conflict.resolve(side)) {
                Some(op) => {
                    debug!(sync_key = conflict.sync_key.short(), "conflict resolved: {}", op);
                    operations.push(op);
                    report.record_conflict(conflict, winner);
                }
                None => {
                    warn!(sync_key = conflict.sync_key.short(), "unresolved conflict: {}", conflict);
                    report.record_conflict(conflict, None);
                }
            }
        }

        let now = Utc::now();
        let mut aborted = None;

        for op in operations {
            if !direction.allows(op.target) {
                report.record(op, OutcomeStatus::Skipped);
                continue;
            }
            if dry_run {
                report.record(op, OutcomeStatus::Planned);
                continue;
            }

            match self.execute(&op).await {
                Ok(created_id) => {
                    debug!(sync_key = op.sync_key.short(), "applied {}", op);
                    mapping.record(&op, created_id, now);
                    report.record(op, OutcomeStatus::Applied);
                }
                Err(e) if e.is_fatal() => {
                    aborted = Some(e);
                    break;
                }
                Err(e) => {
                    warn!(sync_key = op.sync_key.short(), error = %e, "failed to apply {}", op);
                    report.record(op, OutcomeStatus::Failed(e.to_string()));
                }
            }
        }

        if dry_run {
            return Ok(report);
        }

        for update in &mapping_updates {
            mapping.apply(update, now);
        }
        self.store.save(&mapping)?;

        if let Some(e) = aborted {
            return Err(e);
        }

        info!(
            created = report.created,
            updated = report.updated,
            deleted = report.deleted,
            skipped = report.skipped,
            conflicted = report.conflicted,
            failed = report.failed,
            "sync finished"
        );
        Ok(report)
    }

    async fn execute(&self, op: &Operation) -> CalSyncResult<Option<ProviderId>> {
        match op.target {
            Side::A => execute_on(&self.a, op).await,
            Side::B => execute_on(&self.b, op).await,
        }
    }
}

/// Run one operation against its target provider. Returns the new event's
/// ID for creates.
async fn execute_on<P: ProviderAdapter>(
    provider: &P,
    op: &Operation,
) -> CalSyncResult<Option<ProviderId>> {
    match op.kind {
        DiffKind::Create => {
            op.event.validate()?;
            let id = provider.create_event(&op.event).await?;
            if id.trim().is_empty() {
                return Err(CalSyncError::Provider(format!(
                    "{} returned an empty ID for '{}'",
                    provider.name(),
                    op.event.title
                )));
            }
            Ok(Some(id))
        }
        DiffKind::Update => {
            op.event.validate()?;
            provider.update_event(target_id(op)?, &op.event).await?;
            Ok(None)
        }
        DiffKind::Delete => {
            provider.delete_event(target_id(op)?).await?;
            Ok(None)
        }
    }
}

fn target_id(op: &Operation) -> CalSyncResult<&str> {
    op.target_id
        .as_deref()
        .ok_or_else(|| CalSyncError::Provider(format!("{} has no target event ID", op)))
}
