//! Executing change plans against the two providers.

mod orchestrator;
mod report;

pub use orchestrator::Orchestrator;
pub use report::{ConflictReport, FailureReport, OperationOutcome, OutcomeStatus, SyncReport};
