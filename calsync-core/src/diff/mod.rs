//! Reconciliation: diffing two event snapshots into a change plan.

mod change_plan;
mod conflict;
mod diff_kind;
mod operation;

pub use change_plan::ChangePlan;
pub use conflict::{Conflict, ConflictKind};
pub use diff_kind::DiffKind;
pub use operation::{MappingUpdate, Operation};
