//! Core of calsync: two-way synchronization between two calendar providers.
//!
//! - `event` and `identity`: provider-neutral events and their stable keys
//! - `mapping`: which event on provider A is which event on provider B
//! - `diff`: the reconciler, turning two snapshots plus the mapping into a plan
//! - `sync`: the orchestrator that executes a plan against the providers
//! - `remote`: provider adapters, including the subprocess protocol

pub mod config;
pub mod constants;
pub mod date_range;
pub mod diff;
pub mod direction;
pub mod error;
pub mod event;
pub mod identity;
pub mod mapping;
pub mod remote;
pub mod sync;

pub use date_range::DateRange;
pub use direction::{Side, SyncDirection};
pub use error::{CalSyncError, CalSyncResult};
pub use event::{Event, ProviderId};
