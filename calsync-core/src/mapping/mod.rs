//! Identity mapping: which event on provider A is which event on provider B.

mod store;

pub use store::{FileMappingStore, MappingStore};

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::diff::{DiffKind, MappingUpdate, Operation};
use crate::direction::Side;
use crate::error::{CalSyncError, CalSyncResult};
use crate::event::ProviderId;
use crate::identity::{ContentHash, SyncKey};

/// Everything remembered about one synced event pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingRow {
    pub provider_a_id: ProviderId,
    pub provider_b_id: ProviderId,
    /// Content hash both sides had after the last successful sync
    pub content_hash: ContentHash,
    pub last_synced_at: DateTime<Utc>,
    /// Start of the event at the last sync, to tell deletions from events
    /// that merely fell outside the fetched window
    pub start: DateTime<Utc>,
}

impl MappingRow {
    pub fn id(&self, side: Side) -> &str {
        match side {
            Side::A => &self.provider_a_id,
            Side::B => &self.provider_b_id,
        }
    }

    fn set_id(&mut self, side: Side, id: ProviderId) {
        match side {
            Side::A => self.provider_a_id = id,
            Side::B => self.provider_b_id = id,
        }
    }
}

/// Persisted table keyed by sync key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentityMapping {
    rows: BTreeMap<SyncKey, MappingRow>,
}

impl IdentityMapping {
    pub fn new() -> Self {
        IdentityMapping::default()
    }

    /// Build a mapping from stored rows, rejecting inconsistent state.
    pub fn from_rows(
        rows: impl IntoIterator<Item = (SyncKey, MappingRow)>,
    ) -> CalSyncResult<Self> {
        let mut mapping = IdentityMapping::new();
        for (key, row) in rows {
            if mapping.rows.insert(key.clone(), row).is_some() {
                return Err(CalSyncError::MappingCorruption(format!(
                    "sync key {} appears more than once",
                    key
                )));
            }
        }
        mapping.validate()?;
        Ok(mapping)
    }

    /// Every provider ID may belong to at most one row per side.
    pub fn validate(&self) -> CalSyncResult<()> {
        for side in [Side::A, Side::B] {
            let mut seen: HashMap<&str, &SyncKey> = HashMap::new();
            for (key, row) in &self.rows {
                let id = row.id(side);
                if id.is_empty() {
                    return Err(CalSyncError::MappingCorruption(format!(
                        "row {} has an empty provider {} id",
                        key, side
                    )));
                }
                if let Some(other) = seen.insert(id, key) {
                    return Err(CalSyncError::MappingCorruption(format!(
                        "provider {} id '{}' is mapped by both {} and {}",
                        side, id, other, key
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, key: &SyncKey) -> Option<&MappingRow> {
        self.rows.get(key)
    }

    pub fn rows(&self) -> impl Iterator<Item = (&SyncKey, &MappingRow)> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn insert(&mut self, key: SyncKey, row: MappingRow) -> Option<MappingRow> {
        self.rows.insert(key, row)
    }

    pub fn remove(&mut self, key: &SyncKey) -> Option<MappingRow> {
        self.rows.remove(key)
    }

    /// Reverse index from one side's provider IDs to sync keys.
    pub(crate) fn keys_by_id(&self, side: Side) -> HashMap<&str, &SyncKey> {
        self.rows
            .iter()
            .map(|(key, row)| (row.id(side), key))
            .collect()
    }

    /// Record a successfully applied operation. `created_id` is the ID the
    /// target provider assigned when the operation was a create.
    pub fn record(
        &mut self,
        op: &Operation,
        created_id: Option<ProviderId>,
        now: DateTime<Utc>,
    ) {
        let target_id = match op.kind {
            DiffKind::Delete => {
                self.rows.remove(&op.sync_key);
                return;
            }
            DiffKind::Create => created_id.unwrap_or_default(),
            DiffKind::Update => op.target_id.clone().unwrap_or_default(),
        };

        let mut row = MappingRow {
            provider_a_id: String::new(),
            provider_b_id: String::new(),
            content_hash: op.event.content_hash(),
            last_synced_at: now,
            start: op.event.start,
        };
        row.set_id(op.target, target_id);
        row.set_id(op.target.other(), op.event.provider_id.clone());

        self.rows.insert(op.sync_key.clone(), row);
    }

    /// Apply bookkeeping that needed no provider call.
    pub fn apply(&mut self, update: &MappingUpdate, now: DateTime<Utc>) {
        match update {
            MappingUpdate::Link {
                sync_key,
                provider_a_id,
                provider_b_id,
                content_hash,
                start,
            } => {
                self.rows.insert(
                    sync_key.clone(),
                    MappingRow {
                        provider_a_id: provider_a_id.clone(),
                        provider_b_id: provider_b_id.clone(),
                        content_hash: content_hash.clone(),
                        last_synced_at: now,
                        start: *start,
                    },
                );
            }
            MappingUpdate::Forget { sync_key } => {
                self.rows.remove(sync_key);
            }
        }
    }
}
