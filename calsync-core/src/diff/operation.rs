use std::fmt;

use serde::{Deserialize, Serialize};

use crate::diff::DiffKind;
use crate::direction::Side;
use crate::event::{Event, ProviderId};
use crate::identity::{ContentHash, SyncKey};

/// One provider mutation needed to converge the calendars.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    pub sync_key: SyncKey,
    /// Provider the operation is executed against
    pub target: Side,
    pub kind: DiffKind,
    /// Existing event on the target (None for creates)
    pub target_id: Option<ProviderId>,
    /// Creates and updates: the source event carrying the desired content,
    /// with its provider ID on the source side. Deletes: the doomed event.
    pub event: Event,
}

impl Operation {
    pub fn create(sync_key: SyncKey, target: Side, source: &Event) -> Self {
        Operation {
            sync_key,
            target,
            kind: DiffKind::Create,
            target_id: None,
            event: source.clone(),
        }
    }

    pub fn update(
        sync_key: SyncKey,
        target: Side,
        target_id: impl Into<ProviderId>,
        source: &Event,
    ) -> Self {
        Operation {
            sync_key,
            target,
            kind: DiffKind::Update,
            target_id: Some(target_id.into()),
            event: source.clone(),
        }
    }

    pub fn delete(sync_key: SyncKey, target: Side, doomed: &Event) -> Self {
        Operation {
            sync_key,
            target,
            kind: DiffKind::Delete,
            target_id: Some(doomed.provider_id.clone()),
            event: doomed.clone(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} on {}", self.kind, self.event, self.target)
    }
}

/// Changes to the identity mapping that need no provider call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MappingUpdate {
    /// Both sides already hold the same content: remember the pair.
    Link {
        sync_key: SyncKey,
        provider_a_id: ProviderId,
        provider_b_id: ProviderId,
        content_hash: ContentHash,
        start: chrono::DateTime<chrono::Utc>,
    },
    /// Gone from both sides: nothing left to track.
    Forget { sync_key: SyncKey },
}

impl MappingUpdate {
    pub(crate) fn link(sync_key: SyncKey, a: &Event, b: &Event) -> Self {
        MappingUpdate::Link {
            sync_key,
            provider_a_id: a.provider_id.clone(),
            provider_b_id: b.provider_id.clone(),
            content_hash: a.content_hash(),
            start: a.start,
        }
    }

    pub fn sync_key(&self) -> &SyncKey {
        match self {
            MappingUpdate::Link { sync_key, .. } | MappingUpdate::Forget { sync_key } => sync_key,
        }
    }
}
