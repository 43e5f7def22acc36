use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::diff::Operation;
use crate::direction::Side;
use crate::event::Event;
use crate::identity::SyncKey;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConflictKind {
    /// Both sides changed since the last sync, to different content.
    BothModified,
    /// First encounter: same identity on both sides, different content,
    /// and no last-synced state to say which one is newer.
    Divergent,
    /// One side deleted the event while the other changed it.
    DeletedVsModified { deleted_on: Side },
    /// Several events on one provider claim the same identity.
    Collision { side: Side, events: Vec<Event> },
}

/// A change the reconciler refuses to decide on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conflict {
    pub sync_key: SyncKey,
    pub kind: ConflictKind,
    pub a: Option<Event>,
    pub b: Option<Event>,
}

impl Conflict {
    pub fn event(&self, side: Side) -> Option<&Event> {
        match side {
            Side::A => self.a.as_ref(),
            Side::B => self.b.as_ref(),
        }
    }

    /// Title to show for this conflict.
    pub fn title(&self) -> &str {
        match &self.kind {
            ConflictKind::Collision { events, .. } => {
                events.first().map(|e| e.title.as_str()).unwrap_or_default()
            }
            _ => self
                .a
                .as_ref()
                .or(self.b.as_ref())
                .map(|e| e.title.as_str())
                .unwrap_or_default(),
        }
    }

    pub fn start(&self) -> Option<DateTime<Utc>> {
        match &self.kind {
            ConflictKind::Collision { events, .. } => events.first().map(|e| e.start),
            _ => self.a.as_ref().or(self.b.as_ref()).map(|e| e.start),
        }
    }

    /// The operation that settles this conflict in favor of `winner`.
    /// Collisions cannot be settled this way.
    pub fn resolve(&self, winner: Side) -> Option<Operation> {
        let key = self.sync_key.clone();
        let loser = winner.other();

        match &self.kind {
            ConflictKind::BothModified | ConflictKind::Divergent => {
                let source = self.event(winner)?;
                let target = self.event(loser)?;
                Some(Operation::update(key, loser, target.provider_id.clone(), source))
            }
            ConflictKind::DeletedVsModified { deleted_on } => {
                let survivor = self.event(deleted_on.other())?;
                if winner == *deleted_on {
                    Some(Operation::delete(key, deleted_on.other(), survivor))
                } else {
                    Some(Operation::create(key, *deleted_on, survivor))
                }
            }
            ConflictKind::Collision { .. } => None,
        }
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ConflictKind::BothModified => write!(f, "changed on both sides since the last sync"),
            ConflictKind::Divergent => {
                write!(f, "differs between sides and was never synced")
            }
            ConflictKind::DeletedVsModified { deleted_on } => write!(
                f,
                "deleted on {} but changed on {}",
                deleted_on,
                deleted_on.other()
            ),
            ConflictKind::Collision { side, events } => write!(
                f,
                "{} events on {} share one identity",
                events.len(),
                side
            ),
        }
    }
}
