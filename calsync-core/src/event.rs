//! Provider-neutral event types.
//!
//! Providers convert their API responses into these types, and the
//! reconciler works exclusively with them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CalSyncError, CalSyncResult};
use crate::identity::{ContentHash, SyncKey, minute_of, normalize_text};

/// Identifier assigned to an event by the provider that owns it.
pub type ProviderId = String;

/// A calendar event (provider-neutral)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// ID on the provider this event was read from
    pub provider_id: ProviderId,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// All-day markers may have zero length on some providers
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Last modification timestamp, when the provider exposes one
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
}

/// The normalized fields that make two events "the same content".
#[derive(PartialEq)]
struct ContentFields {
    title: String,
    start: i64,
    end: i64,
    all_day: bool,
    location: String,
    description: String,
}

impl Event {
    pub fn new(
        provider_id: impl Into<ProviderId>,
        title: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Event {
            provider_id: provider_id.into(),
            title: title.into(),
            start,
            end,
            all_day: false,
            description: None,
            location: None,
            last_modified: None,
        }
    }

    /// Key derived from this event's own content, ignoring any mapping.
    pub fn sync_key(&self) -> SyncKey {
        SyncKey::derive(&self.title, self.start, self.end)
    }

    pub fn content_hash(&self) -> ContentHash {
        let fields = self.content_fields();
        ContentHash::of_parts(&[
            &fields.title,
            &fields.start.to_string(),
            &fields.end.to_string(),
            if fields.all_day { "all-day" } else { "timed" },
            &fields.location,
            &fields.description,
        ])
    }

    /// Check the time span before handing the event to a provider.
    pub fn validate(&self) -> CalSyncResult<()> {
        let valid = if self.all_day {
            self.start <= self.end
        } else {
            self.start < self.end
        };

        if valid {
            Ok(())
        } else {
            Err(CalSyncError::Validation {
                provider: "calsync".into(),
                message: format!(
                    "'{}' ends ({}) before it starts ({})",
                    self.title,
                    self.end.to_rfc3339(),
                    self.start.to_rfc3339()
                ),
            })
        }
    }

    fn content_fields(&self) -> ContentFields {
        ContentFields {
            title: normalize_text(&self.title),
            start: minute_of(self.start),
            end: minute_of(self.end),
            all_day: self.all_day,
            location: normalize_text(self.location.as_deref().unwrap_or_default()),
            description: normalize_text(self.description.as_deref().unwrap_or_default()),
        }
    }
}

/// Content equality: provider IDs and timestamps are not compared.
impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.content_fields() == other.content_fields()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}
