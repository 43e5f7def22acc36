//! Provider adapters: the only way the core talks to a calendar service.

pub mod protocol;
pub mod provider;
mod retry;

pub use retry::RetryPolicy;

use std::collections::HashMap;

use crate::date_range::DateRange;
use crate::error::CalSyncResult;
use crate::event::{Event, ProviderId};
use crate::remote::protocol::{CreateEvent, DeleteEvent, ListEvents, UpdateEvent};
use crate::remote::provider::Provider;
use serde::{Deserialize, Serialize};

/// Capability contract for one calendar backend.
///
/// Failures are reported with the `CalSyncError` taxonomy: `Auth` aborts a
/// run, `Connectivity`, `Validation` and `NotFound` fail a single operation.
#[allow(async_fn_in_trait)]
pub trait ProviderAdapter {
    /// Display name, used in logs and reports.
    fn name(&self) -> &str;

    async fn list_events(&self, range: &DateRange) -> CalSyncResult<Vec<Event>>;

    /// Create `event` (its `provider_id` belongs to the source side and is
    /// ignored) and return the ID the provider assigned.
    async fn create_event(&self, event: &Event) -> CalSyncResult<ProviderId>;

    async fn update_event(&self, id: &str, event: &Event) -> CalSyncResult<()>;

    async fn delete_event(&self, id: &str) -> CalSyncResult<()>;
}

impl<T: ProviderAdapter + ?Sized> ProviderAdapter for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn list_events(&self, range: &DateRange) -> CalSyncResult<Vec<Event>> {
        (**self).list_events(range).await
    }

    async fn create_event(&self, event: &Event) -> CalSyncResult<ProviderId> {
        (**self).create_event(event).await
    }

    async fn update_event(&self, id: &str, event: &Event) -> CalSyncResult<()> {
        (**self).update_event(id, event).await
    }

    async fn delete_event(&self, id: &str) -> CalSyncResult<()> {
        (**self).delete_event(id).await
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct RemoteConfig(pub HashMap<String, toml::Value>);

impl From<&RemoteConfig> for serde_json::Map<String, serde_json::Value> {
    fn from(config: &RemoteConfig) -> Self {
        config
            .0
            .iter()
            .filter_map(|(k, v)| serde_json::to_value(v).ok().map(|v| (k.clone(), v)))
            .collect()
    }
}

/// A provider executable plus the parameters it needs (e.g., which calendar).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Remote {
    pub provider: Provider,
    #[serde(flatten)]
    pub config: RemoteConfig,
    #[serde(skip)]
    retry: RetryPolicy,
}

impl Remote {
    pub fn new(provider: Provider, config: RemoteConfig) -> Self {
        Remote {
            provider,
            config,
            retry: RetryPolicy::default(),
        }
    }

    fn remote_config(&self) -> serde_json::Map<String, serde_json::Value> {
        serde_json::Map::from(&self.config)
    }
}

impl ProviderAdapter for Remote {
    fn name(&self) -> &str {
        self.provider.name()
    }

    async fn list_events(&self, range: &DateRange) -> CalSyncResult<Vec<Event>> {
        self.retry
            .run("list_events", || {
                self.provider.call(ListEvents {
                    remote_config: self.remote_config(),
                    from: range.from_rfc3339(),
                    to: range.to_rfc3339(),
                })
            })
            .await
    }

    async fn create_event(&self, event: &Event) -> CalSyncResult<ProviderId> {
        self.retry
            .run("create_event", || {
                self.provider.call(CreateEvent {
                    remote_config: self.remote_config(),
                    event: event.clone(),
                })
            })
            .await
    }

    async fn update_event(&self, id: &str, event: &Event) -> CalSyncResult<()> {
        self.retry
            .run("update_event", || {
                self.provider.call(UpdateEvent {
                    remote_config: self.remote_config(),
                    event_id: id.to_string(),
                    event: event.clone(),
                })
            })
            .await
    }

    async fn delete_event(&self, id: &str) -> CalSyncResult<()> {
        self.retry
            .run("delete_event", || {
                self.provider.call(DeleteEvent {
                    remote_config: self.remote_config(),
                    event_id: id.to_string(),
                })
            })
            .await
    }
}
