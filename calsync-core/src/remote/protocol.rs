//! Defines the JSON protocol used for communication between calsync
//! and provider binaries over stdin/stdout.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::{CalSyncError, CalSyncResult};
use crate::event::{Event, ProviderId};

pub trait ProviderCommand: Serialize {
    type Response: DeserializeOwned;
    fn command() -> Command;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    ListEvents,
    CreateEvent,
    UpdateEvent,
    DeleteEvent,
}

/// Request sent from calsync to provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub command: Command,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// How a provider classifies its own failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Credentials missing, invalid or expired
    Auth,
    /// Network or API failure that may succeed on retry
    Connectivity,
    /// The provider rejected the event payload
    Validation,
    /// The referenced event does not exist
    NotFound,
    #[default]
    Other,
}

impl ErrorKind {
    pub fn into_error(self, provider: &str, message: String) -> CalSyncError {
        let provider = provider.to_string();
        match self {
            ErrorKind::Auth => CalSyncError::Auth { provider, message },
            ErrorKind::Connectivity => CalSyncError::Connectivity { provider, message },
            ErrorKind::Validation => CalSyncError::Validation { provider, message },
            ErrorKind::NotFound => CalSyncError::NotFound { provider, message },
            ErrorKind::Other => CalSyncError::Provider(format!("{}: {}", provider, message)),
        }
    }
}

/// Response sent from provider to calsync.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success {
        data: T,
    },
    Error {
        error: String,
        #[serde(default)]
        kind: ErrorKind,
    },
}

impl<T: Serialize> Response<T> {
    pub fn success(data: T) -> CalSyncResult<String> {
        serde_json::to_string(&Response::Success { data })
            .map_err(|e| CalSyncError::Serialization(e.to_string()))
    }
}

impl Response<()> {
    pub fn error(msg: &str, kind: ErrorKind) -> CalSyncResult<String> {
        serde_json::to_string(&Response::<()>::Error {
            error: msg.to_string(),
            kind,
        })
        .map_err(|e| CalSyncError::Serialization(e.to_string()))
    }
}

impl<T> Response<T> {
    /// Turn the wire response into a result, attributing errors to `provider`.
    pub fn into_result(self, provider: &str) -> CalSyncResult<T> {
        match self {
            Response::Success { data } => Ok(data),
            Response::Error { error, kind } => Err(kind.into_error(provider, error)),
        }
    }
}

/// List events within a time range (`from` inclusive, `to` exclusive).
#[derive(Debug, Serialize, Deserialize)]
pub struct ListEvents {
    /// Provider-specific config (e.g., google_calendar_id)
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub from: String,
    pub to: String,
}

impl ProviderCommand for ListEvents {
    type Response = Vec<Event>;
    fn command() -> Command {
        Command::ListEvents
    }
}

/// Create a new event; the provider answers with the ID it assigned.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateEvent {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub event: Event,
}

impl ProviderCommand for CreateEvent {
    type Response = ProviderId;
    fn command() -> Command {
        Command::CreateEvent
    }
}

/// Replace the content of an existing event.
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateEvent {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub event_id: ProviderId,
    pub event: Event,
}

impl ProviderCommand for UpdateEvent {
    type Response = ();
    fn command() -> Command {
        Command::UpdateEvent
    }
}

/// Delete an event by ID.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteEvent {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub event_id: ProviderId,
}

impl ProviderCommand for DeleteEvent {
    type Response = ();
    fn command() -> Command {
        Command::DeleteEvent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_flattens_remote_config() {
        let mut remote_config = serde_json::Map::new();
        remote_config.insert("calendar_id".into(), "primary".into());
        let cmd = DeleteEvent {
            remote_config,
            event_id: "evt-1".into(),
        };

        let request = Request {
            command: DeleteEvent::command(),
            params: serde_json::to_value(cmd).unwrap(),
        };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["command"], "delete_event");
        assert_eq!(json["params"]["calendar_id"], "primary");
        assert_eq!(json["params"]["event_id"], "evt-1");
    }

    #[test]
    fn test_error_kinds_map_to_errors() {
        let response: Response<Vec<Event>> = serde_json::from_str(
            r#"{"status": "error", "error": "token expired", "kind": "auth"}"#,
        )
        .unwrap();
        let err = response.into_result("google").unwrap_err();
        assert!(matches!(err, CalSyncError::Auth { ref provider, .. } if provider == "google"));
        assert!(err.is_fatal());

        let response: Response<()> =
            serde_json::from_str(r#"{"status": "error", "error": "503"}"#).unwrap();
        assert!(matches!(
            response.into_result("icloud"),
            Err(CalSyncError::Provider(_))
        ));
    }

    #[test]
    fn test_success_roundtrip_for_created_id() {
        let line = Response::success("new-id".to_string()).unwrap();
        let response: Response<ProviderId> = serde_json::from_str(&line).unwrap();
        assert_eq!(response.into_result("icloud").unwrap(), "new-id");

        let line = Response::error("bad range", ErrorKind::Validation).unwrap();
        let response: Response<ProviderId> = serde_json::from_str(&line).unwrap();
        assert!(matches!(
            response.into_result("icloud"),
            Err(CalSyncError::Validation { .. })
        ));
    }
}
