//! Provider subprocess protocol.
//!
//! This module handles communication with external provider binaries
//! (e.g., `calsync-provider-google`) using JSON over stdin/stdout.
//!
//! The protocol is designed to be language-agnostic: any executable
//! that speaks the JSON protocol can be a provider.
//!
//! Providers manage their own credentials, tokens and transport. Core just
//! passes provider-specific parameters from the config.

use crate::error::{CalSyncError, CalSyncResult};
use crate::remote::protocol::{Command, ProviderCommand, Request, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

const PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Provider(String);

impl Provider {
    pub fn from_name(name: &str) -> Self {
        Provider(name.to_string())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn binary_name(&self) -> String {
        format!("calsync-provider-{}", self.0)
    }

    fn binary_path(&self) -> CalSyncResult<std::path::PathBuf> {
        let binary_name = self.binary_name();
        which::which(&binary_name).map_err(|_| CalSyncError::ProviderNotInstalled(binary_name))
    }

    /// Call a typed provider command and return the result.
    ///
    /// The response type is inferred from the command's associated type,
    /// ensuring compile-time type safety.
    pub async fn call<C: ProviderCommand>(&self, cmd: C) -> CalSyncResult<C::Response> {
        timeout(PROVIDER_TIMEOUT, self.call_raw(C::command(), cmd))
            .await
            .map_err(|_| CalSyncError::ProviderTimeout(PROVIDER_TIMEOUT.as_secs()))?
    }

    /// Low-level call that sends a command with params and deserializes the response.
    async fn call_raw<P: Serialize, R: serde::de::DeserializeOwned>(
        &self,
        command: Command,
        params: P,
    ) -> CalSyncResult<R> {
        let params = serde_json::to_value(params)
            .map_err(|e| CalSyncError::Serialization(e.to_string()))?;
        let request = Request { command, params };
        let request_json = serde_json::to_string(&request)
            .map_err(|e| CalSyncError::Serialization(e.to_string()))?;

        let binary_path = self.binary_path()?;

        let mut child = TokioCommand::new(&binary_path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                CalSyncError::Provider(format!("Failed to spawn {}: {}", binary_path.display(), e))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| CalSyncError::Provider("Provider stdin was not captured".into()))?;
        stdin
            .write_all(format!("{request_json}\n").as_bytes())
            .await?;
        drop(stdin);

        // Wait for process and collect output
        let output = child.wait_with_output().await?;

        if !output.status.success() {
            return Err(CalSyncError::Provider(format!(
                "{} exited with status: {}",
                self.binary_name(),
                output.status.code().unwrap_or(-1)
            )));
        }

        let response_str = String::from_utf8_lossy(&output.stdout);
        parse_response(self.name(), &response_str)
    }
}

/// Decode the provider's single response line.
fn parse_response<R: serde::de::DeserializeOwned>(provider: &str, raw: &str) -> CalSyncResult<R> {
    let line = raw.lines().find(|l| !l.trim().is_empty()).ok_or_else(|| {
        CalSyncError::Provider(format!("{} returned no response", provider))
    })?;

    let response: Response<R> = serde_json::from_str(line).map_err(|e| {
        CalSyncError::Provider(format!("Failed to parse response from {}: {}", provider, e))
    })?;

    response.into_result(provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;

    #[test]
    fn test_parse_response_skips_blank_lines() {
        let raw = "\n{\"status\":\"success\",\"data\":[]}\n";
        let events: Vec<Event> = parse_response("google", raw).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_parse_response_empty_output() {
        let result: CalSyncResult<()> = parse_response("google", "  \n");
        assert!(matches!(result, Err(CalSyncError::Provider(_))));
    }

    #[test]
    fn test_parse_response_connectivity_error_is_retryable() {
        let raw = r#"{"status":"error","error":"connection reset","kind":"connectivity"}"#;
        let err = parse_response::<()>("icloud", raw).unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_missing_binary_is_reported() {
        let provider = Provider::from_name("definitely-not-installed-xyz");
        assert_eq!(
            provider.binary_name(),
            "calsync-provider-definitely-not-installed-xyz"
        );
        assert!(matches!(
            provider.binary_path(),
            Err(CalSyncError::ProviderNotInstalled(_))
        ));
    }
}
