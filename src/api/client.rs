//! HTTP client for the control plane API.

use async_trait::async_trait;
use std::time::Duration;

use super::types::{
    ApiErrorBody, HEALTH_PATH, LaunchTicketRequest, LaunchTicketResponse, launch_path,
};
use crate::RemoteError;

/// The remote side of a launch, abstracted so the launcher can be tested
/// without a server.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Lightweight liveness check. Any failure means "unavailable".
    async fn probe(&self, base_url: &str) -> bool;

    /// Ask the control plane to launch a ticket
    async fn launch(
        &self,
        base_url: &str,
        ticket_id: &str,
        request: &LaunchTicketRequest,
    ) -> Result<LaunchTicketResponse, RemoteError>;
}

fn status_error(code: u16, body: &str) -> RemoteError {
    let body = body.trim();
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => RemoteError::Rejected {
            status: code,
            error: parsed.error,
            message: parsed.message,
        },
        Err(_) => RemoteError::Rejected {
            status: code,
            error: "http_error".to_string(),
            message: if body.is_empty() {
                format!("HTTP {code}")
            } else {
                format!("HTTP {code}: {body}")
            },
        },
    }
}

fn map_ureq_error(e: ureq::Error) -> RemoteError {
    match e {
        ureq::Error::Status(code, resp) => {
            let body = resp.into_string().unwrap_or_default();
            status_error(code, &body)
        }
        other => RemoteError::Transport(other.to_string()),
    }
}

/// Blocking `ureq` client; async callers go through [`ControlPlane`].
#[derive(Clone)]
pub struct ApiClient {
    agent: ureq::Agent,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new(Duration::from_secs(2), Duration::from_secs(30))
    }
}

impl ApiClient {
    pub fn new(connect_timeout: Duration, request_timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(connect_timeout)
            .timeout(request_timeout)
            .build();
        Self { agent }
    }

    /// `GET /api/v1/health`; any 2xx is healthy
    pub fn health_check(&self, base_url: &str) -> Result<(), RemoteError> {
        let url = format!("{}{}", base_url.trim_end_matches('/'), HEALTH_PATH);
        self.agent.get(&url).call().map_err(map_ureq_error)?;
        Ok(())
    }

    /// `POST /api/v1/tickets/{id}/launch`
    pub fn launch_ticket(
        &self,
        base_url: &str,
        ticket_id: &str,
        request: &LaunchTicketRequest,
    ) -> Result<LaunchTicketResponse, RemoteError> {
        let url = format!("{}{}", base_url.trim_end_matches('/'), launch_path(ticket_id));
        let payload = serde_json::to_string(request)
            .map_err(|e| RemoteError::Malformed(format!("cannot encode request: {e}")))?;

        let resp = self
            .agent
            .post(&url)
            .set("Content-Type", "application/json")
            .send_string(&payload)
            .map_err(map_ureq_error)?;

        let body = resp
            .into_string()
            .map_err(|e| RemoteError::Transport(format!("failed to read response body: {e}")))?;
        let launched: LaunchTicketResponse =
            serde_json::from_str(&body).map_err(|e| RemoteError::Malformed(e.to_string()))?;

        if launched.terminal_name.trim().is_empty() || launched.command.trim().is_empty() {
            return Err(RemoteError::Malformed(
                "launch response without terminal name or command".to_string(),
            ));
        }
        Ok(launched)
    }
}

#[async_trait]
impl ControlPlane for ApiClient {
    async fn probe(&self, base_url: &str) -> bool {
        let client = self.clone();
        let base_url = base_url.to_string();
        let result = tokio::task::spawn_blocking(move || client.health_check(&base_url)).await;
        match result {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::debug!("control plane probe failed: {}", e);
                false
            }
            Err(e) => {
                tracing::debug!("control plane probe task failed: {}", e);
                false
            }
        }
    }

    async fn launch(
        &self,
        base_url: &str,
        ticket_id: &str,
        request: &LaunchTicketRequest,
    ) -> Result<LaunchTicketResponse, RemoteError> {
        let client = self.clone();
        let base_url = base_url.to_string();
        let ticket_id = ticket_id.to_string();
        let request = request.clone();
        tokio::task::spawn_blocking(move || client.launch_ticket(&base_url, &ticket_id, &request))
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?
    }
}
