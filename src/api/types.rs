//! Wire types for the control plane API

use serde::{Deserialize, Serialize};

/// Identifies this integration to the control plane
pub const WRAPPER_ID: &str = "opsession";

pub const HEALTH_PATH: &str = "/api/v1/health";

pub fn launch_path(ticket_id: &str) -> String {
    format!("/api/v1/tickets/{}/launch", encode_url_path_segment(ticket_id))
}

fn encode_url_path_segment(segment: &str) -> String {
    // RFC3986 unreserved = ALPHA / DIGIT / "-" / "." / "_" / "~"
    let mut out = String::with_capacity(segment.len());
    for &b in segment.as_bytes() {
        let is_unreserved =
            matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~');
        if is_unreserved {
            out.push(b as char);
        } else {
            out.push('%');
            out.push_str(&format!("{:02X}", b));
        }
    }
    out
}

/// Body of `POST /api/v1/tickets/{id}/launch`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchTicketRequest {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub yolo_mode: bool,
    pub wrapper: String,
    pub retry_reason: Option<String>,
    pub resume_session_id: Option<String>,
}

/// Successful launch: everything needed to materialize the session locally
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchTicketResponse {
    pub ticket_id: String,
    pub terminal_name: String,
    pub working_directory: String,
    pub command: String,
    pub worktree_created: bool,
    #[serde(default)]
    pub branch: Option<String>,
}

/// Error body of non-2xx responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_is_camel_case_with_nulls() {
        let request = LaunchTicketRequest {
            provider: None,
            model: Some("sonnet".into()),
            yolo_mode: true,
            wrapper: WRAPPER_ID.into(),
            retry_reason: None,
            resume_session_id: Some("abc".into()),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "provider": null,
                "model": "sonnet",
                "yoloMode": true,
                "wrapper": "opsession",
                "retryReason": null,
                "resumeSessionId": "abc"
            })
        );
    }

    #[test]
    fn test_response_requires_core_fields() {
        let ok: LaunchTicketResponse = serde_json::from_str(
            r#"{"ticketId":"FEAT-1","terminalName":"op-FEAT-1","workingDirectory":"/w","command":"c","worktreeCreated":true}"#,
        )
        .unwrap();
        assert_eq!(ok.branch, None);

        let missing_command = serde_json::from_str::<LaunchTicketResponse>(
            r#"{"ticketId":"FEAT-1","terminalName":"op-FEAT-1","workingDirectory":"/w","worktreeCreated":true}"#,
        );
        assert!(missing_command.is_err());
    }

    #[test]
    fn test_launch_path_encodes_id() {
        assert_eq!(launch_path("FEAT-1"), "/api/v1/tickets/FEAT-1/launch");
        assert_eq!(launch_path("a b/c"), "/api/v1/tickets/a%20b%2Fc/launch");
    }
}
