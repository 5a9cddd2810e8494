//! Launch options for agent sessions

use serde::{Deserialize, Serialize};

/// Options for a single launch request.
///
/// Immutable once handed to the launcher; relaunches build a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchOptions {
    /// Model identifier passed to the agent CLI
    pub model: String,
    /// Run in YOLO (skip permission prompts) mode
    pub yolo_mode: bool,
    /// Resume the ticket's recorded agent session instead of starting fresh
    pub resume_session: bool,
    /// LLM provider hint for the control plane (if None, it picks its default)
    pub provider: Option<String>,
    /// Feedback from a previous attempt, forwarded to the control plane
    pub retry_reason: Option<String>,
}

impl LaunchOptions {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            yolo_mode: false,
            resume_session: false,
            provider: None,
            retry_reason: None,
        }
    }

    pub fn with_yolo(mut self, yolo_mode: bool) -> Self {
        self.yolo_mode = yolo_mode;
        self
    }

    pub fn with_resume(mut self, resume_session: bool) -> Self {
        self.resume_session = resume_session;
        self
    }

    pub fn with_provider(mut self, provider: Option<String>) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_retry_reason(mut self, retry_reason: Option<String>) -> Self {
        self.retry_reason = retry_reason;
        self
    }

    /// Short label used in logs
    pub fn launch_mode_string(&self) -> &'static str {
        match (self.yolo_mode, self.resume_session) {
            (true, true) => "yolo-resume",
            (true, false) => "yolo",
            (false, true) => "resume",
            (false, false) => "default",
        }
    }
}
