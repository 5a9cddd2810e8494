//! Shared test utilities: on-disk tickets and a scripted control plane

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tempfile::TempDir;

use opsession::api::{ControlPlane, LaunchTicketRequest, LaunchTicketResponse};
use opsession::ticket::load_ticket;
use opsession::{RemoteError, TicketInfo};

/// Creates a temporary project with an empty `.tickets/queue` directory
pub fn create_test_project() -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    std::fs::create_dir_all(temp_dir.path().join(".tickets").join("queue"))
        .expect("Failed to create tickets dir");
    temp_dir
}

pub fn tickets_dir(project: &TempDir) -> PathBuf {
    project.path().join(".tickets")
}

/// Writes `.tickets/queue/<id>.md` with the given frontmatter body
pub fn write_ticket(project: &TempDir, id: &str, frontmatter: &str) -> PathBuf {
    let path = tickets_dir(project).join("queue").join(format!("{id}.md"));
    let content = format!("---\n{frontmatter}\n---\n# {id} title\n\nBody.\n");
    std::fs::write(&path, content).expect("Failed to write ticket");
    path
}

pub fn ticket_info(path: &Path) -> TicketInfo {
    load_ticket(path).expect("Failed to load ticket")
}

/// Writes the control plane descriptor announcing `port`
pub fn write_descriptor(project: &TempDir, port: u16) {
    let dir = tickets_dir(project).join("operator");
    std::fs::create_dir_all(&dir).expect("Failed to create operator dir");
    let body = format!(
        r#"{{"port":{port},"pid":4242,"startedAt":"2026-01-01T00:00:00Z","version":"0.3.0"}}"#
    );
    std::fs::write(dir.join("api-session.json"), body).expect("Failed to write descriptor");
}

/// A launch response as the control plane would send it
pub fn remote_response(terminal_name: &str, working_directory: &str, command: &str) -> LaunchTicketResponse {
    LaunchTicketResponse {
        ticket_id: terminal_name.trim_start_matches("op-").to_string(),
        terminal_name: terminal_name.to_string(),
        working_directory: working_directory.to_string(),
        command: command.to_string(),
        worktree_created: true,
        branch: None,
    }
}

/// Control plane with scripted answers that counts every call
pub struct FakeControlPlane {
    healthy: bool,
    response: Mutex<Option<Result<LaunchTicketResponse, RemoteError>>>,
    pub probes: AtomicUsize,
    pub launches: AtomicUsize,
    pub probed_urls: Mutex<Vec<String>>,
    pub requests: Mutex<Vec<LaunchTicketRequest>>,
}

impl FakeControlPlane {
    /// Probe fails; launch must never be reached
    pub fn down() -> Self {
        Self::with(false, None)
    }

    pub fn answering(response: Result<LaunchTicketResponse, RemoteError>) -> Self {
        Self::with(true, Some(response))
    }

    fn with(healthy: bool, response: Option<Result<LaunchTicketResponse, RemoteError>>) -> Self {
        Self {
            healthy,
            response: Mutex::new(response),
            probes: AtomicUsize::new(0),
            launches: AtomicUsize::new(0),
            probed_urls: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn launch_count(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<LaunchTicketRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ControlPlane for FakeControlPlane {
    async fn probe(&self, base_url: &str) -> bool {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.probed_urls.lock().unwrap().push(base_url.to_string());
        self.healthy
    }

    async fn launch(
        &self,
        base_url: &str,
        _ticket_id: &str,
        request: &LaunchTicketRequest,
    ) -> Result<LaunchTicketResponse, RemoteError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        self.response
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| {
                Err(RemoteError::Unavailable {
                    url: base_url.to_string(),
                })
            })
    }
}
