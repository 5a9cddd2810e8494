//! Session name -> terminal bookkeeping.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;

use super::activity::ActivityState;
use super::host::{HandleId, HandleSpec, HostEvent, HostEventKind, TerminalHost};
use super::style::TerminalStyle;
use crate::{SESSION_PREFIX, SessionError, SessionName};

/// A tracked terminal
#[derive(Debug, Clone)]
pub struct TerminalRecord {
    pub handle: HandleId,
    pub activity: ActivityState,
    pub created_at: DateTime<Utc>,
    /// Most recent text sent to the terminal
    pub last_command: Option<String>,
}

/// Snapshot row returned by [`TerminalManager::list`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub name: SessionName,
    pub activity: ActivityState,
    pub created_at: DateTime<Utc>,
}

/// Records plus the reverse handle lookup used for event dispatch.
/// Both maps are always updated together.
#[derive(Debug, Default)]
struct SessionTable {
    records: BTreeMap<SessionName, TerminalRecord>,
    by_handle: HashMap<HandleId, SessionName>,
}

impl SessionTable {
    fn insert(&mut self, name: SessionName, record: TerminalRecord) {
        self.by_handle.insert(record.handle.clone(), name.clone());
        if let Some(old) = self.records.insert(name, record) {
            self.by_handle.remove(&old.handle);
        }
    }

    fn remove(&mut self, name: &SessionName) -> Option<TerminalRecord> {
        let record = self.records.remove(name)?;
        self.by_handle.remove(&record.handle);
        Some(record)
    }

    fn handle_of(&self, name: &SessionName) -> Option<HandleId> {
        self.records.get(name).map(|r| r.handle.clone())
    }

    fn apply_event(&mut self, event: &HostEvent) -> Option<ActivityState> {
        let name = self.by_handle.get(&event.handle)?.clone();
        if event.kind == HostEventKind::Closed {
            self.remove(&name);
            tracing::debug!("session {} closed by host", name);
            return Some(ActivityState::Unknown);
        }

        let record = self.records.get_mut(&name)?;
        record.activity = record.activity.apply(event.kind);
        tracing::trace!("session {} is now {}", name, record.activity);
        Some(record.activity)
    }
}

fn lock(table: &Mutex<SessionTable>) -> MutexGuard<'_, SessionTable> {
    table.lock().unwrap_or_else(|e| e.into_inner())
}

/// Owns every terminal this process launched.
///
/// At most one live handle exists per [`SessionName`]: creating a session
/// that already exists kills the old terminal first. The record table is only
/// mutated through this type's operations and the host event feed.
pub struct TerminalManager {
    host: Arc<dyn TerminalHost>,
    table: Arc<Mutex<SessionTable>>,
    event_pump: Mutex<Option<JoinHandle<()>>>,
}

impl TerminalManager {
    pub fn new(host: Arc<dyn TerminalHost>) -> Self {
        Self {
            host,
            table: Arc::new(Mutex::new(SessionTable::default())),
            event_pump: Mutex::new(None),
        }
    }

    /// Start applying host events to the record table.
    ///
    /// Must be called from within a tokio runtime. Calling it again is a no-op.
    pub fn listen(&self) {
        let mut pump = self.event_pump.lock().unwrap_or_else(|e| e.into_inner());
        if pump.is_some() {
            return;
        }
        let Some(mut events) = self.host.subscribe() else {
            tracing::debug!("{} host emits no activity events", self.host.id());
            return;
        };

        let table = Arc::clone(&self.table);
        *pump = Some(tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                lock(&table).apply_event(&event);
            }
        }));
    }

    /// Apply one host event. Events for untracked handles are ignored (`None`).
    pub fn apply_event(&self, event: &HostEvent) -> Option<ActivityState> {
        lock(&self.table).apply_event(event)
    }

    /// Allocate a fresh terminal for `name`, replacing any existing one.
    pub async fn create(
        &self,
        name: &SessionName,
        working_dir: &Path,
        env: Option<&BTreeMap<String, String>>,
    ) -> Result<HandleId, SessionError> {
        if self.exists(name) {
            tracing::info!("replacing existing terminal for {}", name);
            self.kill(name).await;
        }

        let spec = HandleSpec {
            name: name.to_string(),
            cwd: working_dir.to_path_buf(),
            env: env.cloned().unwrap_or_default(),
            style: TerminalStyle::for_session(name),
        };
        let handle = self.host.create_handle(&spec).await?;

        lock(&self.table).insert(
            name.clone(),
            TerminalRecord {
                handle: handle.clone(),
                activity: ActivityState::Idle,
                created_at: Utc::now(),
                last_command: None,
            },
        );
        tracing::info!(
            "created terminal {} ({}) in {}",
            name,
            handle,
            working_dir.display()
        );
        Ok(handle)
    }

    /// Send a command to the session's terminal without waiting for it to finish
    pub async fn send(&self, name: &SessionName, command: &str) -> Result<(), SessionError> {
        let handle = self.require(name)?;
        self.host.send_text(&handle, command).await?;

        if let Some(record) = lock(&self.table).records.get_mut(name) {
            record.last_command = Some(command.to_string());
        }
        Ok(())
    }

    /// Make the terminal visible without taking input focus
    pub async fn show(&self, name: &SessionName) -> Result<(), SessionError> {
        let handle = self.require(name)?;
        self.host.reveal(&handle, false).await?;
        Ok(())
    }

    /// Make the terminal visible and give it input focus
    pub async fn focus(&self, name: &SessionName) -> Result<(), SessionError> {
        let handle = self.require(name)?;
        self.host.reveal(&handle, true).await?;
        Ok(())
    }

    /// Dispose the session's terminal. Killing an unknown session is a no-op.
    ///
    /// Returns whether a session was tracked.
    pub async fn kill(&self, name: &SessionName) -> bool {
        let Some(record) = lock(&self.table).remove(name) else {
            return false;
        };

        if let Err(e) = self.host.dispose(&record.handle).await {
            tracing::warn!("failed to dispose terminal {} ({}): {}", name, record.handle, e);
        }
        tracing::info!("killed terminal {}", name);
        true
    }

    pub fn exists(&self, name: &SessionName) -> bool {
        lock(&self.table).records.contains_key(name)
    }

    /// Current activity, `Unknown` for untracked sessions
    pub fn activity_of(&self, name: &SessionName) -> ActivityState {
        lock(&self.table)
            .records
            .get(name)
            .map(|r| r.activity)
            .unwrap_or(ActivityState::Unknown)
    }

    /// The last command sent to a session, if any
    pub fn last_command(&self, name: &SessionName) -> Option<String> {
        lock(&self.table)
            .records
            .get(name)
            .and_then(|r| r.last_command.clone())
    }

    /// Snapshot of all tracked sessions, ordered by name
    pub fn list(&self) -> Vec<SessionSummary> {
        lock(&self.table)
            .records
            .iter()
            .map(|(name, record)| SessionSummary {
                name: name.clone(),
                activity: record.activity,
                created_at: record.created_at,
            })
            .collect()
    }

    /// Adopt `op-` terminals the host already has (e.g. from an earlier process).
    ///
    /// Adopted sessions start `running` when the host reports them busy,
    /// `idle` otherwise. Returns the number of sessions adopted.
    pub async fn restore(&self) -> Result<usize, SessionError> {
        let existing = self.host.existing().await?;

        let mut table = lock(&self.table);
        let mut adopted = 0;
        for found in existing {
            let name = SessionName::from_raw(found.name);
            if !name.as_str().starts_with(SESSION_PREFIX) || table.records.contains_key(&name) {
                continue;
            }
            table.insert(
                name,
                TerminalRecord {
                    handle: found.handle,
                    activity: if found.busy {
                        ActivityState::Running
                    } else {
                        ActivityState::Idle
                    },
                    created_at: found.created_at.unwrap_or_else(Utc::now),
                    last_command: None,
                },
            );
            adopted += 1;
        }
        Ok(adopted)
    }

    /// Kill every tracked session and stop listening to host events
    pub async fn dispose_all(&self) {
        if let Some(pump) = self
            .event_pump
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            pump.abort();
        }

        let names: Vec<SessionName> = lock(&self.table).records.keys().cloned().collect();
        for name in names {
            self.kill(&name).await;
        }
    }

    fn require(&self, name: &SessionName) -> Result<HandleId, SessionError> {
        lock(&self.table)
            .handle_of(name)
            .ok_or_else(|| SessionError::NotFound(name.to_string()))
    }
}

impl Drop for TerminalManager {
    fn drop(&mut self) {
        if let Some(pump) = self
            .event_pump
            .get_mut()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            pump.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::recording::{HostCall, RecordingHost};
    use crate::build_session_name;

    fn manager() -> (Arc<RecordingHost>, TerminalManager) {
        let host = Arc::new(RecordingHost::new());
        let manager = TerminalManager::new(host.clone());
        (host, manager)
    }

    #[tokio::test]
    async fn test_create_sets_idle_and_styles_terminal() {
        let (host, manager) = manager();
        let name = build_session_name("FEAT-1");

        assert_eq!(manager.activity_of(&name), ActivityState::Unknown);
        manager.create(&name, Path::new("/w"), None).await.unwrap();

        assert!(manager.exists(&name));
        assert_eq!(manager.activity_of(&name), ActivityState::Idle);
        let spec = host.created_specs().pop().unwrap();
        assert_eq!(spec.name, "op-FEAT-1");
        assert_eq!(spec.style, TerminalStyle::for_session(&name));
    }

    #[tokio::test]
    async fn test_create_twice_leaves_one_live_handle() {
        let (host, manager) = manager();
        let name = build_session_name("FEAT-1");

        let first = manager.create(&name, Path::new("/a"), None).await.unwrap();
        let second = manager.create(&name, Path::new("/b"), None).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(host.live_handles(), vec![second.clone()]);
        let list = manager.list();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, name);

        // The old handle no longer routes events
        assert_eq!(
            manager.apply_event(&HostEvent::new(first, HostEventKind::ExecutionStarted)),
            None
        );
        assert_eq!(manager.activity_of(&name), ActivityState::Idle);
    }

    #[tokio::test]
    async fn test_host_failure_leaves_no_record() {
        let (host, manager) = manager();
        host.fail_next_create();
        let name = build_session_name("FIX-2");

        let err = manager.create(&name, Path::new("/w"), None).await.unwrap_err();
        assert!(matches!(err, SessionError::HostUnavailable(_)));
        assert!(!manager.exists(&name));
        assert!(manager.list().is_empty());
    }

    #[tokio::test]
    async fn test_operations_on_missing_session_are_not_found() {
        let (host, manager) = manager();
        let name = build_session_name("NOPE-1");

        assert!(manager.send(&name, "ls").await.unwrap_err().is_not_found());
        assert!(manager.show(&name).await.unwrap_err().is_not_found());
        assert!(manager.focus(&name).await.unwrap_err().is_not_found());
        assert!(host.calls().is_empty());
    }

    #[tokio::test]
    async fn test_kill_missing_is_noop() {
        let (host, manager) = manager();
        let name = build_session_name("FEAT-1");
        manager.create(&name, Path::new("/w"), None).await.unwrap();
        let before = manager.list();

        assert!(!manager.kill(&build_session_name("OTHER-1")).await);
        assert_eq!(manager.list(), before);
        assert_eq!(host.live_handles().len(), 1);
    }

    #[tokio::test]
    async fn test_send_show_focus_reach_host() {
        let (host, manager) = manager();
        let name = build_session_name("FEAT-1");
        let handle = manager.create(&name, Path::new("/w"), None).await.unwrap();

        manager.send(&name, "echo hi").await.unwrap();
        manager.show(&name).await.unwrap();
        manager.focus(&name).await.unwrap();

        let calls = host.calls();
        assert_eq!(
            &calls[1..],
            &[
                HostCall::Send(handle.clone(), "echo hi".to_string()),
                HostCall::Reveal(handle.clone(), false),
                HostCall::Reveal(handle, true),
            ]
        );
        assert_eq!(manager.last_command(&name).as_deref(), Some("echo hi"));
    }

    #[tokio::test]
    async fn test_activity_events() {
        let (_host, manager) = manager();
        let name = build_session_name("FEAT-1");
        let handle = manager.create(&name, Path::new("/w"), None).await.unwrap();

        let started = HostEvent::new(handle.clone(), HostEventKind::ExecutionStarted);
        assert_eq!(manager.apply_event(&started), Some(ActivityState::Running));
        assert_eq!(manager.activity_of(&name), ActivityState::Running);

        let ended = HostEvent::new(handle.clone(), HostEventKind::ExecutionEnded);
        assert_eq!(manager.apply_event(&ended), Some(ActivityState::Idle));

        manager.apply_event(&started);
        let closed = HostEvent::new(handle, HostEventKind::Closed);
        manager.apply_event(&closed);
        assert!(!manager.exists(&name));
        assert_eq!(manager.activity_of(&name), ActivityState::Unknown);

        let stranger = HostEvent::new(HandleId("x".into()), HostEventKind::ExecutionStarted);
        assert_eq!(manager.apply_event(&stranger), None);
    }

    #[tokio::test]
    async fn test_listen_applies_event_feed() {
        let (host, manager) = manager();
        manager.listen();
        let name = build_session_name("FEAT-1");
        let handle = manager.create(&name, Path::new("/w"), None).await.unwrap();

        host.emit(HostEvent::new(handle, HostEventKind::ExecutionStarted));
        for _ in 0..50 {
            if manager.activity_of(&name) == ActivityState::Running {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(manager.activity_of(&name), ActivityState::Running);
    }

    #[tokio::test]
    async fn test_list_is_sorted_snapshot() {
        let (_host, manager) = manager();
        for id in ["FIX-2", "FEAT-9", "BUG-1"] {
            manager
                .create(&build_session_name(id), Path::new("/w"), None)
                .await
                .unwrap();
        }
        let names: Vec<String> = manager.list().into_iter().map(|s| s.name.to_string()).collect();
        assert_eq!(names, vec!["op-BUG-1", "op-FEAT-9", "op-FIX-2"]);
    }

    #[tokio::test]
    async fn test_restore_adopts_prefixed_sessions() {
        let (host, manager) = manager();
        host.add_existing("op-FEAT-3", "%3");
        host.add_existing("scratch", "%4");

        assert_eq!(manager.restore().await.unwrap(), 1);
        let name = SessionName::from_raw("op-FEAT-3");
        assert!(manager.exists(&name));
        assert_eq!(manager.activity_of(&name), ActivityState::Idle);
        assert_eq!(manager.restore().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_restore_keeps_busy_sessions_running() {
        let (host, manager) = manager();
        host.add_busy_existing("op-FEAT-4", "%5");

        assert_eq!(manager.restore().await.unwrap(), 1);
        let name = SessionName::from_raw("op-FEAT-4");
        assert_eq!(manager.activity_of(&name), ActivityState::Running);

        let listed = manager.list();
        assert_eq!(listed[0].activity, ActivityState::Running);

        // The host's first snapshot reports the same busy pane; state holds
        manager.apply_event(&HostEvent::new(HandleId("%5".into()), HostEventKind::ExecutionStarted));
        assert_eq!(manager.activity_of(&name), ActivityState::Running);
    }

    #[tokio::test]
    async fn test_dispose_all() {
        let (host, manager) = manager();
        manager.listen();
        for id in ["A-1", "B-2"] {
            manager
                .create(&build_session_name(id), Path::new("/w"), None)
                .await
                .unwrap();
        }

        manager.dispose_all().await;
        assert!(manager.list().is_empty());
        assert!(host.live_handles().is_empty());
    }
}
