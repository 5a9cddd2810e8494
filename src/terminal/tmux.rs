//! tmux terminal host
//!
//! Each session is a detached tmux session named after the [`SessionName`];
//! the handle is tmux's stable session id (`$N`). Activity is derived by
//! polling `list-panes`: a pane running something other than a shell is
//! executing, a pane back at its shell is idle, and a vanished session is
//! closed.
//!
//! [`SessionName`]: crate::SessionName

use async_trait::async_trait;
use chrono::DateTime;
use std::collections::HashMap;
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::mpsc;

use super::host::{
    ExistingHandle, HandleId, HandleSpec, HostEvent, HostEventKind, TerminalHost,
};
use crate::HostError;

const SHELLS: &[&str] = &["bash", "zsh", "fish", "sh", "dash", "ksh", "tcsh", "csh", "nu"];

/// tmux host implementation
pub struct TmuxHost {
    poll_interval: Duration,
}

impl Default for TmuxHost {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(1000),
        }
    }
}

impl TmuxHost {
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    /// Check whether tmux is installed
    pub async fn is_available() -> bool {
        Command::new("tmux")
            .arg("-V")
            .output()
            .await
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

/// Run a tmux command and return its trimmed stdout
async fn run_tmux(args: &[&str]) -> Result<String, HostError> {
    let output = Command::new("tmux").args(args).output().await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            HostError::NotAvailable("tmux")
        } else {
            HostError::Io(e)
        }
    })?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(HostError::CommandFailed(format!(
            "tmux {} failed: {}",
            args.join(" "),
            stderr.trim()
        )))
    }
}

fn is_no_server(err: &HostError) -> bool {
    matches!(err, HostError::CommandFailed(msg)
        if msg.contains("no server running") || msg.contains("error connecting"))
}

fn is_missing_session(err: &HostError) -> bool {
    matches!(err, HostError::CommandFailed(msg)
        if msg.contains("can't find session") || msg.contains("no server running"))
}

#[async_trait]
impl TerminalHost for TmuxHost {
    fn id(&self) -> &'static str {
        "tmux"
    }

    async fn create_handle(&self, spec: &HandleSpec) -> Result<HandleId, HostError> {
        let cwd = spec.cwd.to_string_lossy().to_string();
        let mut args: Vec<String> = vec![
            "new-session".into(),
            "-d".into(),
            "-P".into(),
            "-F".into(),
            "#{session_id}".into(),
            "-s".into(),
            spec.name.clone(),
            "-c".into(),
            cwd,
        ];
        for (key, value) in &spec.env {
            args.push("-e".into());
            args.push(format!("{key}={value}"));
        }
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let handle = HandleId(run_tmux(&args).await?);

        let style = format!("bg={},fg=black", spec.style.color.tmux_colour());
        for option in [
            ["set-option", "-t", handle.0.as_str(), "status-style", style.as_str()],
            ["set-option", "-t", handle.0.as_str(), "@opsession-icon", spec.style.icon],
        ] {
            if let Err(e) = run_tmux(&option).await {
                tracing::debug!("could not style tmux session {}: {}", spec.name, e);
            }
        }

        Ok(handle)
    }

    async fn send_text(&self, handle: &HandleId, text: &str) -> Result<(), HostError> {
        run_tmux(&["send-keys", "-t", &handle.0, "-l", text]).await?;
        run_tmux(&["send-keys", "-t", &handle.0, "Enter"]).await?;
        Ok(())
    }

    async fn reveal(&self, handle: &HandleId, steal_focus: bool) -> Result<(), HostError> {
        run_tmux(&["has-session", "-t", &handle.0]).await?;
        if !steal_focus {
            return Ok(());
        }

        if std::env::var_os("TMUX").is_some() {
            run_tmux(&["switch-client", "-t", &handle.0]).await?;
        } else {
            let name = run_tmux(&["display-message", "-p", "-t", &handle.0, "#{session_name}"])
                .await
                .unwrap_or_else(|_| handle.0.clone());
            tracing::info!("not inside tmux; attach with: tmux attach -t {}", name);
        }
        Ok(())
    }

    async fn dispose(&self, handle: &HandleId) -> Result<(), HostError> {
        match run_tmux(&["kill-session", "-t", &handle.0]).await {
            Err(e) if is_missing_session(&e) => Ok(()),
            other => other.map(|_| ()),
        }
    }

    fn subscribe(&self) -> Option<mpsc::UnboundedReceiver<HostEvent>> {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(poll_activity(tx, self.poll_interval, pane_snapshot));
        Some(rx)
    }

    async fn existing(&self) -> Result<Vec<ExistingHandle>, HostError> {
        let output = match run_tmux(&[
            "list-sessions",
            "-F",
            "#{session_id}\t#{session_name}\t#{session_created}",
        ])
        .await
        {
            Ok(output) => output,
            Err(e) if is_no_server(&e) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut sessions: Vec<ExistingHandle> =
            output.lines().filter_map(parse_session_line).collect();
        match pane_snapshot().await {
            Ok(panes) => mark_busy(&mut sessions, &panes),
            Err(e) => tracing::debug!("tmux pane snapshot failed, sessions listed as idle: {}", e),
        }
        Ok(sessions)
    }
}

/// Diff successive snapshots into events until the receiver goes away.
async fn poll_activity<F, Fut>(
    tx: mpsc::UnboundedSender<HostEvent>,
    interval: Duration,
    mut snapshot: F,
) where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<HashMap<HandleId, bool>, HostError>>,
{
    let mut previous: HashMap<HandleId, bool> = HashMap::new();
    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            _ = tx.closed() => return,
            _ = ticker.tick() => {}
        }
        let current = match snapshot().await {
            Ok(current) => current,
            Err(e) => {
                tracing::trace!("tmux snapshot failed: {}", e);
                continue;
            }
        };
        for event in activity_diff(&previous, &current) {
            if tx.send(event).is_err() {
                return;
            }
        }
        previous = current;
    }
}

fn parse_session_line(line: &str) -> Option<ExistingHandle> {
    let mut parts = line.trim().splitn(3, '\t');
    let id = parts.next()?.trim();
    let name = parts.next()?.trim();
    if id.is_empty() || name.is_empty() {
        return None;
    }
    let created_at = parts
        .next()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .and_then(|secs| DateTime::from_timestamp(secs, 0));

    Some(ExistingHandle {
        name: name.to_string(),
        handle: HandleId(id.to_string()),
        created_at,
        busy: false,
    })
}

fn mark_busy(sessions: &mut [ExistingHandle], panes: &HashMap<HandleId, bool>) {
    for session in sessions {
        session.busy = panes.get(&session.handle).copied().unwrap_or(false);
    }
}

/// Session id -> "first pane is running something other than a shell"
async fn pane_snapshot() -> Result<HashMap<HandleId, bool>, HostError> {
    let output = match run_tmux(&[
        "list-panes",
        "-a",
        "-F",
        "#{session_id}\t#{pane_index}\t#{pane_current_command}",
    ])
    .await
    {
        Ok(output) => output,
        Err(e) if is_no_server(&e) => String::new(),
        Err(e) => return Err(e),
    };
    Ok(parse_panes(&output))
}

fn parse_panes(output: &str) -> HashMap<HandleId, bool> {
    let mut sessions = HashMap::new();
    for line in output.lines() {
        let mut parts = line.trim().splitn(3, '\t');
        let (Some(id), Some(_pane), Some(command)) = (parts.next(), parts.next(), parts.next())
        else {
            continue;
        };
        sessions
            .entry(HandleId(id.to_string()))
            .or_insert_with(|| is_busy(command));
    }
    sessions
}

fn is_busy(command: &str) -> bool {
    let command = command.trim().trim_start_matches('-');
    !command.is_empty() && !SHELLS.contains(&command)
}

/// Events needed to move from one pane snapshot to the next
fn activity_diff(
    previous: &HashMap<HandleId, bool>,
    current: &HashMap<HandleId, bool>,
) -> Vec<HostEvent> {
    let mut events = Vec::new();

    for (handle, &busy) in current {
        let was_busy = previous.get(handle).copied().unwrap_or(false);
        if busy && !was_busy {
            events.push(HostEvent::new(handle.clone(), HostEventKind::ExecutionStarted));
        } else if !busy && was_busy {
            events.push(HostEvent::new(handle.clone(), HostEventKind::ExecutionEnded));
        }
    }
    for handle in previous.keys() {
        if !current.contains_key(handle) {
            events.push(HostEvent::new(handle.clone(), HostEventKind::Closed));
        }
    }

    events.sort_by(|a, b| a.handle.cmp(&b.handle));
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(entries: &[(&str, bool)]) -> HashMap<HandleId, bool> {
        entries
            .iter()
            .map(|(id, busy)| (HandleId(id.to_string()), *busy))
            .collect()
    }

    #[test]
    fn test_parse_panes_uses_first_pane() {
        let output = "$1\t0\tclaude\n$1\t1\tzsh\n$2\t0\t-bash\nbroken line\n";
        let parsed = parse_panes(output);
        assert_eq!(parsed.len(), 2);
        assert!(parsed[&HandleId("$1".into())]);
        assert!(!parsed[&HandleId("$2".into())]);
    }

    #[test]
    fn test_activity_diff() {
        let previous = snapshot(&[("$1", false), ("$2", true), ("$3", true)]);
        let current = snapshot(&[("$1", true), ("$2", false), ("$4", false)]);

        let events = activity_diff(&previous, &current);
        assert_eq!(
            events,
            vec![
                HostEvent::new(HandleId("$1".into()), HostEventKind::ExecutionStarted),
                HostEvent::new(HandleId("$2".into()), HostEventKind::ExecutionEnded),
                HostEvent::new(HandleId("$3".into()), HostEventKind::Closed),
            ]
        );
    }

    #[test]
    fn test_activity_diff_steady_state_is_quiet() {
        let snap = snapshot(&[("$1", true), ("$2", false)]);
        assert!(activity_diff(&snap, &snap).is_empty());
    }

    #[test]
    fn test_parse_session_line() {
        let parsed = parse_session_line("$7\top-FEAT-1\t1700000000").unwrap();
        assert_eq!(parsed.name, "op-FEAT-1");
        assert_eq!(parsed.handle, HandleId("$7".into()));
        assert_eq!(parsed.created_at.unwrap().timestamp(), 1_700_000_000);

        let no_time = parse_session_line("$8\tscratch\t").unwrap();
        assert_eq!(no_time.created_at, None);
        assert!(parse_session_line("").is_none());
    }

    #[tokio::test]
    async fn test_poller_forwards_changes_and_stops_without_receiver() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let poller = tokio::spawn(poll_activity(tx, Duration::from_millis(5), || async {
            Ok(snapshot(&[("$1", true)]))
        }));

        let first = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap();
        assert_eq!(
            first,
            Some(HostEvent::new(HandleId("$1".into()), HostEventKind::ExecutionStarted))
        );

        // Steady state produces no events, so only the closed channel can end the loop
        drop(rx);
        tokio::time::timeout(Duration::from_secs(1), poller)
            .await
            .expect("poller kept running after the receiver was dropped")
            .unwrap();
    }

    #[test]
    fn test_mark_busy_from_panes() {
        let mut sessions = vec![
            parse_session_line("$1\top-FEAT-1\t").unwrap(),
            parse_session_line("$2\top-FIX-2\t").unwrap(),
            parse_session_line("$3\top-BUG-3\t").unwrap(),
        ];
        mark_busy(&mut sessions, &parse_panes("$1\t0\tclaude\n$2\t0\tzsh\n"));

        let busy: Vec<bool> = sessions.iter().map(|s| s.busy).collect();
        assert_eq!(busy, vec![true, false, false]);
    }

    #[test]
    fn test_is_busy() {
        assert!(is_busy("claude"));
        assert!(is_busy("node"));
        assert!(!is_busy("zsh"));
        assert!(!is_busy("-zsh"));
        assert!(!is_busy(""));
    }
}
