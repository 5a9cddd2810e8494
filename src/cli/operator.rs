//! Interactive prompts on stdin

use std::io::Write;

use async_trait::async_trait;

use opsession::launcher::{ConflictChoice, Operator, RelaunchChoice};
use opsession::{SessionName, TicketInfo};

/// Asks the user on the terminal
pub struct ConsoleOperator;

#[async_trait]
impl Operator for ConsoleOperator {
    async fn resolve_conflict(&self, session: &SessionName) -> ConflictChoice {
        let question = format!("Session {session} already exists. [f]ocus, [r]estart or [a]bort?");
        match ask(question).await.as_str() {
            "f" | "focus" => ConflictChoice::FocusExisting,
            "r" | "restart" => ConflictChoice::Restart,
            _ => ConflictChoice::Abort,
        }
    }

    async fn choose_relaunch(
        &self,
        ticket: &TicketInfo,
        resume_token: Option<&str>,
    ) -> RelaunchChoice {
        let question = match resume_token {
            Some(token) => format!(
                "Session for {} is gone. [r]esume {token}, start [f]resh or [c]ancel?",
                ticket.id
            ),
            None => format!("Session for {} is gone. Start [f]resh or [c]ancel?", ticket.id),
        };
        match (ask(question).await.as_str(), resume_token) {
            ("r" | "resume", Some(_)) => RelaunchChoice::Resume,
            ("f" | "fresh", _) => RelaunchChoice::StartFresh,
            _ => RelaunchChoice::Cancel,
        }
    }
}

/// Print `question`, read one line, lowercase it. Read errors count as no answer.
async fn ask(question: String) -> String {
    let answer = tokio::task::spawn_blocking(move || {
        println!("{question}");
        let _ = std::io::stdout().flush();
        let mut input = String::new();
        std::io::stdin().read_line(&mut input).map(|_| input)
    })
    .await;

    match answer {
        Ok(Ok(input)) => input.trim().to_lowercase(),
        _ => String::new(),
    }
}

/// Answers from command-line flags where given, otherwise asks on the console
pub struct FlagOperator {
    pub conflict: Option<ConflictChoice>,
    pub relaunch: Option<RelaunchChoice>,
}

#[async_trait]
impl Operator for FlagOperator {
    async fn resolve_conflict(&self, session: &SessionName) -> ConflictChoice {
        match self.conflict {
            Some(choice) => choice,
            None => ConsoleOperator.resolve_conflict(session).await,
        }
    }

    async fn choose_relaunch(
        &self,
        ticket: &TicketInfo,
        resume_token: Option<&str>,
    ) -> RelaunchChoice {
        match (self.relaunch, resume_token) {
            (Some(RelaunchChoice::Resume), None) => {
                tracing::info!("{} has no session to resume; starting fresh", ticket.id);
                RelaunchChoice::StartFresh
            }
            (Some(choice), _) => choice,
            (None, _) => ConsoleOperator.choose_relaunch(ticket, resume_token).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsession::TicketStatus;
    use std::path::PathBuf;

    fn ticket() -> TicketInfo {
        TicketInfo {
            id: "FEAT-1".into(),
            ticket_type: "FEAT".into(),
            title: "Thing".into(),
            status: TicketStatus::Queue,
            file_path: PathBuf::from("/t/FEAT-1.md"),
        }
    }

    #[tokio::test]
    async fn test_flag_operator_uses_flags() {
        let op = FlagOperator {
            conflict: Some(ConflictChoice::Restart),
            relaunch: Some(RelaunchChoice::Resume),
        };
        let name = SessionName::from_raw("op-FEAT-1");
        assert_eq!(op.resolve_conflict(&name).await, ConflictChoice::Restart);
        assert_eq!(
            op.choose_relaunch(&ticket(), Some("abc")).await,
            RelaunchChoice::Resume
        );
        assert_eq!(
            op.choose_relaunch(&ticket(), None).await,
            RelaunchChoice::StartFresh
        );
    }
}
