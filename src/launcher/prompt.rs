//! Operator decisions the launcher needs.

use async_trait::async_trait;

use crate::{SessionName, TicketInfo};

/// What to do when a launch targets a session that is already live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictChoice {
    /// Bring the existing terminal forward and stop
    FocusExisting,
    /// Kill the existing terminal and launch again
    Restart,
    /// Do nothing
    Abort,
}

/// How to relaunch a ticket whose session is gone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelaunchChoice {
    Resume,
    StartFresh,
    Cancel,
}

/// The human (or policy) answering launch questions
#[async_trait]
pub trait Operator: Send + Sync {
    async fn resolve_conflict(&self, session: &SessionName) -> ConflictChoice;

    /// `resume_token` is the ticket's resumable session, if it has one
    async fn choose_relaunch(
        &self,
        ticket: &TicketInfo,
        resume_token: Option<&str>,
    ) -> RelaunchChoice;
}

/// Answers every question the same way; for non-interactive use
#[derive(Debug, Clone, Copy)]
pub struct PresetOperator {
    pub conflict: ConflictChoice,
    pub relaunch: RelaunchChoice,
}

impl PresetOperator {
    pub fn new(conflict: ConflictChoice, relaunch: RelaunchChoice) -> Self {
        Self { conflict, relaunch }
    }
}

#[async_trait]
impl Operator for PresetOperator {
    async fn resolve_conflict(&self, _session: &SessionName) -> ConflictChoice {
        self.conflict
    }

    async fn choose_relaunch(
        &self,
        _ticket: &TicketInfo,
        resume_token: Option<&str>,
    ) -> RelaunchChoice {
        match (self.relaunch, resume_token) {
            (RelaunchChoice::Resume, None) => RelaunchChoice::StartFresh,
            (choice, _) => choice,
        }
    }
}
