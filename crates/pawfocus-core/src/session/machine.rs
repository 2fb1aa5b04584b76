//! Focus session state machine.
//!
//! The machine counts whole seconds. It does not own a timer thread: the
//! caller delivers one `tick()` per second while the session is running,
//! carrying the [`ClockToken`] handed out by `start()`.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> (Done | Failed) -> Idle
//! ```
//!
//! `reset()` returns to `Idle` from anywhere. Every other command that does
//! not fit the current state is ignored.

use serde::{Deserialize, Serialize};

use super::clock::{ClockToken, SessionClock};

/// Message recorded when the user gives up without a note.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Failed";

/// Message recorded when strict mode catches the app in the background.
pub const VISIBILITY_LOST_MESSAGE: &str = "Left tab — tree died.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Idle,
    Running,
    Done,
    Failed,
}

impl SessionStatus {
    /// `Done` or `Failed`: only `reset()` leaves these.
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Done | SessionStatus::Failed)
    }
}

/// A terminal transition. The ledger settles exactly one per session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Countdown reached zero. Carries the full planned duration.
    Completed { duration_secs: u64 },
    /// Session abandoned. Carries the seconds actually focused.
    Failed { elapsed_secs: u64, message: String },
}

/// Result of an accepted tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Counted { remaining_secs: u64 },
    Finished(Transition),
}

#[derive(Debug, Clone)]
pub struct SessionMachine {
    status: SessionStatus,
    /// Seconds left in the current session.
    remaining_secs: u64,
    /// Length of the current session, fixed at the last reset.
    planned_secs: u64,
    /// Configured length; becomes `planned_secs` on the next reset.
    next_duration_secs: u64,
    /// Configured strict flag; becomes `strict_mode` on the next start.
    next_strict_mode: bool,
    /// Strict flag of the current session.
    strict_mode: bool,
    message: String,
    clock: SessionClock,
}

impl SessionMachine {
    /// Create an idle machine with a full countdown ready.
    pub fn new(duration_secs: u64, strict_mode: bool) -> Self {
        Self {
            status: SessionStatus::Idle,
            remaining_secs: duration_secs,
            planned_secs: duration_secs,
            next_duration_secs: duration_secs,
            next_strict_mode: strict_mode,
            strict_mode,
            message: String::new(),
            clock: SessionClock::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == SessionStatus::Running
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn planned_secs(&self) -> u64 {
        self.planned_secs
    }

    pub fn strict_mode(&self) -> bool {
        self.strict_mode
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Seconds of the current session already counted down.
    pub fn elapsed_secs(&self) -> u64 {
        self.planned_secs.saturating_sub(self.remaining_secs)
    }

    /// The live clock subscription, present only while running.
    pub fn clock_token(&self) -> Option<ClockToken> {
        self.clock.active()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Stage new settings. The duration is picked up by the next `reset()`
    /// and strict mode by the next `start()`; a running session keeps both.
    pub fn configure(&mut self, duration_secs: u64, strict_mode: bool) {
        self.next_duration_secs = duration_secs;
        self.next_strict_mode = strict_mode;
    }

    pub fn start(&mut self) -> Option<ClockToken> {
        if self.status != SessionStatus::Idle {
            tracing::debug!(status = ?self.status, "start ignored");
            return None;
        }
        self.status = SessionStatus::Running;
        self.strict_mode = self.next_strict_mode;
        self.message.clear();
        Some(self.clock.subscribe())
    }

    /// Count down one second. Ticks from a cancelled subscription, or any
    /// tick outside `Running`, are ignored.
    pub fn tick(&mut self, token: ClockToken) -> Option<TickOutcome> {
        if self.status != SessionStatus::Running || !self.clock.is_live(token) {
            tracing::debug!(status = ?self.status, token = token.id(), "stale tick ignored");
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            return Some(TickOutcome::Counted {
                remaining_secs: self.remaining_secs,
            });
        }
        self.clock.cancel();
        self.status = SessionStatus::Done;
        Some(TickOutcome::Finished(Transition::Completed {
            duration_secs: self.planned_secs,
        }))
    }

    /// Abandon the running session.
    pub fn give_up(&mut self, note: Option<&str>) -> Option<Transition> {
        if self.status != SessionStatus::Running {
            tracing::debug!(status = ?self.status, "give up ignored");
            return None;
        }
        let message = match note {
            Some(note) if !note.is_empty() => note.to_string(),
            _ => DEFAULT_FAILURE_MESSAGE.to_string(),
        };
        Some(self.fail(message))
    }

    /// The host lost foreground visibility. Only fails a running session in
    /// strict mode.
    pub fn visibility_lost(&mut self) -> Option<Transition> {
        if self.status != SessionStatus::Running || !self.strict_mode {
            return None;
        }
        Some(self.fail(VISIBILITY_LOST_MESSAGE.to_string()))
    }

    pub fn reset(&mut self) {
        self.clock.cancel();
        self.status = SessionStatus::Idle;
        self.planned_secs = self.next_duration_secs;
        self.remaining_secs = self.next_duration_secs;
        self.message.clear();
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn fail(&mut self, message: String) -> Transition {
        self.clock.cancel();
        self.status = SessionStatus::Failed;
        self.message = message.clone();
        Transition::Failed {
            elapsed_secs: self.elapsed_secs(),
            message,
        }
    }
}
