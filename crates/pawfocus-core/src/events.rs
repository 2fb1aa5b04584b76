use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::SessionStatus;

/// Every state change in the system produces an Event.
/// Front ends render these; they never reach into the app state directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        duration_secs: u64,
        strict_mode: bool,
        at: DateTime<Utc>,
    },
    Ticked {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    SessionCompleted {
        duration_secs: u64,
        earned_treats: u64,
        total_treats: u64,
        at: DateTime<Utc>,
    },
    SessionFailed {
        elapsed_secs: u64,
        message: String,
        at: DateTime<Utc>,
    },
    SessionReset {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    DonationRecorded {
        shelter: String,
        cents: u64,
        total_donated_cents: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        status: SessionStatus,
        remaining_secs: u64,
        planned_secs: u64,
        message: String,
        strict_mode: bool,
        treats: u64,
        pledged_cents: u64,
        donated_cents: u64,
        outstanding_cents: u64,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// True for the events that close a session.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Event::SessionCompleted { .. } | Event::SessionFailed { .. }
        )
    }
}
