//! Session clock subscription.
//!
//! The machine holds at most one live subscription. Each subscription gets a
//! fresh [`ClockToken`]; a tick is only honoured if it carries the token that
//! is live right now, so ticks queued before a cancel are dropped.

use serde::{Deserialize, Serialize};

/// Identifies one clock subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClockToken(u64);

impl ClockToken {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// One-per-second tick source bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct SessionClock {
    active: Option<ClockToken>,
    issued: u64,
}

impl SessionClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the subscription. Returns the live token unchanged if one is
    /// already held.
    pub fn subscribe(&mut self) -> ClockToken {
        if let Some(token) = self.active {
            return token;
        }
        self.issued += 1;
        let token = ClockToken(self.issued);
        self.active = Some(token);
        token
    }

    /// Release the subscription, returning the token that was live.
    pub fn cancel(&mut self) -> Option<ClockToken> {
        self.active.take()
    }

    pub fn active(&self) -> Option<ClockToken> {
        self.active
    }

    pub fn is_live(&self, token: ClockToken) -> bool {
        self.active == Some(token)
    }
}
