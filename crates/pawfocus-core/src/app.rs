//! Application context.
//!
//! [`App`] owns the settings, the session machine, the ledger and the store.
//! Settings are loaded first and seed the machine; every terminal transition
//! is settled against the ledger and persisted before the call returns, so
//! the next `start()` always sees an up-to-date ledger.

use chrono::Utc;
use std::path::Path;

use crate::donation::{donate_now, DonationHandoff, DonationOutcome};
use crate::error::{ConfigError, Result};
use crate::events::Event;
use crate::ledger::{LedgerSummary, RewardLedger};
use crate::session::{ClockToken, SessionMachine, TickOutcome, Transition};
use crate::storage::{Database, KvStore, SessionConfig};

pub struct App<S: KvStore> {
    store: S,
    config: SessionConfig,
    session: SessionMachine,
    ledger: RewardLedger,
}

impl App<Database> {
    /// Open the app on the default on-disk database.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened.
    pub fn open() -> Result<Self> {
        Ok(Self::load(Database::open()?))
    }
}

impl<S: KvStore> App<S> {
    pub fn load(store: S) -> Self {
        let config = SessionConfig::load(&store);
        let session = SessionMachine::new(config.duration_secs, config.strict_mode);
        let ledger = RewardLedger::load(&store);
        Self {
            store,
            config,
            session,
            ledger,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionMachine {
        &self.session
    }

    pub fn ledger(&self) -> &RewardLedger {
        &self.ledger
    }

    pub fn pledged_cents(&self) -> u64 {
        self.ledger.pledged_cents(self.config.pledge_rate_cents)
    }

    pub fn outstanding_cents(&self) -> u64 {
        self.ledger.outstanding_cents(self.config.pledge_rate_cents)
    }

    pub fn summary(&self) -> LedgerSummary {
        self.ledger.summary(self.config.pledge_rate_cents)
    }

    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            status: self.session.status(),
            remaining_secs: self.session.remaining_secs(),
            planned_secs: self.session.planned_secs(),
            message: self.session.message().to_string(),
            strict_mode: self.config.strict_mode,
            treats: self.ledger.treats(),
            pledged_cents: self.pledged_cents(),
            donated_cents: self.ledger.donated_cents(),
            outstanding_cents: self.outstanding_cents(),
            at: Utc::now(),
        }
    }

    // ── Settings ─────────────────────────────────────────────────────

    /// Edit the settings through `edit`, then validate and persist them.
    /// A new duration shows up on the next reset.
    ///
    /// # Errors
    /// `SessionRunning` while a session counts down, or whatever `edit` and
    /// validation report. Settings are unchanged on error.
    pub fn update_config<F>(&mut self, edit: F) -> Result<(), ConfigError>
    where
        F: FnOnce(&mut SessionConfig) -> Result<(), ConfigError>,
    {
        if self.session.is_running() {
            return Err(ConfigError::SessionRunning);
        }
        let mut next = self.config.clone();
        edit(&mut next)?;
        next.validate()?;
        next.save(&self.store);
        self.session
            .configure(next.duration_secs, next.strict_mode);
        self.config = next;
        Ok(())
    }

    /// Replace the settings with those in a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or a session
    /// is running.
    pub fn import_config(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)?;
        let imported = SessionConfig::from_toml(&content)?;
        self.update_config(|cfg| {
            *cfg = imported;
            Ok(())
        })?;
        Ok(())
    }

    // ── Session commands ─────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        self.session.start()?;
        tracing::info!(
            duration_secs = self.session.planned_secs(),
            strict_mode = self.session.strict_mode(),
            "session started"
        );
        Some(Event::SessionStarted {
            duration_secs: self.session.planned_secs(),
            strict_mode: self.session.strict_mode(),
            at: Utc::now(),
        })
    }

    pub fn tick(&mut self, token: ClockToken) -> Option<Event> {
        match self.session.tick(token)? {
            TickOutcome::Counted { remaining_secs } => Some(Event::Ticked {
                remaining_secs,
                at: Utc::now(),
            }),
            TickOutcome::Finished(transition) => Some(self.settle(transition)),
        }
    }

    pub fn give_up(&mut self, note: Option<&str>) -> Option<Event> {
        let transition = self.session.give_up(note)?;
        Some(self.settle(transition))
    }

    pub fn visibility_lost(&mut self) -> Option<Event> {
        let transition = self.session.visibility_lost()?;
        Some(self.settle(transition))
    }

    pub fn reset(&mut self) -> Event {
        self.session.reset();
        Event::SessionReset {
            remaining_secs: self.session.remaining_secs(),
            at: Utc::now(),
        }
    }

    // ── Donations ────────────────────────────────────────────────────

    /// Run the donation recorder against the current outstanding pledge.
    /// Returns `None` when the user declined.
    ///
    /// The ledger is re-read first and again after confirmation, so a
    /// session settled by another process while the user was at the
    /// shelter's page is neither lost nor counted twice.
    ///
    /// # Errors
    /// See [`donate_now`]; the ledger is untouched on error.
    pub fn donate(&mut self, handoff: &mut impl DonationHandoff) -> Result<Option<Event>> {
        self.ledger.refresh(&self.store);
        let outstanding = self.outstanding_cents();
        match donate_now(&self.config.shelter, outstanding, handoff)? {
            DonationOutcome::Declined => Ok(None),
            DonationOutcome::Confirmed { cents } => {
                self.ledger.refresh(&self.store);
                let total = self.ledger.record_donation(cents);
                self.ledger.save_donations(&self.store);
                tracing::info!(cents, total_donated_cents = total, "donation recorded");
                Ok(Some(Event::DonationRecorded {
                    shelter: self.config.shelter.name.clone(),
                    cents,
                    total_donated_cents: total,
                    at: Utc::now(),
                }))
            }
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Apply a terminal transition to the ledger and persist it. Starts
    /// from the stored ledger so donations recorded elsewhere during the
    /// session are kept.
    fn settle(&mut self, transition: Transition) -> Event {
        self.ledger.refresh(&self.store);
        let event = match transition {
            Transition::Completed { duration_secs } => {
                let earned = self.config.treats_per_success;
                let entry = self.ledger.on_success(duration_secs, earned);
                let at = entry.timestamp;
                tracing::info!(duration_secs, earned, "session completed");
                Event::SessionCompleted {
                    duration_secs,
                    earned_treats: earned,
                    total_treats: self.ledger.treats(),
                    at,
                }
            }
            Transition::Failed {
                elapsed_secs,
                message,
            } => {
                let at = self.ledger.on_failure(elapsed_secs).timestamp;
                tracing::info!(elapsed_secs, %message, "session failed");
                Event::SessionFailed {
                    elapsed_secs,
                    message,
                    at,
                }
            }
        };
        self.ledger.save_sessions(&self.store);
        event
    }
}
