//! # PawFocus Core Library
//!
//! Focus sessions that earn treats, and treats that turn into a pledge to an
//! animal shelter. All logic lives here; the `pawfocus` CLI is a thin layer
//! over the same library.
//!
//! ## Architecture
//!
//! - **Session machine**: a tick-driven countdown (`Idle -> Running ->
//!   Done | Failed`) that requires the caller to deliver one `tick()` per
//!   second
//! - **Reward ledger**: treats, donated cents and an append-only history;
//!   pledge and outstanding amounts are derived on read
//! - **Donation recorder**: a user-confirmed hand-off to the shelter's page
//! - **Storage**: a string key-value store (SQLite or in-memory) with
//!   infallible typed load/save
//! - **Runtime**: a single-task event loop over user input and the clock
//!
//! ## Key Components
//!
//! - [`App`]: owns settings, session, ledger and store
//! - [`SessionMachine`]: session state machine
//! - [`RewardLedger`]: reward bookkeeping
//! - [`Database`]: on-disk key-value store

pub mod app;
pub mod donation;
pub mod error;
pub mod events;
pub mod ledger;
pub mod runtime;
pub mod session;
pub mod storage;

pub use app::App;
pub use donation::{donate_now, format_cents, BrowserHandoff, DonationHandoff, DonationOutcome};
pub use error::{ConfigError, CoreError, DonationError, StorageError};
pub use events::Event;
pub use ledger::{HistoryEntry, LedgerSummary, RewardLedger};
pub use runtime::{Input, RunOptions};
pub use session::{ClockToken, SessionMachine, SessionStatus, Transition};
pub use storage::{Database, KvStore, KvStoreExt, MemoryStore, SessionConfig, Shelter};
