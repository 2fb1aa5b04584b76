//! Reward ledger: treats, donations and the session history.
//!
//! Only `treats`, `donated_cents` and `history` are stored. The pledge and
//! the outstanding balance are derived from the current rate on every read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::storage::{keys, KvStore, KvStoreExt};

/// One finished session. Never edited after it is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    /// Planned length on success, seconds focused on failure.
    pub duration_secs: u64,
    pub success: bool,
    /// Present iff `success`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub earned_treats: Option<u64>,
}

/// Totals for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub treats: u64,
    pub pledged_cents: u64,
    pub donated_cents: u64,
    pub outstanding_cents: u64,
    pub successes: u64,
    pub failures: u64,
    /// Sum of `duration_secs` across the whole history.
    pub focused_secs: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewardLedger {
    treats: u64,
    donated_cents: u64,
    /// Newest first.
    history: VecDeque<HistoryEntry>,
}

impl RewardLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from stored parts.
    pub fn from_parts(treats: u64, donated_cents: u64, history: VecDeque<HistoryEntry>) -> Self {
        Self {
            treats,
            donated_cents,
            history,
        }
    }

    pub fn load(store: &impl KvStore) -> Self {
        Self {
            treats: store.load(keys::TREATS, 0),
            donated_cents: store.load(keys::DONATED_CENTS, 0),
            history: store.load(keys::HISTORY, VecDeque::new()),
        }
    }

    pub fn save(&self, store: &impl KvStore) {
        self.save_sessions(store);
        self.save_donations(store);
    }

    /// Re-read every stored part. Another process may have settled a
    /// session or recorded a donation since this ledger was loaded.
    pub fn refresh(&mut self, store: &impl KvStore) {
        *self = Self::load(store);
    }

    /// Persist what `on_success`/`on_failure` change, leaving the stored
    /// donation total alone.
    pub fn save_sessions(&self, store: &impl KvStore) {
        store.save(keys::TREATS, &self.treats);
        store.save(keys::HISTORY, &self.history);
    }

    /// Persist what `record_donation` changes.
    pub fn save_donations(&self, store: &impl KvStore) {
        store.save(keys::DONATED_CENTS, &self.donated_cents);
    }

    pub fn treats(&self) -> u64 {
        self.treats
    }

    pub fn donated_cents(&self) -> u64 {
        self.donated_cents
    }

    pub fn history(&self) -> &VecDeque<HistoryEntry> {
        &self.history
    }

    /// The newest `limit` entries, newest first.
    pub fn recent(&self, limit: usize) -> impl Iterator<Item = &HistoryEntry> {
        self.history.iter().take(limit)
    }

    pub fn pledged_cents(&self, pledge_rate_cents: u64) -> u64 {
        self.treats.saturating_mul(pledge_rate_cents)
    }

    pub fn outstanding_cents(&self, pledge_rate_cents: u64) -> u64 {
        self.pledged_cents(pledge_rate_cents)
            .saturating_sub(self.donated_cents)
    }

    pub fn on_success(&mut self, duration_secs: u64, treats_per_success: u64) -> &HistoryEntry {
        self.on_success_at(duration_secs, treats_per_success, Utc::now())
    }

    pub fn on_success_at(
        &mut self,
        duration_secs: u64,
        treats_per_success: u64,
        at: DateTime<Utc>,
    ) -> &HistoryEntry {
        self.treats = self.treats.saturating_add(treats_per_success);
        self.push(HistoryEntry {
            timestamp: at,
            duration_secs,
            success: true,
            earned_treats: Some(treats_per_success),
        })
    }

    pub fn on_failure(&mut self, elapsed_secs: u64) -> &HistoryEntry {
        self.on_failure_at(elapsed_secs, Utc::now())
    }

    pub fn on_failure_at(&mut self, elapsed_secs: u64, at: DateTime<Utc>) -> &HistoryEntry {
        self.push(HistoryEntry {
            timestamp: at,
            duration_secs: elapsed_secs,
            success: false,
            earned_treats: None,
        })
    }

    /// Add a confirmed donation. Returns the new donated total.
    pub fn record_donation(&mut self, cents: u64) -> u64 {
        self.donated_cents = self.donated_cents.saturating_add(cents);
        self.donated_cents
    }

    pub fn summary(&self, pledge_rate_cents: u64) -> LedgerSummary {
        let successes = self.history.iter().filter(|e| e.success).count() as u64;
        LedgerSummary {
            treats: self.treats,
            pledged_cents: self.pledged_cents(pledge_rate_cents),
            donated_cents: self.donated_cents,
            outstanding_cents: self.outstanding_cents(pledge_rate_cents),
            successes,
            failures: self.history.len() as u64 - successes,
            focused_secs: self
                .history
                .iter()
                .fold(0u64, |acc, e| acc.saturating_add(e.duration_secs)),
        }
    }

    fn push(&mut self, entry: HistoryEntry) -> &HistoryEntry {
        self.history.push_front(entry);
        &self.history[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn success_adds_treats_and_prepends() {
        let mut ledger = RewardLedger::new();
        ledger.on_success(1500, 2);
        ledger.on_success(600, 2);
        assert_eq!(ledger.treats(), 4);
        assert_eq!(ledger.history().len(), 2);
        assert_eq!(ledger.history()[0].duration_secs, 600);
        assert_eq!(ledger.history()[0].earned_treats, Some(2));
    }

    #[test]
    fn failure_keeps_treats() {
        let mut ledger = RewardLedger::new();
        ledger.on_success(60, 1);
        let entry = ledger.on_failure(12).clone();
        assert_eq!(ledger.treats(), 1);
        assert!(!entry.success);
        assert_eq!(entry.duration_secs, 12);
        assert_eq!(entry.earned_treats, None);
    }

    #[test]
    fn failure_entry_omits_earned_treats_field() {
        let mut ledger = RewardLedger::new();
        let json = serde_json::to_value(ledger.on_failure(5)).unwrap();
        assert!(json.get("earned_treats").is_none());
        assert_eq!(json["success"], false);

        let json = serde_json::to_value(ledger.on_success(60, 3)).unwrap();
        assert_eq!(json["earned_treats"], 3);
    }

    #[test]
    fn derived_values() {
        let ledger = RewardLedger::from_parts(10, 100, VecDeque::new());
        assert_eq!(ledger.pledged_cents(25), 250);
        assert_eq!(ledger.outstanding_cents(25), 150);
        assert_eq!(ledger.outstanding_cents(5), 0);
        assert_eq!(ledger.pledged_cents(0), 0);
    }

    #[test]
    fn pledge_saturates_instead_of_overflowing() {
        let ledger = RewardLedger::from_parts(u64::MAX, 0, VecDeque::new());
        assert_eq!(ledger.pledged_cents(2), u64::MAX);
    }

    #[test]
    fn summary_counts_history() {
        let mut ledger = RewardLedger::new();
        ledger.on_success(60, 1);
        ledger.on_failure(20);
        ledger.on_success(60, 1);
        ledger.record_donation(30);
        let summary = ledger.summary(25);
        assert_eq!(summary.successes, 2);
        assert_eq!(summary.failures, 1);
        assert_eq!(summary.focused_secs, 140);
        assert_eq!(summary.pledged_cents, 50);
        assert_eq!(summary.outstanding_cents, 20);
    }

    #[test]
    fn recent_is_newest_first() {
        let mut ledger = RewardLedger::new();
        for secs in [10, 20, 30] {
            ledger.on_failure(secs);
        }
        let recent: Vec<u64> = ledger.recent(2).map(|e| e.duration_secs).collect();
        assert_eq!(recent, vec![30, 20]);
    }

    #[test]
    fn save_then_load_roundtrip() {
        let store = MemoryStore::new();
        let mut ledger = RewardLedger::new();
        ledger.on_success(1500, 1);
        ledger.on_failure(42);
        ledger.record_donation(25);
        ledger.save(&store);
        assert_eq!(RewardLedger::load(&store), ledger);
    }

    #[test]
    fn partial_saves_keep_the_other_keys() {
        let store = MemoryStore::new();
        let mut stale = RewardLedger::new();

        let mut donor = RewardLedger::load(&store);
        donor.record_donation(40);
        donor.save_donations(&store);

        stale.on_success(60, 2);
        stale.save_sessions(&store);

        let mut merged = RewardLedger::new();
        merged.refresh(&store);
        assert_eq!(merged.treats(), 2);
        assert_eq!(merged.donated_cents(), 40);
        assert_eq!(merged.history().len(), 1);
    }

    #[test]
    fn corrupted_history_falls_back_to_empty() {
        let store = MemoryStore::new();
        store.save(keys::TREATS, &4u64);
        store.kv_set(keys::HISTORY, "[{\"oops\": true}]").unwrap();
        let ledger = RewardLedger::load(&store);
        assert_eq!(ledger.treats(), 4);
        assert!(ledger.history().is_empty());
    }
}
