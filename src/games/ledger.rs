//! Per-player wager history
//!
//! Append-only. Records are kept in settlement order per player and are
//! never edited or removed.

use crate::games::types::{AccountId, GameRecord};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct WagerLedger {
    histories: HashMap<AccountId, Vec<GameRecord>>,
    record_count: usize,
}

impl WagerLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: GameRecord) {
        self.histories
            .entry(record.player.clone())
            .or_default()
            .push(record);
        self.record_count += 1;
    }

    /// Full history in settlement order; empty for unknown players
    pub fn history_of(&self, player: &AccountId) -> Vec<GameRecord> {
        self.histories.get(player).cloned().unwrap_or_default()
    }

    /// A window of the history, starting at `offset`
    pub fn history_page(&self, player: &AccountId, offset: usize, limit: usize) -> Vec<GameRecord> {
        self.histories
            .get(player)
            .map(|records| records.iter().skip(offset).take(limit).cloned().collect())
            .unwrap_or_default()
    }

    pub fn history_len(&self, player: &AccountId) -> usize {
        self.histories.get(player).map_or(0, Vec::len)
    }

    pub fn player_count(&self) -> usize {
        self.histories.len()
    }

    pub fn record_count(&self) -> usize {
        self.record_count
    }
}
