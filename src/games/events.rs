//! Settlement and administration notifications
//!
//! Fan-out over a tokio broadcast channel. Publishing never blocks and never
//! fails a settlement: with no subscribers the event is dropped, and slow
//! subscribers see `RecvError::Lagged`.

use crate::games::types::{AccountId, Amount, DieFace, GameParameters};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CasinoEvent {
    BetPlaced {
        game_id: u64,
        player: AccountId,
        amount: Amount,
        chosen_number: DieFace,
    },
    DiceRolled {
        game_id: u64,
        player: AccountId,
        rolled_number: DieFace,
    },
    PayoutSent {
        game_id: u64,
        player: AccountId,
        amount: Amount,
    },
    TreasuryFunded {
        from: AccountId,
        amount: Amount,
        balance: Amount,
    },
    FundsWithdrawn {
        operator: AccountId,
        amount: Amount,
        balance: Amount,
    },
    ParametersUpdated {
        parameters: GameParameters,
    },
}

impl CasinoEvent {
    /// Player the event concerns, for per-player subscriptions
    pub fn player(&self) -> Option<&AccountId> {
        match self {
            CasinoEvent::BetPlaced { player, .. }
            | CasinoEvent::DiceRolled { player, .. }
            | CasinoEvent::PayoutSent { player, .. } => Some(player),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<CasinoEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn publish(&self, event: CasinoEvent) {
        // Err only means nobody is listening
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CasinoEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
