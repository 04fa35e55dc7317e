//! Settlement engine
//!
//! `Casino` owns every piece of mutable state behind a single `RwLock`.
//! Bets, withdrawals, funding and parameter updates take the write guard for
//! their whole duration, so each one is validated, applied and published as a
//! unit. Queries take the read guard and only ever see complete settlements.

use crate::config::CasinoConfig;
use crate::errors::{CasinoResult, GameError, GameResult};
use crate::games::access::AccessControl;
use crate::games::events::{CasinoEvent, EventBus};
use crate::games::ledger::WagerLedger;
use crate::games::parameters::ParameterStore;
use crate::games::randomness::{build_randomness, DrawRequest, RandomnessSource};
use crate::games::treasury::{Treasury, TreasuryTotals};
use crate::games::types::{
    AccountId, Amount, CasinoStats, DieFace, GameOutcome, GameParameters, GameRecord,
};
use chrono::Utc;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Default capacity of the event channel
pub const DEFAULT_EVENT_BUFFER: usize = 1024;

#[derive(Debug)]
struct CasinoState {
    parameters: ParameterStore,
    treasury: Treasury,
    ledger: WagerLedger,
    stats: CasinoStats,
    next_game_id: u64,
}

/// The dice casino: parameters, treasury, history and randomness in one context
pub struct Casino {
    access: AccessControl,
    state: RwLock<CasinoState>,
    randomness: Arc<dyn RandomnessSource>,
    events: EventBus,
}

impl Casino {
    /// Deploy a casino with an empty treasury
    pub fn new(
        operator: AccountId,
        parameters: GameParameters,
        randomness: Arc<dyn RandomnessSource>,
    ) -> GameResult<Self> {
        Self::with_event_buffer(operator, parameters, randomness, DEFAULT_EVENT_BUFFER)
    }

    pub fn with_event_buffer(
        operator: AccountId,
        parameters: GameParameters,
        randomness: Arc<dyn RandomnessSource>,
        event_buffer: usize,
    ) -> GameResult<Self> {
        let parameters = ParameterStore::new(parameters)?;
        info!(
            operator = %operator,
            randomness = randomness.kind(),
            "Casino deployed"
        );
        Ok(Self {
            access: AccessControl::new(operator),
            state: RwLock::new(CasinoState {
                parameters,
                treasury: Treasury::new(),
                ledger: WagerLedger::new(),
                stats: CasinoStats::default(),
                next_game_id: 1,
            }),
            randomness,
            events: EventBus::new(event_buffer),
        })
    }

    /// Build from configuration and fund the treasury with its initial balance
    pub fn from_config(config: &CasinoConfig) -> CasinoResult<Self> {
        let randomness = build_randomness(&config.randomness)?;
        let operator = AccountId::new(config.game.operator.clone());
        let casino = Self::with_event_buffer(
            operator.clone(),
            config.game.parameters(),
            randomness,
            config.api.event_buffer,
        )?;
        if !config.treasury.initial_balance.is_zero() {
            casino.fund(&operator, config.treasury.initial_balance)?;
        }
        Ok(casino)
    }

    fn read(&self) -> RwLockReadGuard<'_, CasinoState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CasinoState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Settle one wager end to end.
    ///
    /// Rejections (`InvalidNumber`, `BetTooLow`, `BetTooHigh`,
    /// `InsufficientTreasury`, `AmountOverflow`) happen before the stake is
    /// deposited and leave no trace. A bet whose winning payout the treasury
    /// could not cover is refused regardless of the roll.
    pub fn place_bet(
        &self,
        player: &AccountId,
        chosen_number: u8,
        stake: Amount,
    ) -> GameResult<GameRecord> {
        let chosen = DieFace::new(chosen_number).map_err(|e| {
            debug!(player = %player, chosen_number, "Rejected bet: invalid number");
            e
        })?;

        let mut state = self.write();
        let parameters = state.parameters.get();
        if let Err(e) = parameters.check_stake(stake) {
            debug!(player = %player, stake = %stake, code = e.code(), "Rejected bet");
            return Err(e);
        }

        let potential_payout = parameters.winning_payout(stake)?;
        let available = state
            .treasury
            .balance_of()
            .checked_add(stake)
            .ok_or(GameError::AmountOverflow)?;
        if available < potential_payout {
            debug!(
                player = %player,
                stake = %stake,
                required = %potential_payout,
                available = %available,
                "Rejected bet: treasury cannot cover a win"
            );
            return Err(GameError::InsufficientTreasury {
                required: potential_payout,
                available,
            });
        }

        let game_id = state.next_game_id;
        let draw = self.randomness.draw(&DrawRequest {
            game_id,
            player,
            chosen_number: chosen,
            stake,
        });
        let (outcome, payout) = if draw.face == chosen {
            (GameOutcome::Win, potential_payout)
        } else {
            (GameOutcome::Loss, Amount::ZERO)
        };

        // First mutation; fails only before touching the balance
        state.treasury.settle(stake, payout)?;
        state.next_game_id += 1;

        let record = GameRecord {
            game_id,
            player: player.clone(),
            bet_amount: stake,
            chosen_number: chosen,
            rolled_number: draw.face,
            payout,
            outcome,
            timestamp: Utc::now(),
            vrf: draw.vrf,
        };

        state.ledger.append(record.clone());
        state.stats.record(&record);
        state.stats.player_count = state.ledger.player_count();

        self.events.publish(CasinoEvent::BetPlaced {
            game_id,
            player: player.clone(),
            amount: stake,
            chosen_number: chosen,
        });
        self.events.publish(CasinoEvent::DiceRolled {
            game_id,
            player: player.clone(),
            rolled_number: draw.face,
        });
        if !payout.is_zero() {
            self.events.publish(CasinoEvent::PayoutSent {
                game_id,
                player: player.clone(),
                amount: payout,
            });
        }

        info!(
            game_id,
            player = %player,
            stake = %stake,
            chosen = %chosen,
            rolled = %draw.face,
            payout = %payout,
            balance = %state.treasury.balance_of(),
            "Bet settled"
        );

        Ok(record)
    }

    /// Replace the game parameters. Operator only.
    pub fn update_parameters(&self, caller: &AccountId, new: GameParameters) -> GameResult<()> {
        if let Err(e) = self.access.require_operator(caller) {
            warn!(caller = %caller, "Rejected parameter update from non-operator");
            return Err(e);
        }
        let mut state = self.write();
        state.parameters.update(new)?;

        info!(
            min_bet = %new.min_bet,
            max_bet = %new.max_bet,
            house_edge_bps = new.house_edge_bps,
            "Game parameters updated"
        );
        self.events.publish(CasinoEvent::ParametersUpdated { parameters: new });
        Ok(())
    }

    /// Move funds out of the treasury. Operator only.
    pub fn withdraw(&self, caller: &AccountId, amount: Amount) -> GameResult<()> {
        if let Err(e) = self.access.require_operator(caller) {
            warn!(caller = %caller, amount = %amount, "Rejected withdrawal from non-operator");
            return Err(e);
        }
        let mut state = self.write();
        state.treasury.withdraw(amount)?;
        let balance = state.treasury.balance_of();

        info!(amount = %amount, balance = %balance, "Treasury withdrawal");
        self.events.publish(CasinoEvent::FundsWithdrawn {
            operator: caller.clone(),
            amount,
            balance,
        });
        Ok(())
    }

    /// Top up the treasury. Open to any account.
    pub fn fund(&self, from: &AccountId, amount: Amount) -> GameResult<()> {
        let mut state = self.write();
        state.treasury.fund(amount)?;
        let balance = state.treasury.balance_of();

        info!(from = %from, amount = %amount, balance = %balance, "Treasury funded");
        self.events.publish(CasinoEvent::TreasuryFunded {
            from: from.clone(),
            amount,
            balance,
        });
        Ok(())
    }

    pub fn history_of(&self, player: &AccountId) -> Vec<GameRecord> {
        self.read().ledger.history_of(player)
    }

    pub fn history_page(&self, player: &AccountId, offset: usize, limit: usize) -> Vec<GameRecord> {
        self.read().ledger.history_page(player, offset, limit)
    }

    pub fn history_len(&self, player: &AccountId) -> usize {
        self.read().ledger.history_len(player)
    }

    pub fn balance_of(&self) -> Amount {
        self.read().treasury.balance_of()
    }

    pub fn treasury_totals(&self) -> TreasuryTotals {
        self.read().treasury.totals()
    }

    pub fn parameters(&self) -> GameParameters {
        self.read().parameters.get()
    }

    pub fn stats(&self) -> CasinoStats {
        self.read().stats.clone()
    }

    pub fn operator(&self) -> &AccountId {
        self.access.operator()
    }

    pub fn randomness_kind(&self) -> &'static str {
        self.randomness.kind()
    }

    pub fn vrf_public_key(&self) -> Option<String> {
        self.randomness.vrf_public_key()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CasinoEvent> {
        self.events.subscribe()
    }
}

impl std::fmt::Debug for Casino {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Casino")
            .field("operator", self.access.operator())
            .field("randomness", &self.randomness.kind())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::randomness::ScriptedDiceSource;
    use crate::games::vrf_engine::VRFGameEngine;

    fn amount(s: &str) -> Amount {
        s.parse().unwrap()
    }

    fn casino_rolling(face: u8) -> Casino {
        let source = ScriptedDiceSource::repeating(DieFace::new(face).unwrap());
        let casino = Casino::new(
            AccountId::new("owner"),
            GameParameters::standard(),
            Arc::new(source),
        )
        .unwrap();
        casino.fund(&AccountId::new("owner"), amount("10")).unwrap();
        casino
    }

    #[test]
    fn test_winning_bet() {
        let casino = casino_rolling(3);
        let player = AccountId::new("player1");

        let record = casino.place_bet(&player, 3, amount("0.05")).unwrap();
        assert_eq!(record.game_id, 1);
        assert_eq!(record.outcome, GameOutcome::Win);
        assert_eq!(record.payout, amount("0.285"));
        assert_eq!(casino.balance_of(), amount("9.765"));
        assert_eq!(casino.history_of(&player), vec![record]);
    }

    #[test]
    fn test_losing_bet() {
        let casino = casino_rolling(4);
        let player = AccountId::new("player1");

        let record = casino.place_bet(&player, 3, amount("0.05")).unwrap();
        assert_eq!(record.outcome, GameOutcome::Loss);
        assert_eq!(record.payout, Amount::ZERO);
        assert_eq!(record.rolled_number.value(), 4);
        assert_eq!(casino.balance_of(), amount("10.05"));
    }

    #[test]
    fn test_rejections_leave_no_trace() {
        let casino = casino_rolling(1);
        let player = AccountId::new("player1");

        assert_eq!(casino.place_bet(&player, 0, amount("0.05")), Err(GameError::InvalidNumber(0)));
        assert_eq!(casino.place_bet(&player, 7, amount("0.05")), Err(GameError::InvalidNumber(7)));
        assert!(matches!(
            casino.place_bet(&player, 1, amount("0.001")),
            Err(GameError::BetTooLow { .. })
        ));
        assert!(matches!(
            casino.place_bet(&player, 1, amount("2")),
            Err(GameError::BetTooHigh { .. })
        ));

        assert_eq!(casino.balance_of(), amount("10"));
        assert!(casino.history_of(&player).is_empty());
        assert_eq!(casino.stats().bet_count, 0);
    }

    #[test]
    fn test_refused_bet_consumes_no_game_id() {
        let source = ScriptedDiceSource::repeating(DieFace::new(3).unwrap());
        let casino = Casino::new(AccountId::new("owner"), GameParameters::standard(), Arc::new(source)).unwrap();
        let player = AccountId::new("player1");

        assert!(matches!(
            casino.place_bet(&player, 3, amount("1")),
            Err(GameError::InsufficientTreasury { .. })
        ));
        assert_eq!(casino.treasury_totals(), TreasuryTotals::default());

        casino.fund(&AccountId::new("owner"), amount("4.7")).unwrap();
        let record = casino.place_bet(&player, 3, amount("1")).unwrap();
        assert_eq!(record.game_id, 1);
        assert_eq!(record.payout, amount("5.7"));
        assert_eq!(casino.balance_of(), Amount::ZERO);
    }

    #[test]
    fn test_events_follow_settlement() {
        let casino = casino_rolling(3);
        let mut rx = casino.subscribe();
        let player = AccountId::new("player1");

        casino.place_bet(&player, 3, amount("0.05")).unwrap();
        casino.place_bet(&player, 2, amount("0.05")).unwrap();

        let mut kinds = Vec::new();
        while let Ok(event) = rx.try_recv() {
            kinds.push(serde_json::to_value(&event).unwrap()["type"].as_str().unwrap().to_string());
        }
        assert_eq!(
            kinds,
            vec!["bet_placed", "dice_rolled", "payout_sent", "bet_placed", "dice_rolled"]
        );
    }

    #[test]
    fn test_admin_operations_require_operator() {
        let casino = casino_rolling(1);
        let intruder = AccountId::new("intruder");
        let owner = AccountId::new("owner");

        assert!(matches!(
            casino.withdraw(&intruder, amount("1")),
            Err(GameError::Unauthorized { .. })
        ));
        // Operator check runs before validation
        let bogus = GameParameters {
            min_bet: amount("5"),
            max_bet: amount("1"),
            house_edge_bps: 20_000,
        };
        assert!(matches!(
            casino.update_parameters(&intruder, bogus),
            Err(GameError::Unauthorized { .. })
        ));
        assert!(matches!(
            casino.update_parameters(&owner, bogus),
            Err(GameError::InvalidParameters(_))
        ));
        assert_eq!(casino.parameters(), GameParameters::standard());

        casino.withdraw(&owner, amount("4")).unwrap();
        assert_eq!(casino.balance_of(), amount("6"));
        assert_eq!(casino.treasury_totals().total_withdrawn, amount("4"));
    }

    #[test]
    fn test_vrf_casino_records_verifiable_proofs() {
        let casino = Casino::new(
            AccountId::new("owner"),
            GameParameters::standard(),
            Arc::new(VRFGameEngine::new_random()),
        )
        .unwrap();
        casino.fund(&AccountId::new("owner"), amount("10")).unwrap();

        let record = casino.place_bet(&AccountId::new("p"), 5, amount("0.1")).unwrap();
        let bundle = record.vrf.as_ref().unwrap();
        assert_eq!(bundle.input_message, "dice:1:p:5:0.1");
        assert!(VRFGameEngine::verify_vrf_proof(bundle, &bundle.input_message).unwrap());
        assert_eq!(Some(bundle.public_key.clone()), casino.vrf_public_key());
    }
}
