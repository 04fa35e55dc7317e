//! End-to-end settlement behaviour of `Casino`

use dice_casino::games::randomness::{OsDiceSource, ScriptedDiceSource};
use dice_casino::{AccountId, Amount, Casino, CasinoEvent, DieFace, GameError, GameOutcome, GameParameters};
use proptest::prelude::*;
use std::sync::Arc;

fn amount(s: &str) -> Amount {
    s.parse().unwrap()
}

fn owner() -> AccountId {
    AccountId::new("owner")
}

/// Casino with standard parameters whose die always shows `face`
fn rigged_casino(face: u8, funding: Amount) -> Casino {
    let source = ScriptedDiceSource::repeating(DieFace::new(face).unwrap());
    let casino = Casino::new(owner(), GameParameters::standard(), Arc::new(source)).unwrap();
    if !funding.is_zero() {
        casino.fund(&owner(), funding).unwrap();
    }
    casino
}

#[test]
fn winning_bet_pays_six_times_less_house_edge() {
    let casino = rigged_casino(3, amount("10"));
    let player = AccountId::new("player1");

    let record = casino.place_bet(&player, 3, amount("0.05")).unwrap();

    assert_eq!(record.chosen_number.value(), 3);
    assert_eq!(record.rolled_number.value(), 3);
    assert_eq!(record.payout, amount("0.285"));
    assert_eq!(record.outcome, GameOutcome::Win);
    // 10 + 0.05 - 0.285
    assert_eq!(casino.balance_of(), amount("9.765"));
    assert_eq!(casino.history_of(&player), vec![record]);
}

#[test]
fn losing_bet_keeps_the_stake() {
    let casino = rigged_casino(4, amount("10"));
    let player = AccountId::new("player1");

    let record = casino.place_bet(&player, 3, amount("0.05")).unwrap();

    assert_eq!(record.rolled_number.value(), 4);
    assert_eq!(record.payout, Amount::ZERO);
    assert_eq!(record.outcome, GameOutcome::Loss);
    assert_eq!(casino.balance_of(), amount("10.05"));
    assert_eq!(casino.history_of(&player).len(), 1);
}

#[test]
fn history_is_kept_in_submission_order() {
    let casino = rigged_casino(1, amount("10"));
    let player = AccountId::new("player1");

    let stakes = ["0.01", "0.02", "0.03"];
    for (i, stake) in stakes.iter().enumerate() {
        casino.place_bet(&player, (i + 1) as u8, amount(stake)).unwrap();
    }

    let history = casino.history_of(&player);
    let recorded: Vec<Amount> = history.iter().map(|r| r.bet_amount).collect();
    assert_eq!(recorded, stakes.iter().map(|s| amount(s)).collect::<Vec<_>>());
    let chosen: Vec<u8> = history.iter().map(|r| r.chosen_number.value()).collect();
    assert_eq!(chosen, vec![1, 2, 3]);
    assert!(history.windows(2).all(|w| w[0].game_id < w[1].game_id));

    assert!(casino.history_of(&AccountId::new("stranger")).is_empty());
    assert_eq!(casino.history_page(&player, 1, 1), vec![history[1].clone()]);
}

#[test]
fn shortfall_boundary_is_exact() {
    // Winning payout on a stake of 1 is 5.7, so balance + stake must reach 5.7
    let exact = amount("4.7");
    let casino = rigged_casino(6, exact);
    let record = casino.place_bet(&AccountId::new("p"), 6, amount("1")).unwrap();
    assert_eq!(record.payout, amount("5.7"));
    assert_eq!(casino.balance_of(), Amount::ZERO);

    let short = Amount::from_planck(exact.planck() - 1);
    for roll in [6, 2] {
        let casino = rigged_casino(roll, short);
        let err = casino.place_bet(&AccountId::new("p"), 6, amount("1")).unwrap_err();
        assert_eq!(
            err,
            GameError::InsufficientTreasury {
                required: amount("5.7"),
                available: Amount::from_planck(amount("5.7").planck() - 1),
            }
        );
        assert_eq!(casino.balance_of(), short);
        assert!(casino.history_of(&AccountId::new("p")).is_empty());
    }
}

#[test]
fn empty_treasury_rejects_every_bet() {
    let casino = rigged_casino(2, Amount::ZERO);
    let err = casino.place_bet(&AccountId::new("p"), 1, amount("0.05")).unwrap_err();
    assert!(matches!(err, GameError::InsufficientTreasury { .. }));
    assert_eq!(casino.balance_of(), Amount::ZERO);
    assert_eq!(casino.stats().bet_count, 0);
}

#[test]
fn invalid_numbers_are_rejected_without_side_effects() {
    let casino = rigged_casino(1, amount("10"));
    let player = AccountId::new("p");
    for n in [0u8, 7, 42, 255] {
        assert_eq!(
            casino.place_bet(&player, n, amount("0.05")),
            Err(GameError::InvalidNumber(n.into()))
        );
    }
    assert_eq!(casino.balance_of(), amount("10"));
    assert!(casino.history_of(&player).is_empty());
}

#[test]
fn parameter_updates_are_operator_only() {
    let casino = rigged_casino(1, amount("10"));
    let updated = GameParameters {
        min_bet: amount("0.02"),
        max_bet: amount("2"),
        house_edge_bps: 600,
    };

    for caller in ["player", "Owner", "owner2"] {
        assert!(matches!(
            casino.update_parameters(&AccountId::new(caller), updated),
            Err(GameError::Unauthorized { .. })
        ));
    }
    assert_eq!(casino.parameters(), GameParameters::standard());

    casino.update_parameters(&owner(), updated).unwrap();
    assert_eq!(casino.parameters(), updated);

    // New bounds apply to the next bet
    assert!(matches!(
        casino.place_bet(&AccountId::new("p"), 1, amount("0.01")),
        Err(GameError::BetTooLow { .. })
    ));
    let record = casino.place_bet(&AccountId::new("p"), 1, amount("1")).unwrap();
    // 1 * 6 * 9400 / 10000
    assert_eq!(record.payout, amount("5.64"));
}

#[test]
fn withdraw_moves_exact_amounts() {
    let casino = rigged_casino(1, amount("10"));

    assert!(matches!(
        casino.withdraw(&AccountId::new("player"), amount("1")),
        Err(GameError::Unauthorized { .. })
    ));
    assert!(matches!(
        casino.withdraw(&owner(), amount("10.000000000001")),
        Err(GameError::InsufficientFunds { .. })
    ));
    assert_eq!(casino.balance_of(), amount("10"));

    casino.withdraw(&owner(), amount("2.5")).unwrap();
    assert_eq!(casino.balance_of(), amount("7.5"));
    casino.withdraw(&owner(), amount("7.5")).unwrap();
    assert_eq!(casino.balance_of(), Amount::ZERO);

    let totals = casino.treasury_totals();
    assert_eq!(totals.total_funded, amount("10"));
    assert_eq!(totals.total_withdrawn, amount("10"));
}

#[test]
fn anyone_can_fund_the_treasury() {
    let casino = rigged_casino(1, Amount::ZERO);
    let mut events = casino.subscribe();

    casino.fund(&AccountId::new("benefactor"), amount("3")).unwrap();

    assert_eq!(casino.balance_of(), amount("3"));
    match events.try_recv().unwrap() {
        CasinoEvent::TreasuryFunded { from, amount: funded, balance } => {
            assert_eq!(from.as_str(), "benefactor");
            assert_eq!(funded, amount("3"));
            assert_eq!(balance, amount("3"));
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn settlement_events_carry_the_game_id() {
    let casino = rigged_casino(5, amount("10"));
    let mut events = casino.subscribe();
    let player = AccountId::new("p");

    let record = casino.place_bet(&player, 5, amount("0.1")).unwrap();

    assert_eq!(
        events.try_recv().unwrap(),
        CasinoEvent::BetPlaced {
            game_id: record.game_id,
            player: player.clone(),
            amount: amount("0.1"),
            chosen_number: DieFace::new(5).unwrap(),
        }
    );
    assert_eq!(
        events.try_recv().unwrap(),
        CasinoEvent::DiceRolled {
            game_id: record.game_id,
            player: player.clone(),
            rolled_number: DieFace::new(5).unwrap(),
        }
    );
    assert_eq!(
        events.try_recv().unwrap(),
        CasinoEvent::PayoutSent {
            game_id: record.game_id,
            player,
            amount: amount("0.57"),
        }
    );
    assert!(events.try_recv().is_err());
}

#[test]
fn concurrent_bets_conserve_the_treasury() {
    let initial = amount("1000");
    let casino = Casino::new(owner(), GameParameters::standard(), Arc::new(OsDiceSource)).unwrap();
    casino.fund(&owner(), initial).unwrap();

    let threads = 8;
    let bets_per_thread = 50;
    let results: Vec<(AccountId, Vec<dice_casino::GameRecord>)> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let casino = &casino;
                scope.spawn(move || {
                    let player = AccountId::new(format!("player-{t}"));
                    let records: Vec<_> = (0..bets_per_thread)
                        .map(|i| {
                            let number = (i % 6 + 1) as u8;
                            casino.place_bet(&player, number, amount("0.05")).unwrap()
                        })
                        .collect();
                    (player, records)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let mut staked = 0u128;
    let mut paid = 0u128;
    for (player, records) in &results {
        staked += records.iter().map(|r| r.bet_amount.planck()).sum::<u128>();
        paid += records.iter().map(|r| r.payout.planck()).sum::<u128>();
        assert_eq!(&casino.history_of(player), records);
    }
    assert_eq!(
        casino.balance_of().planck(),
        initial.planck() + staked - paid
    );

    let stats = casino.stats();
    assert_eq!(stats.bet_count, (threads * bets_per_thread) as u64);
    assert_eq!(stats.player_count, threads);

    let mut ids: Vec<u64> = results.iter().flat_map(|(_, r)| r.iter().map(|r| r.game_id)).collect();
    ids.sort_unstable();
    assert_eq!(ids, (1..=(threads * bets_per_thread) as u64).collect::<Vec<_>>());
}

proptest! {
    #[test]
    fn any_stake_in_bounds_settles_correctly(
        stake_planck in 10_000_000_000u128..=1_000_000_000_000u128,
        chosen in 1u8..=6,
        rolled in 1u8..=6,
    ) {
        let casino = rigged_casino(rolled, amount("10"));
        let stake = Amount::from_planck(stake_planck);

        let record = casino.place_bet(&AccountId::new("p"), chosen, stake).unwrap();

        prop_assert_eq!(record.chosen_number.value(), chosen);
        prop_assert_eq!(record.rolled_number.value(), rolled);
        let expected = if chosen == rolled { stake_planck * 6 * 9_500 / 10_000 } else { 0 };
        prop_assert_eq!(record.payout.planck(), expected);
        prop_assert_eq!(
            casino.balance_of().planck(),
            amount("10").planck() + stake_planck - expected
        );
    }

    #[test]
    fn out_of_bound_stakes_change_nothing(
        stake_planck in prop_oneof![
            0u128..10_000_000_000u128,
            1_000_000_000_001u128..100_000_000_000_000u128,
        ],
        chosen in 1u8..=6,
    ) {
        let casino = rigged_casino(chosen, amount("10"));
        let result = casino.place_bet(&AccountId::new("p"), chosen, Amount::from_planck(stake_planck));

        let bound_error = matches!(result, Err(GameError::BetTooLow { .. }) | Err(GameError::BetTooHigh { .. }));
        prop_assert!(bound_error);
        prop_assert_eq!(casino.balance_of(), amount("10"));
        prop_assert!(casino.history_of(&AccountId::new("p")).is_empty());
    }

    #[test]
    fn operator_withdrawals_are_exact(withdraw_planck in 0u128..=20_000_000_000_000u128) {
        let casino = rigged_casino(1, amount("10"));
        let before = casino.balance_of();
        let result = casino.withdraw(&owner(), Amount::from_planck(withdraw_planck));

        if withdraw_planck <= before.planck() {
            prop_assert!(result.is_ok());
            prop_assert_eq!(casino.balance_of().planck(), before.planck() - withdraw_planck);
        } else {
            let insufficient = matches!(result, Err(GameError::InsufficientFunds { .. }));
            prop_assert!(insufficient);
            prop_assert_eq!(casino.balance_of(), before);
        }
    }
}
