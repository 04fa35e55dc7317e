//! Game parameter store and payout arithmetic

use crate::errors::{GameError, GameResult};
use crate::games::types::{Amount, DieFace, GameParameters};

/// Basis points in 100%
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Gross multiplier on a matching roll, before the house edge
pub const PAYOUT_MULTIPLIER: u128 = DieFace::SIDES as u128;

impl GameParameters {
    /// min 0.01, max 1, edge 5%
    pub const fn standard() -> Self {
        Self {
            min_bet: Amount::from_planck(10_000_000_000),
            max_bet: Amount::from_units(1),
            house_edge_bps: 500,
        }
    }

    /// Check every invariant the store maintains
    pub fn validate(&self) -> GameResult<()> {
        if self.min_bet.is_zero() || self.max_bet.is_zero() {
            return Err(GameError::InvalidParameters(
                "bet limits must be greater than zero".to_string(),
            ));
        }
        if self.min_bet > self.max_bet {
            return Err(GameError::InvalidParameters(format!(
                "min bet {} exceeds max bet {}",
                self.min_bet, self.max_bet
            )));
        }
        if u128::from(self.house_edge_bps) > BPS_DENOMINATOR {
            return Err(GameError::InvalidParameters(format!(
                "house edge {} bps exceeds 10000",
                self.house_edge_bps
            )));
        }
        if self
            .max_bet
            .planck()
            .checked_mul(PAYOUT_MULTIPLIER * BPS_DENOMINATOR)
            .is_none()
        {
            return Err(GameError::InvalidParameters(format!(
                "max bet {} overflows payout arithmetic",
                self.max_bet
            )));
        }
        Ok(())
    }

    /// Checks `min_bet <= stake <= max_bet`
    pub fn check_stake(&self, stake: Amount) -> GameResult<()> {
        if stake < self.min_bet {
            return Err(GameError::BetTooLow {
                stake,
                min_bet: self.min_bet,
            });
        }
        if stake > self.max_bet {
            return Err(GameError::BetTooHigh {
                stake,
                max_bet: self.max_bet,
            });
        }
        Ok(())
    }

    /// Payout for a matching roll: `stake * 6 * (10000 - edge) / 10000`, truncated
    pub fn winning_payout(&self, stake: Amount) -> GameResult<Amount> {
        let keep = BPS_DENOMINATOR
            .checked_sub(u128::from(self.house_edge_bps))
            .ok_or(GameError::AmountOverflow)?;
        stake
            .planck()
            .checked_mul(PAYOUT_MULTIPLIER)
            .and_then(|gross| gross.checked_mul(keep))
            .map(|scaled| Amount::from_planck(scaled / BPS_DENOMINATOR))
            .ok_or(GameError::AmountOverflow)
    }
}

impl Default for GameParameters {
    fn default() -> Self {
        Self::standard()
    }
}

/// Holds the current parameter triple; replaced whole or not at all
#[derive(Debug, Clone)]
pub struct ParameterStore {
    current: GameParameters,
}

impl ParameterStore {
    pub fn new(initial: GameParameters) -> GameResult<Self> {
        initial.validate()?;
        Ok(Self { current: initial })
    }

    pub fn get(&self) -> GameParameters {
        self.current
    }

    /// Validate, then replace. Callers gate this behind the operator check.
    pub fn update(&mut self, new: GameParameters) -> GameResult<()> {
        new.validate()?;
        self.current = new;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount(s: &str) -> Amount {
        s.parse().unwrap()
    }

    fn params(min: &str, max: &str, edge: u16) -> GameParameters {
        GameParameters {
            min_bet: amount(min),
            max_bet: amount(max),
            house_edge_bps: edge,
        }
    }

    #[test]
    fn test_standard_parameters() {
        let p = GameParameters::standard();
        assert_eq!(p, params("0.01", "1", 500));
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_winning_payout() {
        let p = GameParameters::standard();
        assert_eq!(p.winning_payout(amount("0.05")).unwrap(), amount("0.285"));
        assert_eq!(p.winning_payout(amount("1")).unwrap(), amount("5.7"));

        assert_eq!(params("0.01", "1", 0).winning_payout(amount("0.05")).unwrap(), amount("0.3"));
        assert_eq!(params("0.01", "1", 10_000).winning_payout(amount("0.05")).unwrap(), Amount::ZERO);
    }

    #[test]
    fn test_winning_payout_truncates() {
        // 7 * 6 * 9500 / 10000 = 39.9
        let p = params("0.000000000001", "1", 500);
        assert_eq!(p.winning_payout(Amount::from_planck(7)).unwrap(), Amount::from_planck(39));
    }

    #[test]
    fn test_stake_bounds() {
        let p = GameParameters::standard();
        assert!(p.check_stake(amount("0.01")).is_ok());
        assert!(p.check_stake(amount("1")).is_ok());
        assert!(matches!(p.check_stake(amount("0.009")), Err(GameError::BetTooLow { .. })));
        assert!(matches!(p.check_stake(amount("1.000000000001")), Err(GameError::BetTooHigh { .. })));
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let cases = [
            params("2", "1", 500),
            params("0.01", "1", 10_001),
            params("0", "1", 500),
            GameParameters {
                min_bet: Amount::from_planck(1),
                max_bet: Amount::from_planck(u128::MAX / 1_000),
                house_edge_bps: 500,
            },
        ];
        for p in cases {
            assert!(matches!(p.validate(), Err(GameError::InvalidParameters(_))), "{p:?}");
        }
        assert!(params("1", "1", 10_000).validate().is_ok());
    }

    #[test]
    fn test_store_update_is_all_or_nothing() {
        let mut store = ParameterStore::new(GameParameters::standard()).unwrap();
        assert!(store.update(params("3", "2", 600)).is_err());
        assert_eq!(store.get(), GameParameters::standard());

        store.update(params("0.02", "2", 600)).unwrap();
        assert_eq!(store.get(), params("0.02", "2", 600));
    }
}
