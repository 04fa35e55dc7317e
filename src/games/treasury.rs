//! Custodial treasury
//!
//! The balance only moves through `deposit`, `try_pay` and `withdraw`, and
//! can never go below zero. `settle` combines a stake deposit and a payout
//! after checking both can succeed. Lifetime totals are kept for auditing and only
//! ever grow.

use crate::errors::{GameError, GameResult};
use crate::games::types::Amount;
use serde::{Deserialize, Serialize};

/// Lifetime audit counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasuryTotals {
    pub balance: Amount,
    pub total_staked: Amount,
    pub total_funded: Amount,
    pub total_paid_out: Amount,
    pub total_withdrawn: Amount,
}

#[derive(Debug, Clone, Default)]
pub struct Treasury {
    balance: Amount,
    total_staked: Amount,
    total_funded: Amount,
    total_paid_out: Amount,
    total_withdrawn: Amount,
}

impl Treasury {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self) -> Amount {
        self.balance
    }

    pub fn totals(&self) -> TreasuryTotals {
        TreasuryTotals {
            balance: self.balance,
            total_staked: self.total_staked,
            total_funded: self.total_funded,
            total_paid_out: self.total_paid_out,
            total_withdrawn: self.total_withdrawn,
        }
    }

    /// Add funds; fails only on overflow
    pub fn deposit(&mut self, amount: Amount) -> GameResult<()> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(GameError::AmountOverflow)?;
        Ok(())
    }

    /// Deposit an accepted stake
    pub fn deposit_stake(&mut self, stake: Amount) -> GameResult<()> {
        self.deposit(stake)?;
        self.total_staked = self.total_staked.saturating_add(stake);
        Ok(())
    }

    /// Deposit a top-up from any account
    pub fn fund(&mut self, amount: Amount) -> GameResult<()> {
        self.deposit(amount)?;
        self.total_funded = self.total_funded.saturating_add(amount);
        Ok(())
    }

    /// Pay out `amount` if the balance covers it. Returns whether it paid.
    pub fn try_pay(&mut self, amount: Amount) -> bool {
        match self.balance.checked_sub(amount) {
            Some(remaining) => {
                self.balance = remaining;
                self.total_paid_out = self.total_paid_out.saturating_add(amount);
                true
            }
            None => false,
        }
    }

    /// Deposit `stake` and pay `payout` out of the result, or change nothing.
    pub fn settle(&mut self, stake: Amount, payout: Amount) -> GameResult<()> {
        let available = self
            .balance
            .checked_add(stake)
            .ok_or(GameError::AmountOverflow)?;
        if available < payout {
            return Err(GameError::InsufficientTreasury {
                required: payout,
                available,
            });
        }

        self.deposit_stake(stake)?;
        if !payout.is_zero() {
            let paid = self.try_pay(payout);
            debug_assert!(paid, "covered payout was refused");
        }
        Ok(())
    }

    /// Remove funds. The caller has already passed the operator check.
    pub fn withdraw(&mut self, amount: Amount) -> GameResult<()> {
        let remaining = self
            .balance
            .checked_sub(amount)
            .ok_or(GameError::InsufficientFunds {
                requested: amount,
                available: self.balance,
            })?;
        self.balance = remaining;
        self.total_withdrawn = self.total_withdrawn.saturating_add(amount);
        Ok(())
    }
}
