//! Operator access control

use crate::errors::{GameError, GameResult};
use crate::games::types::AccountId;

/// Single privileged identity fixed at construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessControl {
    operator: AccountId,
}

impl AccessControl {
    pub fn new(operator: AccountId) -> Self {
        Self { operator }
    }

    pub fn operator(&self) -> &AccountId {
        &self.operator
    }

    pub fn is_operator(&self, caller: &AccountId) -> bool {
        *caller == self.operator
    }

    /// Fails with `Unauthorized` unless `caller` is the operator
    pub fn require_operator(&self, caller: &AccountId) -> GameResult<()> {
        if self.is_operator(caller) {
            Ok(())
        } else {
            Err(GameError::Unauthorized {
                caller: caller.clone(),
            })
        }
    }
}
