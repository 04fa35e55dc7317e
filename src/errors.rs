//! Error types for the dice casino
//!
//! `GameError` covers every rejection the settlement engine can produce.
//! `ConfigurationError` covers loading and validating `CasinoConfig`.
//! `CasinoError` is the root type returned by process-level entry points.

use crate::games::types::{AccountId, Amount};

/// Root error type for casino operations
#[derive(Debug, thiserror::Error)]
pub enum CasinoError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Wager and treasury errors
    #[error("Game error: {0}")]
    Game(#[from] GameError),

    /// Socket and file errors outside configuration loading
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration and validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Missing required field: {0}")]
    MissingRequired(String),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),
}

/// Settlement, treasury and administration errors.
///
/// Every variant is raised before any state is touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("Number must be between 1 and 6, got {0}")]
    InvalidNumber(i64),

    #[error("Bet amount too low: {stake} is below the minimum of {min_bet}")]
    BetTooLow { stake: Amount, min_bet: Amount },

    #[error("Bet amount too high: {stake} is above the maximum of {max_bet}")]
    BetTooHigh { stake: Amount, max_bet: Amount },

    #[error("Invalid game parameters: {0}")]
    InvalidParameters(String),

    #[error("Only the operator can call this function (caller: {caller})")]
    Unauthorized { caller: AccountId },

    #[error("Insufficient funds: requested {requested}, treasury holds {available}")]
    InsufficientFunds { requested: Amount, available: Amount },

    #[error("Treasury cannot cover a winning payout of {required} (would hold {available})")]
    InsufficientTreasury { required: Amount, available: Amount },

    #[error("Amount arithmetic overflow")]
    AmountOverflow,
}

impl GameError {
    /// Stable machine-readable code, shared by logs and the HTTP API
    pub fn code(&self) -> &'static str {
        match self {
            GameError::InvalidNumber(_) => "INVALID_NUMBER",
            GameError::BetTooLow { .. } => "BET_TOO_LOW",
            GameError::BetTooHigh { .. } => "BET_TOO_HIGH",
            GameError::InvalidParameters(_) => "INVALID_PARAMETERS",
            GameError::Unauthorized { .. } => "UNAUTHORIZED",
            GameError::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            GameError::InsufficientTreasury { .. } => "INSUFFICIENT_TREASURY",
            GameError::AmountOverflow => "AMOUNT_OVERFLOW",
        }
    }
}

// Convenience type aliases for Results
pub type CasinoResult<T> = Result<T, CasinoError>;
pub type GameResult<T> = Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_error_display() {
        let config_error = ConfigurationError::ValidationFailed("test".to_string());
        let casino_error = CasinoError::Configuration(config_error);

        assert!(casino_error.to_string().contains("Configuration error"));
        assert!(casino_error.to_string().contains("test"));
    }

    #[test]
    fn test_bet_error_details() {
        let error = GameError::BetTooLow {
            stake: Amount::from_planck(5_000_000_000),
            min_bet: Amount::from_planck(10_000_000_000),
        };

        assert!(error.to_string().contains("0.005"));
        assert!(error.to_string().contains("0.01"));
        assert_eq!(error.code(), "BET_TOO_LOW");
    }

    #[test]
    fn test_error_conversion() {
        let casino_error: CasinoError = GameError::InvalidNumber(7).into();

        match casino_error {
            CasinoError::Game(GameError::InvalidNumber(7)) => {}
            _ => panic!("Expected game error"),
        }
    }

    #[test]
    fn test_error_source() {
        let casino_error = CasinoError::Game(GameError::AmountOverflow);
        assert!(casino_error.source().is_some());
    }
}
