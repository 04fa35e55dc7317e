//! Dice Casino - Provably Fair Dice Settlement Engine
//!
//! A player picks a number from 1 to 6 and stakes an amount. The casino draws
//! a roll, pays `stake * 6` minus the house edge on a match, and records the
//! wager in the player's history. The operator's treasury never goes negative
//! and never accepts a bet whose winning payout it could not cover.
//!
//! ```no_run
//! use dice_casino::{AccountId, Amount, Casino, GameParameters, VRFGameEngine};
//! use std::sync::Arc;
//!
//! let operator = AccountId::new("operator");
//! let casino = Casino::new(operator.clone(), GameParameters::standard(), Arc::new(VRFGameEngine::new_random()))?;
//! casino.fund(&operator, Amount::from_units(10))?;
//!
//! let record = casino.place_bet(&AccountId::new("player"), 3, "0.05".parse::<Amount>()?)?;
//! println!("rolled {} and won {}", record.rolled_number, record.payout);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod api;
pub mod config;
pub mod errors;
pub mod games;

pub use config::{CasinoConfig, ConfigBuilder, ConfigLoader};
pub use errors::{CasinoError, CasinoResult, ConfigurationError, GameError, GameResult};
pub use games::{
    AccountId, Amount, Casino, CasinoEvent, CasinoStats, DieFace, GameOutcome, GameParameters,
    GameRecord, RandomnessSource, TreasuryTotals, VRFBundle, VRFGameEngine,
};
