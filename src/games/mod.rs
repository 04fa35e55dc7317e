pub mod access;
pub mod events;
pub mod ledger;
pub mod parameters;
pub mod randomness;
pub mod settlement;
pub mod treasury;
pub mod types;
pub mod vrf_engine;

pub use access::AccessControl;
pub use events::{CasinoEvent, EventBus};
pub use ledger::WagerLedger;
pub use parameters::ParameterStore;
pub use randomness::{build_randomness, Draw, DrawRequest, OsDiceSource, RandomnessSource, ScriptedDiceSource};
pub use settlement::Casino;
pub use treasury::{Treasury, TreasuryTotals};
pub use types::*;
pub use vrf_engine::VRFGameEngine;
