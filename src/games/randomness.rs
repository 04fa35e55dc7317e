//! Randomness sources for dice rolls
//!
//! The settlement engine only sees the `RandomnessSource` trait. A source must
//! always return an in-range face; the engine never retries or discards a draw.
//!
//! Operational caveat: whoever holds the VRF key can evaluate outcomes before
//! they are published. Game ids are sequential and the VRF input is fixed by
//! the bet, so outcomes cannot be ground, but a deployment that must be safe
//! against the operator needs a commit-reveal or external VRF source here.

use crate::config::{RandomnessConfig, RandomnessMode};
use crate::errors::ConfigurationError;
use crate::games::types::{AccountId, Amount, DieFace, VRFBundle};
use crate::games::vrf_engine::VRFGameEngine;
use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Everything a source may bind a roll to
#[derive(Debug, Clone, Copy)]
pub struct DrawRequest<'a> {
    pub game_id: u64,
    pub player: &'a AccountId,
    pub chosen_number: DieFace,
    pub stake: Amount,
}

impl DrawRequest<'_> {
    /// Deterministic VRF input for this bet
    pub fn input_message(&self) -> String {
        format!(
            "dice:{}:{}:{}:{}",
            self.game_id, self.player, self.chosen_number, self.stake
        )
    }
}

/// A single draw and its proof, if the source can produce one
#[derive(Debug, Clone)]
pub struct Draw {
    pub face: DieFace,
    pub vrf: Option<VRFBundle>,
}

/// Produces one die face per settlement
pub trait RandomnessSource: Send + Sync {
    fn draw(&self, request: &DrawRequest<'_>) -> Draw;

    /// Short name for logs and status output
    fn kind(&self) -> &'static str;

    /// Hex public key when draws are publicly verifiable
    fn vrf_public_key(&self) -> Option<String> {
        None
    }
}

impl RandomnessSource for VRFGameEngine {
    fn draw(&self, request: &DrawRequest<'_>) -> Draw {
        let (face, bundle) = self.generate_roll(request.input_message());
        Draw {
            face,
            vrf: Some(bundle),
        }
    }

    fn kind(&self) -> &'static str {
        "vrf"
    }

    fn vrf_public_key(&self) -> Option<String> {
        Some(self.public_key_hex())
    }
}

/// Operating-system entropy, uniform over 1..=6
#[derive(Debug, Default, Clone, Copy)]
pub struct OsDiceSource;

impl RandomnessSource for OsDiceSource {
    fn draw(&self, _request: &DrawRequest<'_>) -> Draw {
        let entropy: u64 = rand::rngs::OsRng.gen();
        Draw {
            face: DieFace::from_entropy(entropy),
            vrf: None,
        }
    }

    fn kind(&self) -> &'static str {
        "os"
    }
}

/// Replays a fixed sequence of faces, wrapping around at the end
#[derive(Debug)]
pub struct ScriptedDiceSource {
    rolls: Vec<DieFace>,
    cursor: AtomicUsize,
}

impl ScriptedDiceSource {
    pub fn new(rolls: Vec<DieFace>) -> Result<Self, ConfigurationError> {
        if rolls.is_empty() {
            return Err(ConfigurationError::MissingRequired(
                "randomness.scripted_rolls".to_string(),
            ));
        }
        Ok(Self {
            rolls,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Always rolls `face`
    pub fn repeating(face: DieFace) -> Self {
        Self {
            rolls: vec![face],
            cursor: AtomicUsize::new(0),
        }
    }

    /// Parse raw numbers, rejecting anything outside 1..=6
    pub fn from_numbers(numbers: &[u8]) -> Result<Self, ConfigurationError> {
        let rolls = numbers
            .iter()
            .map(|&n| {
                DieFace::new(n).map_err(|e| ConfigurationError::InvalidValue {
                    field: "randomness.scripted_rolls".to_string(),
                    value: n.to_string(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(rolls)
    }
}

impl RandomnessSource for ScriptedDiceSource {
    fn draw(&self, _request: &DrawRequest<'_>) -> Draw {
        let index = self.cursor.fetch_add(1, Ordering::SeqCst) % self.rolls.len();
        Draw {
            face: self.rolls[index],
            vrf: None,
        }
    }

    fn kind(&self) -> &'static str {
        "scripted"
    }
}

/// Build the source selected in configuration
pub fn build_randomness(
    config: &RandomnessConfig,
) -> Result<Arc<dyn RandomnessSource>, ConfigurationError> {
    let source: Arc<dyn RandomnessSource> = match config.mode {
        RandomnessMode::Vrf => match config.vrf_seed.as_deref() {
            Some(seed) => Arc::new(VRFGameEngine::from_seed_hex(seed)?),
            None => {
                tracing::warn!("No VRF seed configured; generating an ephemeral VRF key");
                Arc::new(VRFGameEngine::new_random())
            }
        },
        RandomnessMode::Os => Arc::new(OsDiceSource),
        RandomnessMode::Scripted => Arc::new(ScriptedDiceSource::from_numbers(&config.scripted_rolls)?),
    };
    Ok(source)
}
