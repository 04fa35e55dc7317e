use crate::errors::GameError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Number of fractional digits of the native currency
pub const AMOUNT_DECIMALS: usize = 12;

/// Smallest units (planck) per whole currency unit
pub const PLANCK_PER_UNIT: u128 = 1_000_000_000_000;

/// Native-currency amount counted in planck.
///
/// Rendered and parsed as a decimal string ("0.05") so that JSON and TOML
/// never round-trip through floating point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(u128);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_planck(planck: u128) -> Self {
        Self(planck)
    }

    /// Whole currency units, e.g. `Amount::from_units(10)` is "10"
    pub const fn from_units(units: u64) -> Self {
        Self(units as u128 * PLANCK_PER_UNIT)
    }

    pub const fn planck(self) -> u128 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }

    pub fn saturating_add(self, other: Amount) -> Amount {
        Amount(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / PLANCK_PER_UNIT;
        let fraction = self.0 % PLANCK_PER_UNIT;
        if fraction == 0 {
            return write!(f, "{}", whole);
        }
        let digits = format!("{:0width$}", fraction, width = AMOUNT_DECIMALS);
        write!(f, "{}.{}", whole, digits.trim_end_matches('0'))
    }
}

/// Error returned when a decimal amount string cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid amount '{input}': {reason}")]
pub struct AmountParseError {
    pub input: String,
    pub reason: &'static str,
}

impl FromStr for Amount {
    type Err = AmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let fail = |reason| AmountParseError {
            input: input.to_string(),
            reason,
        };

        let (whole, fraction) = match input.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (input, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(fail("no digits"));
        }
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(whole) || !all_digits(fraction) {
            return Err(fail("only digits and a single decimal point are allowed"));
        }
        if fraction.len() > AMOUNT_DECIMALS {
            return Err(fail("more than 12 fractional digits"));
        }

        let whole_planck = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<u128>()
                .ok()
                .and_then(|w| w.checked_mul(PLANCK_PER_UNIT))
                .ok_or_else(|| fail("value too large"))?
        };
        let fraction_planck = if fraction.is_empty() {
            0
        } else {
            let padded = format!("{:0<width$}", fraction, width = AMOUNT_DECIMALS);
            padded.parse::<u128>().map_err(|_| fail("invalid fraction"))?
        };

        whole_planck
            .checked_add(fraction_planck)
            .map(Amount)
            .ok_or_else(|| fail("value too large"))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Player or operator identity (wallet address), compared exactly
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for AccountId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One face of a six-sided die, always within 1..=6
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DieFace(u8);

impl DieFace {
    pub const SIDES: u8 = 6;

    pub fn new(value: u8) -> Result<Self, GameError> {
        if (1..=Self::SIDES).contains(&value) {
            Ok(Self(value))
        } else {
            Err(GameError::InvalidNumber(value.into()))
        }
    }

    /// Map uniformly distributed entropy onto a face
    pub const fn from_entropy(entropy: u64) -> Self {
        Self((entropy % Self::SIDES as u64) as u8 + 1)
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    /// Every face in ascending order
    pub fn all() -> impl Iterator<Item = DieFace> {
        (1..=Self::SIDES).map(DieFace)
    }
}

impl TryFrom<u8> for DieFace {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DieFace> for u8 {
    fn from(face: DieFace) -> Self {
        face.0
    }
}

impl fmt::Display for DieFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Economic configuration of the casino, replaced as a whole on update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameParameters {
    pub min_bet: Amount,
    pub max_bet: Amount,
    /// House edge in basis points (10000 = 100%)
    pub house_edge_bps: u16,
}

/// Game outcome
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GameOutcome {
    Win,
    Loss,
}

/// VRF bundle containing cryptographic proof
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VRFBundle {
    /// Hex-encoded VRF output bytes the roll is computed from (32 bytes)
    pub vrf_output: String,
    /// Hex-encoded VRF pre-output (32 bytes)
    pub vrf_preout: String,
    /// Hex-encoded VRF proof (64 bytes for schnorrkel)
    pub vrf_proof: String,
    /// Hex-encoded public key (32 bytes)
    pub public_key: String,
    /// Input message used for VRF
    pub input_message: String,
}

/// A settled wager. Created once by the settlement engine, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Casino-wide settlement sequence number, starting at 1
    pub game_id: u64,
    pub player: AccountId,
    pub bet_amount: Amount,
    pub chosen_number: DieFace,
    pub rolled_number: DieFace,
    pub payout: Amount,
    pub outcome: GameOutcome,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vrf: Option<VRFBundle>,
}

impl GameRecord {
    pub fn is_win(&self) -> bool {
        self.outcome == GameOutcome::Win
    }
}

/// Aggregate casino statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CasinoStats {
    pub bet_count: u64,
    pub wins: u64,
    pub total_wagered: Amount,
    pub total_paid_out: Amount,
    pub player_count: usize,
}

impl CasinoStats {
    pub(crate) fn record(&mut self, record: &GameRecord) {
        self.bet_count += 1;
        self.total_wagered = self.total_wagered.saturating_add(record.bet_amount);
        if record.is_win() {
            self.wins += 1;
            self.total_paid_out = self.total_paid_out.saturating_add(record.payout);
        }
    }
}
