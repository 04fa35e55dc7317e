//! API Request and Response Models
//!
//! Amounts travel as decimal strings ("0.05").

use crate::games::treasury::TreasuryTotals;
use crate::games::types::{AccountId, Amount, CasinoStats, DieFace, GameParameters, GameRecord, VRFBundle};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub randomness: String,
}

/// POST /api/bets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceBetRequest {
    pub player: AccountId,
    /// Any integer is accepted here so out-of-range numbers get `INVALID_NUMBER`
    pub chosen_number: i64,
    pub amount: Amount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceBetResponse {
    pub record: GameRecord,
    pub treasury_balance: Amount,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub offset: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub player: AccountId,
    pub total: usize,
    pub offset: usize,
    pub records: Vec<GameRecord>,
}

/// GET /api/treasury
pub type TreasuryResponse = TreasuryTotals;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundRequest {
    pub from: AccountId,
    pub amount: Amount,
}

/// POST /api/treasury/withdraw, made by the authenticated operator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawRequest {
    pub amount: Amount,
}

/// PUT /api/parameters, made by the authenticated operator
pub type UpdateParametersRequest = GameParameters;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CasinoStats,
    pub treasury_balance: Amount,
    pub parameters: GameParameters,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VrfPublicKeyResponse {
    pub public_key: String,
}

/// POST /api/vrf/verify
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyVrfRequest {
    pub vrf: VRFBundle,
    /// Defaults to the bundle's own input message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_input: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyVrfResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rolled_number: Option<DieFace>,
}
