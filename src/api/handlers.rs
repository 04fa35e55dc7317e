//! Request Handlers
//!
//! Thin adapters from HTTP to `Casino`. Every casino rejection is returned as
//! an `ApiError` carrying the request id.

use super::{
    errors::{ApiError, ApiJson},
    middleware::RequestId,
    models::*,
    monitoring::MetricsRegistry,
    security::{OperatorAuth, OperatorCaller},
};
use crate::errors::GameError;
use crate::games::settlement::Casino;
use crate::games::types::{AccountId, GameParameters};
use crate::games::vrf_engine::VRFGameEngine;
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use std::sync::Arc;

/// Shared application state
pub struct AppState {
    pub casino: Arc<Casino>,
    pub operator_auth: OperatorAuth,
    pub metrics: Arc<MetricsRegistry>,
    pub version: String,
}

impl AppState {
    pub fn new(casino: Arc<Casino>, operator_auth: OperatorAuth) -> Self {
        Self {
            casino,
            operator_auth,
            metrics: Arc::new(MetricsRegistry::new()),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// GET /health
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "Running".to_string(),
        version: state.version.clone(),
        randomness: state.casino.randomness_kind().to_string(),
    })
}

/// POST /api/bets
pub async fn place_bet_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<PlaceBetRequest>,
) -> Result<Json<PlaceBetResponse>, ApiError> {
    let chosen_number = u8::try_from(request.chosen_number).map_err(|_| {
        ApiError::game(request_id.0.clone(), GameError::InvalidNumber(request.chosen_number))
    })?;
    let record = state
        .casino
        .place_bet(&request.player, chosen_number, request.amount)
        .map_err(|e| ApiError::game(request_id.0, e))?;

    Ok(Json(PlaceBetResponse {
        record,
        treasury_balance: state.casino.balance_of(),
    }))
}

/// GET /api/players/:player/history?offset={n}&limit={n}
pub async fn history_handler(
    State(state): State<Arc<AppState>>,
    Path(player): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Json<HistoryResponse> {
    let player = AccountId::new(player);
    let offset = query.offset.unwrap_or(0);
    let limit = query.limit.unwrap_or(usize::MAX);

    Json(HistoryResponse {
        total: state.casino.history_len(&player),
        offset,
        records: state.casino.history_page(&player, offset, limit),
        player,
    })
}

/// GET /api/treasury
pub async fn treasury_handler(State(state): State<Arc<AppState>>) -> Json<TreasuryResponse> {
    Json(state.casino.treasury_totals())
}

/// POST /api/treasury/fund
pub async fn fund_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<FundRequest>,
) -> Result<Json<TreasuryResponse>, ApiError> {
    state
        .casino
        .fund(&request.from, request.amount)
        .map_err(|e| ApiError::game(request_id.0, e))?;
    Ok(Json(state.casino.treasury_totals()))
}

/// POST /api/treasury/withdraw
pub async fn withdraw_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    OperatorCaller(caller): OperatorCaller,
    ApiJson(request): ApiJson<WithdrawRequest>,
) -> Result<Json<TreasuryResponse>, ApiError> {
    state
        .casino
        .withdraw(&caller, request.amount)
        .map_err(|e| ApiError::game(request_id.0, e))?;
    Ok(Json(state.casino.treasury_totals()))
}

/// GET /api/parameters
pub async fn get_parameters_handler(State(state): State<Arc<AppState>>) -> Json<GameParameters> {
    Json(state.casino.parameters())
}

/// PUT /api/parameters
pub async fn update_parameters_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    OperatorCaller(caller): OperatorCaller,
    ApiJson(parameters): ApiJson<UpdateParametersRequest>,
) -> Result<Json<GameParameters>, ApiError> {
    state
        .casino
        .update_parameters(&caller, parameters)
        .map_err(|e| ApiError::game(request_id.0, e))?;
    Ok(Json(state.casino.parameters()))
}

/// GET /api/stats
pub async fn stats_handler(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    Json(StatsResponse {
        stats: state.casino.stats(),
        treasury_balance: state.casino.balance_of(),
        parameters: state.casino.parameters(),
    })
}

/// GET /api/vrf/public-key
pub async fn vrf_public_key_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<VrfPublicKeyResponse>, ApiError> {
    let public_key = state.casino.vrf_public_key().ok_or_else(|| {
        ApiError::not_found(
            request_id.0,
            format!(
                "Randomness source '{}' does not publish a VRF key",
                state.casino.randomness_kind()
            ),
        )
    })?;
    Ok(Json(VrfPublicKeyResponse { public_key }))
}

/// POST /api/vrf/verify
pub async fn verify_vrf_handler(
    Extension(request_id): Extension<RequestId>,
    ApiJson(request): ApiJson<VerifyVrfRequest>,
) -> Result<Json<VerifyVrfResponse>, ApiError> {
    let expected_input = request
        .expected_input
        .as_deref()
        .unwrap_or(&request.vrf.input_message);

    let valid = VRFGameEngine::verify_vrf_proof(&request.vrf, expected_input)
        .map_err(|e| ApiError::bad_request(request_id.0, e.to_string()))?;

    let rolled_number = if valid {
        hex::decode(&request.vrf.vrf_output)
            .ok()
            .map(|output| VRFGameEngine::compute_dice_roll(&output))
    } else {
        None
    };

    Ok(Json(VerifyVrfResponse {
        valid,
        rolled_number,
    }))
}
