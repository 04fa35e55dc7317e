//! API Error Handling
//!
//! Structured error responses with proper HTTP status codes and request tracking.

use super::middleware::request_id_of;
use crate::errors::GameError;
use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;

/// Top-level API error response with request tracking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub request_id: String,
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable error code (BET_TOO_LOW, UNAUTHORIZED, NOT_FOUND, ...)
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// API error types with request tracking
#[derive(Debug)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub request_id: String,
}

#[derive(Debug)]
pub enum ApiErrorKind {
    /// Rejection from the casino itself
    Game(GameError),
    NotFound(String),
    BadRequest(String),
}

impl ApiError {
    pub fn game(request_id: String, error: GameError) -> Self {
        Self {
            kind: ApiErrorKind::Game(error),
            request_id,
        }
    }

    pub fn not_found(request_id: String, message: String) -> Self {
        Self {
            kind: ApiErrorKind::NotFound(message),
            request_id,
        }
    }

    pub fn bad_request(request_id: String, message: String) -> Self {
        Self {
            kind: ApiErrorKind::BadRequest(message),
            request_id,
        }
    }

    pub fn status(&self) -> StatusCode {
        match &self.kind {
            ApiErrorKind::Game(error) => game_status(error),
            ApiErrorKind::NotFound(_) => StatusCode::NOT_FOUND,
            ApiErrorKind::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn code(&self) -> &'static str {
        match &self.kind {
            ApiErrorKind::Game(error) => error.code(),
            ApiErrorKind::NotFound(_) => "NOT_FOUND",
            ApiErrorKind::BadRequest(_) => "BAD_REQUEST",
        }
    }
}

fn game_status(error: &GameError) -> StatusCode {
    match error {
        GameError::Unauthorized { .. } => StatusCode::FORBIDDEN,
        GameError::InsufficientFunds { .. } | GameError::InsufficientTreasury { .. } => {
            StatusCode::CONFLICT
        }
        GameError::InvalidNumber(_)
        | GameError::BetTooLow { .. }
        | GameError::BetTooHigh { .. }
        | GameError::InvalidParameters(_)
        | GameError::AmountOverflow => StatusCode::BAD_REQUEST,
    }
}

fn game_details(error: &GameError) -> Option<serde_json::Value> {
    match error {
        GameError::BetTooLow { stake, min_bet } => {
            Some(serde_json::json!({ "stake": stake, "min_bet": min_bet }))
        }
        GameError::BetTooHigh { stake, max_bet } => {
            Some(serde_json::json!({ "stake": stake, "max_bet": max_bet }))
        }
        GameError::InsufficientFunds {
            requested,
            available,
        } => Some(serde_json::json!({ "requested": requested, "available": available })),
        GameError::InsufficientTreasury {
            required,
            available,
        } => Some(serde_json::json!({ "required": required, "available": available })),
        _ => None,
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ApiErrorKind::Game(error) => write!(f, "[{}] {}", self.request_id, error),
            ApiErrorKind::NotFound(msg) => write!(f, "[{}] Not Found: {}", self.request_id, msg),
            ApiErrorKind::BadRequest(msg) => write!(f, "[{}] Bad Request: {}", self.request_id, msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let (message, details) = match &self.kind {
            ApiErrorKind::Game(error) => (error.to_string(), game_details(error)),
            ApiErrorKind::NotFound(msg) | ApiErrorKind::BadRequest(msg) => (msg.clone(), None),
        };

        let body = Json(ErrorResponse {
            request_id: self.request_id,
            error: ErrorBody {
                code: code.to_string(),
                message,
                details,
            },
        });

        (status, body).into_response()
    }
}

/// `Json` whose rejections use the `ErrorResponse` envelope
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let request_id = request_id_of(request.extensions());
        match Json::<T>::from_request(request, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::bad_request(request_id, rejection.body_text())),
        }
    }
}
