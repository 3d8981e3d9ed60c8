//! Ledger API Endpoints
//!
//! JSON surface for the app: profile overview, earning events, takedowns,
//! point swaps, the leaderboard and the static rank table.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};

use crate::error::LedgerError;
use crate::progression::{EarningEvent, PirateProfile, RawEvent};
use crate::service::{LeaderboardEntry, ProfileOverview, ProfileService, SwapOutcome};
use crate::store::{EntityStore, KeyValueStore};

const DEFAULT_LEADERBOARD_LIMIT: usize = 10;
const MAX_LEADERBOARD_LIMIT: usize = 100;

/// API state for ledger endpoints
pub struct LedgerApiState<S, K> {
    pub service: Arc<ProfileService<S, K>>,
}

impl<S, K> Clone for LedgerApiState<S, K> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

impl<S, K> LedgerApiState<S, K> {
    pub fn new(service: ProfileService<S, K>) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

// Request/response types

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Debug, Serialize)]
pub struct RankResponse {
    pub name: &'static str,
    pub min: i64,
    pub max: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct RanksResponse {
    pub tiers: Vec<RankResponse>,
    pub conversion_fee_basis_points: u32,
}

#[derive(Debug, Deserialize)]
pub struct SwapRequest {
    pub points_to_convert: i64,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<usize>,
}

/// Map a service error onto a status code
pub fn api_error(err: anyhow::Error) -> ApiError {
    let status = match err.downcast_ref::<LedgerError>() {
        Some(LedgerError::InvalidInput(_)) | Some(LedgerError::InvalidEvent(_)) => {
            StatusCode::BAD_REQUEST
        }
        Some(LedgerError::InsufficientBalance { .. }) => StatusCode::CONFLICT,
        None => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        error!("Ledger request failed: {:#}", err);
    } else {
        warn!("Ledger request rejected: {}", err);
    }

    let message = match err.downcast_ref::<LedgerError>() {
        Some(ledger_error) => ledger_error.to_string(),
        None => "Internal server error".to_string(),
    };

    (status, Json(ErrorResponse { error: message }))
}

// Endpoints

/// GET /ranks - Rank table and conversion fee
pub async fn get_ranks<S: EntityStore, K: KeyValueStore>(
    State(state): State<LedgerApiState<S, K>>,
) -> Json<RanksResponse> {
    let ledger = state.service.ledger();

    Json(RanksResponse {
        tiers: ledger
            .tiers()
            .iter()
            .map(|tier| RankResponse {
                name: tier.name,
                min: tier.min,
                max: tier.max,
            })
            .collect(),
        conversion_fee_basis_points: ledger.fee_rate().basis_points(),
    })
}

/// GET /profiles/{email} - Profile with rank, progress, badges and doubloons
pub async fn get_profile<S: EntityStore, K: KeyValueStore>(
    State(state): State<LedgerApiState<S, K>>,
    Path(email): Path<String>,
) -> Result<Json<ProfileOverview>, ApiError> {
    state.service.overview(&email).await.map(Json).map_err(api_error)
}

/// POST /profiles/{email}/events - Apply an earning event
pub async fn post_event<S: EntityStore, K: KeyValueStore>(
    State(state): State<LedgerApiState<S, K>>,
    Path(email): Path<String>,
    Json(payload): Json<RawEvent>,
) -> Result<Json<ProfileOverview>, ApiError> {
    let event = EarningEvent::try_from(payload).map_err(|e| api_error(e.into()))?;

    state
        .service
        .record_event(&email, event)
        .await
        .map_err(api_error)?;

    state.service.overview(&email).await.map(Json).map_err(api_error)
}

/// POST /profiles/{email}/takedowns - Count a removed ad
pub async fn post_takedown<S: EntityStore, K: KeyValueStore>(
    State(state): State<LedgerApiState<S, K>>,
    Path(email): Path<String>,
) -> Result<Json<PirateProfile>, ApiError> {
    state
        .service
        .record_takedown(&email)
        .await
        .map(Json)
        .map_err(api_error)
}

/// POST /profiles/{email}/swap - Convert points to doubloons
pub async fn post_swap<S: EntityStore, K: KeyValueStore>(
    State(state): State<LedgerApiState<S, K>>,
    Path(email): Path<String>,
    Json(payload): Json<SwapRequest>,
) -> Result<Json<SwapOutcome>, ApiError> {
    state
        .service
        .swap_points(&email, payload.points_to_convert)
        .await
        .map(Json)
        .map_err(api_error)
}

/// GET /leaderboard?limit=N - Top profiles by points
pub async fn get_leaderboard<S: EntityStore, K: KeyValueStore>(
    State(state): State<LedgerApiState<S, K>>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
        .clamp(1, MAX_LEADERBOARD_LIMIT);

    state
        .service
        .leaderboard(limit)
        .await
        .map(Json)
        .map_err(api_error)
}

/// Create the ledger API router
pub fn create_router<S, K>(state: LedgerApiState<S, K>) -> Router
where
    S: EntityStore + 'static,
    K: KeyValueStore + 'static,
{
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/ranks", get(get_ranks::<S, K>))
        .route("/leaderboard", get(get_leaderboard::<S, K>))
        .route("/profiles/{email}", get(get_profile::<S, K>))
        .route("/profiles/{email}/events", post(post_event::<S, K>))
        .route("/profiles/{email}/takedowns", post(post_takedown::<S, K>))
        .route("/profiles/{email}/swap", post(post_swap::<S, K>))
        .with_state(state)
}
