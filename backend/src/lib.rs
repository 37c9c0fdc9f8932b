pub mod config;
pub mod error;
pub mod exposure;
pub mod geocoding;
pub mod models;
pub mod routing;
pub mod service;
pub mod solar;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    routing::{get, post},
};
use serde_json::Value;
use shared::{ApiError, ReverseQuery, SeatRequest, SeatResponse, SuggestQuery};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::error::SeatError;
use crate::models::Coordinate;
use crate::service::SeatService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SeatService>,
    pub suggest_limit: usize,
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/find-seat", post(find_seat_handler))
        .route("/autocomplete", get(autocomplete_handler))
        .route("/reverse-geocode", get(reverse_geocode_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

async fn find_seat_handler(
    State(state): State<AppState>,
    payload: Result<Json<SeatRequest>, JsonRejection>,
) -> ApiResult<SeatResponse> {
    let Json(req) = payload.map_err(|rejection| {
        api_error(SeatError::Validation(format!(
            "invalid request body: {}",
            rejection.body_text()
        )))
    })?;
    tracing::info!("find-seat request: {:?} -> {:?}", req.start, req.end);

    state.service.find_seat(&req).await.map(Json).map_err(api_error)
}

async fn autocomplete_handler(
    State(state): State<AppState>,
    Query(query): Query<SuggestQuery>,
) -> ApiResult<Value> {
    state
        .service
        .suggest(&query.q, state.suggest_limit)
        .await
        .map(Json)
        .map_err(api_error)
}

async fn reverse_geocode_handler(
    State(state): State<AppState>,
    query: Result<Query<ReverseQuery>, QueryRejection>,
) -> ApiResult<Value> {
    let Query(query) = query.map_err(|rejection| {
        api_error(SeatError::Validation(format!(
            "lat and lon are required numbers: {}",
            rejection.body_text()
        )))
    })?;

    state
        .service
        .reverse(Coordinate::new(query.lat, query.lon))
        .await
        .map(Json)
        .map_err(api_error)
}

async fn health_handler() -> &'static str {
    "ok"
}

fn api_error(err: SeatError) -> (StatusCode, Json<ApiError>) {
    (
        err.status(),
        Json(ApiError {
            error: err.to_string(),
        }),
    )
}
