//! API Routes

use super::{AppState, HealthResponse};
use crate::error::FrameError;
use crate::pipeline::FrameResponse;
use axum::{
    body::Bytes,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Debug, Deserialize)]
struct PredictRequest {
    #[serde(default)]
    image: Option<String>,
}

/// Create API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .route("/reset", post(reset))
        .route("/health", get(health))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Pull the base64 payload out of a predict body. Anything that is not a
/// JSON object with a non-empty `image` string yields `None`; the engine
/// decides whether that is an error, since a locked session answers anyway.
fn image_payload(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<PredictRequest>(body)
        .ok()
        .and_then(|request| request.image)
        .filter(|image| !image.is_empty())
}

async fn predict(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<FrameResponse>, FrameError> {
    let response = state.engine.submit(image_payload(&body)).await?;
    Ok(Json(response))
}

async fn reset(State(state): State<AppState>) -> Result<impl IntoResponse, FrameError> {
    state.engine.reset().await?;
    Ok(Json(json!({ "message": "Reset successful" })))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "running".to_string(),
        model_loaded: state.info.model_loaded,
        actions: state.info.actions.clone(),
        sequence_length: state.info.sequence_length,
        metrics: state.metrics.summary(),
    })
}
