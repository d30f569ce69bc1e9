//! WebAPI - HTTP surface of the stabilizer
//!
//! ## Endpoints
//!
//! - `POST /predict`: one base64 frame in, one `FrameResponse` out
//! - `POST /reset`: clear the session and release the lock
//! - `GET /health`: model, label set and counters

mod routes;

pub use routes::create_router;

use crate::pipeline::{EngineHandle, EngineInfo, MetricsSummary, PipelineMetrics};
use serde::Serialize;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub engine: EngineHandle,
    pub info: EngineInfo,
    pub metrics: PipelineMetrics,
}

impl AppState {
    pub fn new(engine: EngineHandle, info: EngineInfo, metrics: PipelineMetrics) -> Self {
        Self {
            engine,
            info,
            metrics,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    pub actions: Vec<String>,
    pub sequence_length: usize,
    pub metrics: MetricsSummary,
}
