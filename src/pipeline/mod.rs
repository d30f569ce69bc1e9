// src/pipeline/mod.rs

pub mod engine;
pub mod metrics;
pub mod response;
pub mod session;
pub mod worker;

#[cfg(test)]
pub(crate) mod test_support;

pub use engine::{EngineInfo, StabilizationEngine};
pub use metrics::{MetricsSummary, PipelineMetrics};
pub use response::{FrameResponse, FrameStatus};
pub use session::Session;
pub use worker::EngineHandle;
