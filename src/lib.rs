// src/lib.rs

pub mod config;
pub mod error;
pub mod extractor;
pub mod inference;
pub mod landmarks;
pub mod pipeline;
pub mod stabilization;
pub mod types;
pub mod web_api;

pub use error::FrameError;
pub use pipeline::{EngineHandle, FrameResponse, FrameStatus, StabilizationEngine};
pub use types::Config;
