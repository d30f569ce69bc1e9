// src/pipeline/response.rs

use serde::Serialize;
use std::fmt;

/// What the engine reports for a frame: either a label or one of the
/// pipeline sentinels. Sentinels are regular outcomes, not errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "String")]
pub enum FrameStatus {
    Label(String),
    NoHands,
    InsufficientLandmarks,
    NoMotion,
    Collecting { progress: usize, required: usize },
    LowConfidence,
}

impl FrameStatus {
    pub fn is_label(&self) -> bool {
        matches!(self, FrameStatus::Label(_))
    }
}

impl fmt::Display for FrameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameStatus::Label(label) => f.write_str(label),
            FrameStatus::NoHands => f.write_str("No hands detected"),
            FrameStatus::InsufficientLandmarks => f.write_str("Insufficient landmarks"),
            FrameStatus::NoMotion => f.write_str("No motion detected"),
            FrameStatus::Collecting { progress, required } => {
                write!(f, "Collecting frames ({}/{})", progress, required)
            }
            FrameStatus::LowConfidence => f.write_str("Low confidence"),
        }
    }
}

impl From<FrameStatus> for String {
    fn from(status: FrameStatus) -> Self {
        status.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameResponse {
    #[serde(rename = "prediction")]
    pub status: FrameStatus,
    pub confidence: f32,
    pub locked: bool,
    /// Window length reported with this response
    pub progress: usize,
}

impl FrameResponse {
    pub fn sentinel(status: FrameStatus, progress: usize) -> Self {
        Self {
            status,
            confidence: 0.0,
            locked: false,
            progress,
        }
    }
}
