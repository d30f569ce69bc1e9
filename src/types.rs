// src/types.rs

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub model: ModelConfig,
    #[serde(default)]
    pub stabilizer: StabilizerConfig,
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub path: String,
    #[serde(default = "default_input_name")]
    pub input_name: String,
    /// Output index order of the classifier. Must match the training order;
    /// nothing at runtime can verify this.
    pub labels: Vec<String>,
    #[serde(default = "default_num_threads")]
    pub num_threads: usize,
    #[serde(default)]
    pub use_cuda: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilizerConfig {
    /// Length of one feature vector (132 pose + 1404 face + 63 + 63 hands)
    pub feature_len: usize,
    /// Window capacity and classifier input length
    pub sequence_len: usize,
    /// Window length at which the classifier starts being invoked
    pub min_seq_for_predict: usize,
    /// Entries kept in the window after every classifier invocation
    pub overlap_after_predict: usize,
    /// Smoothing buffer capacity, and the homogeneous count needed to lock
    pub stable_frames: usize,
    pub detect_threshold: f32,
    pub lock_threshold: f32,
    pub min_landmark_nonzero: usize,
    pub motion_threshold: f32,
    /// When true a lock freezes the engine until reset. When false the lock
    /// is only reported and frames keep being classified.
    pub freeze_on_lock: bool,
    pub debug_every_n_frames: u64,
}

impl Default for StabilizerConfig {
    fn default() -> Self {
        Self {
            feature_len: 1662,
            sequence_len: 30,
            min_seq_for_predict: 10,
            overlap_after_predict: 10,
            stable_frames: 3,
            detect_threshold: 0.40,
            lock_threshold: 0.85,
            min_landmark_nonzero: 50,
            motion_threshold: 1e-4,
            freeze_on_lock: true,
            debug_every_n_frames: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub queue_depth: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            queue_depth: 32,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

fn default_input_name() -> String {
    "input".to_string()
}

fn default_num_threads() -> usize {
    4
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_jpeg_quality() -> u8 {
    90
}
