// src/config.rs

use crate::landmarks::FEATURE_LEN;
use crate::types::{Config, StabilizerConfig};
use anyhow::{ensure, Context, Result};
use std::collections::HashSet;
use std::fs;

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path))?;
        let config = Self::from_yaml(&contents)?;
        Ok(config)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(contents).context("Invalid config YAML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(!self.model.labels.is_empty(), "model.labels must not be empty");

        let unique: HashSet<&str> = self.model.labels.iter().map(String::as_str).collect();
        ensure!(
            unique.len() == self.model.labels.len(),
            "model.labels contains duplicates: {:?}",
            self.model.labels
        );

        self.stabilizer.validate()
    }
}

impl StabilizerConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.feature_len == FEATURE_LEN,
            "stabilizer.feature_len ({}) must match the holistic landmark layout ({})",
            self.feature_len,
            FEATURE_LEN
        );
        ensure!(
            self.min_seq_for_predict > 0 && self.min_seq_for_predict <= self.sequence_len,
            "stabilizer.min_seq_for_predict ({}) must be in 1..={}",
            self.min_seq_for_predict,
            self.sequence_len
        );
        ensure!(
            self.overlap_after_predict <= self.sequence_len,
            "stabilizer.overlap_after_predict ({}) exceeds sequence_len ({})",
            self.overlap_after_predict,
            self.sequence_len
        );
        ensure!(self.stable_frames > 0, "stabilizer.stable_frames must be > 0");

        for (name, value) in [
            ("detect_threshold", self.detect_threshold),
            ("lock_threshold", self.lock_threshold),
        ] {
            ensure!(
                (0.0..=1.0).contains(&value),
                "stabilizer.{} must be within [0, 1], got {}",
                name,
                value
            );
        }

        ensure!(
            self.motion_threshold.is_finite() && self.motion_threshold > 0.0,
            "stabilizer.motion_threshold must be a positive number"
        );

        Ok(())
    }
}
