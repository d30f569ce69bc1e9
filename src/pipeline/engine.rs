// src/pipeline/engine.rs
//
// Per-frame orchestration of the stabilization pipeline.
//
// Entry points: submit_image() for the HTTP payload, submit_landmarks() when
// the caller already ran the landmark model. Order of checks:
//
//   locked?  → cached lock result, frame is not even decoded
//   decode   → client error on failure, nothing mutated
//   no hands / too few landmarks → clear smoothing buffer, sentinel
//   motion gate → static frame dropped, nothing mutated
//   window short → append, "collecting" sentinel
//   classify → only after success: append, shrink, smooth, lock
//
// The classifier call is staged: the window is read with the candidate
// frame virtually appended, and the session is only mutated once the call
// and its output validation succeed.

use super::metrics::PipelineMetrics;
use super::response::{FrameResponse, FrameStatus};
use super::session::Session;
use crate::error::FrameError;
use crate::extractor::LandmarkExtractor;
use crate::inference::{Classifier, PredictionSample};
use crate::landmarks::{FeatureVector, HolisticLandmarks};
use crate::stabilization::{LockState, MotionGate};
use crate::types::StabilizerConfig;
use anyhow::Context;
use base64::Engine;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, error, info};

/// Read-only facts about a running engine, for health reporting.
#[derive(Debug, Clone, Serialize)]
pub struct EngineInfo {
    pub model_loaded: bool,
    pub actions: Vec<String>,
    pub sequence_length: usize,
}

pub struct StabilizationEngine {
    config: StabilizerConfig,
    labels: Vec<String>,
    extractor: Box<dyn LandmarkExtractor + Send>,
    classifier: Box<dyn Classifier + Send>,
    motion_gate: MotionGate,
    session: Session,
    metrics: PipelineMetrics,
}

impl StabilizationEngine {
    pub fn new(
        config: StabilizerConfig,
        labels: Vec<String>,
        extractor: Box<dyn LandmarkExtractor + Send>,
        classifier: Box<dyn Classifier + Send>,
    ) -> Self {
        Self {
            motion_gate: MotionGate::new(config.motion_threshold),
            session: Session::new(&config),
            config,
            labels,
            extractor,
            classifier,
            metrics: PipelineMetrics::new(),
        }
    }

    pub fn info(&self) -> EngineInfo {
        EngineInfo {
            model_loaded: self.classifier.is_loaded(),
            actions: self.labels.clone(),
            sequence_length: self.config.sequence_len,
        }
    }

    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    // ========================================================================
    // ENTRY POINTS
    // ========================================================================

    /// Process one frame as received over HTTP: a base64 encoded image
    /// (JPEG, PNG, ...), optionally carrying a `data:<mime>;base64,` prefix.
    ///
    /// The lock check comes first, so a frozen session answers any input,
    /// including a missing or undecodable image.
    pub fn submit_image(&mut self, image: Option<&str>) -> Result<FrameResponse, FrameError> {
        self.begin_frame();

        if let Some(response) = self.frozen_response() {
            return Ok(response);
        }

        let payload = image.ok_or(FrameError::MissingImage)?;
        let data = match payload.strip_prefix("data:") {
            Some(rest) => rest.split_once(',').map_or(rest, |(_, data)| data),
            None => payload,
        };
        let encoded = base64::engine::general_purpose::STANDARD
            .decode(data.trim())
            .map_err(|e| FrameError::InvalidImage(format!("invalid base64: {}", e)))?;

        self.decode_and_process(&encoded)
    }

    /// Process landmarks extracted by the caller.
    pub fn submit_landmarks(
        &mut self,
        landmarks: &HolisticLandmarks,
    ) -> Result<FrameResponse, FrameError> {
        self.begin_frame();

        if let Some(response) = self.frozen_response() {
            return Ok(response);
        }

        self.process_landmarks(landmarks)
    }

    pub fn reset(&mut self) {
        self.session.reset();
        self.metrics.inc(&self.metrics.resets);
        info!("🔄 Session reset");
    }

    // ========================================================================
    // PIPELINE
    // ========================================================================

    fn begin_frame(&mut self) {
        self.session.frame_count += 1;
        self.metrics.inc(&self.metrics.frames_submitted);
    }

    /// Cached lock result when the lock freezes input.
    fn frozen_response(&self) -> Option<FrameResponse> {
        if !self.config.freeze_on_lock {
            return None;
        }

        match self.session.lock_state() {
            LockState::Locked { label, confidence } => {
                self.metrics.inc(&self.metrics.frames_while_locked);
                Some(FrameResponse {
                    status: FrameStatus::Label(self.label_name(label)),
                    confidence,
                    locked: true,
                    progress: self.session.window.len(),
                })
            }
            LockState::Unlocked => None,
        }
    }

    fn decode_and_process(&mut self, encoded: &[u8]) -> Result<FrameResponse, FrameError> {
        let image = image::load_from_memory(encoded)
            .map_err(|e| FrameError::InvalidImage(e.to_string()))?
            .to_rgb8();

        let landmarks = self
            .extractor
            .extract(&image)
            .context("Landmark extraction failed")
            .map_err(|e| self.internal_failure(e))?;

        self.process_landmarks(&landmarks)
    }

    fn process_landmarks(
        &mut self,
        landmarks: &HolisticLandmarks,
    ) -> Result<FrameResponse, FrameError> {
        if !landmarks.has_hands() {
            self.session.smoothing.clear();
            self.metrics.inc(&self.metrics.no_hands_frames);
            return Ok(self.sentinel(FrameStatus::NoHands));
        }

        let features = FeatureVector::from_landmarks(landmarks)
            .and_then(|features| {
                anyhow::ensure!(
                    features.len() == self.config.feature_len,
                    "Feature vector has {} values, configured feature_len is {}",
                    features.len(),
                    self.config.feature_len
                );
                Ok(features)
            })
            .map_err(|e| self.internal_failure(e))?;

        let nonzero = features.nonzero_count();
        if self.config.debug_every_n_frames > 0
            && self.session.frame_count % self.config.debug_every_n_frames == 0
        {
            let (mean, std) = features.stats();
            debug!(
                "🔍 Frame {}: len={}, nonzero={}, mean={:.4}, std={:.4}",
                self.session.frame_count,
                features.len(),
                nonzero,
                mean,
                std
            );
        }

        if nonzero < self.config.min_landmark_nonzero {
            self.session.smoothing.clear();
            self.metrics.inc(&self.metrics.insufficient_frames);
            return Ok(self.sentinel(FrameStatus::InsufficientLandmarks));
        }

        if self
            .motion_gate
            .is_static(self.session.window.last(), &features)
        {
            self.metrics.inc(&self.metrics.static_frames);
            return Ok(self.sentinel(FrameStatus::NoMotion));
        }

        self.metrics.inc(&self.metrics.frames_accepted);
        let progress = self.session.window.len_after_append();

        if !self.session.window.is_ready_after_append() {
            self.session.window.append(features);
            return Ok(self.sentinel(FrameStatus::Collecting {
                progress,
                required: self.config.min_seq_for_predict,
            }));
        }

        let sample = self
            .classify_staged(&features)
            .map_err(|e| self.internal_failure(e))?;

        // Commit
        self.session.window.append(features);
        self.session.window.shrink_after_predict();
        let outcome = self.session.apply_prediction(sample);
        if outcome.newly_locked {
            self.metrics.inc(&self.metrics.locks);
            info!(
                "🔒 LOCKED: {} (confidence: {:.4})",
                self.label_name(outcome.vote.label),
                outcome.vote.avg_confidence
            );
        }

        Ok(self.assemble(sample, progress))
    }

    /// Run the classifier on the window as it would look with `candidate`
    /// appended. Does not mutate the session.
    fn classify_staged(&mut self, candidate: &FeatureVector) -> anyhow::Result<PredictionSample> {
        let input = self
            .session
            .window
            .build_classifier_input_with(candidate);

        self.metrics.inc(&self.metrics.classifier_calls);
        let started = Instant::now();
        let probabilities = self
            .classifier
            .predict(&input)
            .context("Classifier call failed")?;
        self.metrics.set_timing(
            &self.metrics.inference_time_us,
            started.elapsed().as_micros() as u64,
        );

        let sample = PredictionSample::from_probabilities(&probabilities, self.labels.len())?;
        debug!(
            "📊 Frame {} | Raw predictions: {:?} | Predicted: {} ({:.4})",
            self.session.frame_count,
            probabilities,
            self.label_name(sample.label),
            sample.confidence
        );

        Ok(sample)
    }

    /// Prefer the stable decision over the raw sample, then apply the
    /// detection threshold.
    fn assemble(&self, raw: PredictionSample, progress: usize) -> FrameResponse {
        let (label, confidence) = match self.session.stable {
            Some(stable) => (stable.label, stable.confidence),
            None => (raw.label, raw.confidence),
        };

        // A low-confidence answer never reports a lock
        if confidence < self.config.detect_threshold {
            return FrameResponse {
                status: FrameStatus::LowConfidence,
                confidence,
                locked: false,
                progress,
            };
        }

        FrameResponse {
            status: FrameStatus::Label(self.label_name(label)),
            confidence,
            locked: self.session.lock.is_locked(),
            progress,
        }
    }

    fn sentinel(&self, status: FrameStatus) -> FrameResponse {
        FrameResponse::sentinel(status, self.session.window.len())
    }

    fn label_name(&self, label: usize) -> String {
        self.labels
            .get(label)
            .cloned()
            .unwrap_or_else(|| format!("label_{}", label))
    }

    fn internal_failure(&self, err: anyhow::Error) -> FrameError {
        self.metrics.inc(&self.metrics.internal_failures);
        error!(
            "❌ Frame {} failed: {:#}",
            self.session.frame_count, err
        );
        FrameError::Internal(err)
    }
}
