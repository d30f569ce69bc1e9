// src/inference.rs

use crate::landmarks::FeatureVector;
use crate::types::ModelConfig;
use anyhow::{bail, ensure, Context, Result};
use ort::{
    execution_providers::CUDAExecutionProvider,
    session::{builder::GraphOptimizationLevel, Session},
};
use tracing::{debug, info};

/// Sequence classifier boundary: a window of feature vectors in, one
/// probability per label out, in the configured label order.
pub trait Classifier {
    fn predict(&mut self, sequence: &[&FeatureVector]) -> Result<Vec<f32>>;

    fn is_loaded(&self) -> bool {
        true
    }
}

/// Arg-max of one classifier call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionSample {
    /// Index into the label set
    pub label: usize,
    pub confidence: f32,
}

impl PredictionSample {
    /// The first maximum wins on exact ties.
    pub fn from_probabilities(probabilities: &[f32], num_labels: usize) -> Result<Self> {
        ensure!(
            probabilities.len() == num_labels,
            "Classifier returned {} probabilities for {} labels",
            probabilities.len(),
            num_labels
        );

        let mut best: Option<(usize, f32)> = None;
        for (idx, &p) in probabilities.iter().enumerate() {
            if !p.is_finite() {
                bail!("Classifier returned non-finite probability at index {}", idx);
            }
            if best.map_or(true, |(_, b)| p > b) {
                best = Some((idx, p));
            }
        }

        let (label, confidence) = best.context("Classifier returned no probabilities")?;
        Ok(Self { label, confidence })
    }
}

// ============================================================================
// ONNX RUNTIME CLASSIFIER
// ============================================================================

pub struct OnnxClassifier {
    session: Session,
    input_name: String,
    sequence_len: usize,
    feature_len: usize,
}

impl OnnxClassifier {
    pub fn new(config: &ModelConfig, sequence_len: usize, feature_len: usize) -> Result<Self> {
        info!("Initializing sequence classifier");
        info!("Model path: {}", config.path);

        let mut session_builder = Session::builder()?;

        if config.use_cuda {
            info!("Enabling CUDA execution provider");
            session_builder =
                session_builder.with_execution_providers([CUDAExecutionProvider::default()
                    .with_device_id(0)
                    .build()])?;
        }

        let session = session_builder
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(config.num_threads)?
            .with_inter_threads(1)?
            .commit_from_file(&config.path)
            .with_context(|| format!("Failed to load model {}", config.path))?;

        for input in &session.inputs {
            info!("Model input: {} {:?}", input.name, input.input_type);
        }
        for output in &session.outputs {
            info!("Model output: {} {:?}", output.name, output.output_type);
        }

        info!("✓ Classifier initialized successfully");

        Ok(Self {
            session,
            input_name: config.input_name.clone(),
            sequence_len,
            feature_len,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&mut self, sequence: &[&FeatureVector]) -> Result<Vec<f32>> {
        ensure!(
            sequence.len() == self.sequence_len,
            "Classifier expects {} frames, got {}",
            self.sequence_len,
            sequence.len()
        );

        let mut input = Vec::with_capacity(self.sequence_len * self.feature_len);
        for frame in sequence {
            ensure!(
                frame.len() == self.feature_len,
                "Feature vector has {} values, expected {}",
                frame.len(),
                self.feature_len
            );
            input.extend_from_slice(frame.as_slice());
        }

        let shape = [1, self.sequence_len, self.feature_len];
        let input_value =
            ort::value::Value::from_array((shape.as_slice(), input.into_boxed_slice()))?;

        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => input_value])
            .context("Inference failed")?;

        let (output_shape, data_slice) = outputs[0]
            .try_extract_tensor::<f32>()
            .context("Failed to extract output tensor")?;
        debug!("Classifier output shape: {:?}", output_shape);

        Ok(data_slice.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax_picks_label_and_confidence() {
        let sample = PredictionSample::from_probabilities(&[0.1, 0.1, 0.8], 3).unwrap();
        assert_eq!(sample.label, 2);
        assert!((sample.confidence - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_argmax_first_maximum_wins() {
        let sample = PredictionSample::from_probabilities(&[0.4, 0.4, 0.2], 3).unwrap();
        assert_eq!(sample.label, 0);
    }

    #[test]
    fn test_label_count_mismatch_is_error() {
        assert!(PredictionSample::from_probabilities(&[0.5, 0.5], 3).is_err());
        assert!(PredictionSample::from_probabilities(&[], 0).is_err());
    }

    #[test]
    fn test_non_finite_probability_is_error() {
        assert!(PredictionSample::from_probabilities(&[0.2, f32::NAN, 0.3], 3).is_err());
    }
}
