// src/pipeline/test_support.rs
//
// Scripted stand-ins for the external collaborators.

use crate::extractor::LandmarkExtractor;
use crate::inference::Classifier;
use crate::landmarks::{FeatureVector, HolisticLandmarks, HAND_POINTS};
use anyhow::{anyhow, Result};
use image::RgbImage;
use std::collections::{HashSet, VecDeque};
use std::io::Cursor;
use std::sync::{Arc, Mutex};

/// Hand-only landmarks whose values move with `i`, so consecutive indices
/// always pass the motion gate and every index has a distinct signature.
pub fn hand_frame(i: usize) -> HolisticLandmarks {
    let value = 0.1 + 0.01 * i as f32;
    HolisticLandmarks {
        left_hand: Some(vec![[value; 3]; HAND_POINTS]),
        ..Default::default()
    }
}

/// Largest value of a frame; equals the hand value used by `hand_frame`.
pub fn signature(frame: &FeatureVector) -> f32 {
    frame.as_slice().iter().copied().fold(0.0, f32::max)
}

pub fn encode_png() -> Vec<u8> {
    let image = RgbImage::from_pixel(4, 4, image::Rgb([120, 80, 40]));
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, image::ImageFormat::Png)
        .unwrap();
    bytes.into_inner()
}

/// Returns queued probability vectors in order and records the signature
/// of every frame it was called with.
pub struct ScriptedClassifier {
    script: VecDeque<Vec<f32>>,
    failing_calls: HashSet<usize>,
    call_index: usize,
    calls: Arc<Mutex<Vec<Vec<f32>>>>,
}

impl ScriptedClassifier {
    pub fn new(script: Vec<Vec<f32>>) -> Self {
        Self {
            script: script.into(),
            failing_calls: HashSet::new(),
            call_index: 0,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Make the call with this (0-based) index fail without consuming the script.
    pub fn failing_on(mut self, call_index: usize) -> Self {
        self.failing_calls.insert(call_index);
        self
    }

    pub fn calls(&self) -> Arc<Mutex<Vec<Vec<f32>>>> {
        Arc::clone(&self.calls)
    }
}

impl Classifier for ScriptedClassifier {
    fn predict(&mut self, sequence: &[&FeatureVector]) -> Result<Vec<f32>> {
        let index = self.call_index;
        self.call_index += 1;
        self.calls
            .lock()
            .unwrap()
            .push(sequence.iter().map(|f| signature(f)).collect());

        if self.failing_calls.contains(&index) {
            return Err(anyhow!("scripted failure on call {}", index));
        }

        self.script
            .pop_front()
            .ok_or_else(|| anyhow!("classifier script exhausted at call {}", index))
    }
}

#[derive(Default)]
pub struct ScriptedExtractor {
    script: VecDeque<HolisticLandmarks>,
}

impl ScriptedExtractor {
    pub fn new(script: Vec<HolisticLandmarks>) -> Self {
        Self {
            script: script.into(),
        }
    }
}

impl LandmarkExtractor for ScriptedExtractor {
    fn extract(&mut self, _image: &RgbImage) -> Result<HolisticLandmarks> {
        self.script
            .pop_front()
            .ok_or_else(|| anyhow!("extractor script exhausted"))
    }
}
