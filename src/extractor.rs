// src/extractor.rs
//
// Landmark extraction boundary. The holistic landmark model runs outside
// this process; the engine only depends on the LandmarkExtractor contract.
// SidecarExtractor talks to a landmark service over HTTP: the decoded frame
// is re-encoded as JPEG, sent as base64, and the service answers with the
// landmark groups (null for groups it did not detect).

use crate::landmarks::HolisticLandmarks;
use crate::types::ExtractorConfig;
use anyhow::{Context, Result};
use base64::Engine;
use image::RgbImage;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

pub trait LandmarkExtractor {
    fn extract(&mut self, image: &RgbImage) -> Result<HolisticLandmarks>;
}

#[derive(Debug, Serialize)]
struct ExtractionRequest {
    image: String,
    width: u32,
    height: u32,
}

pub struct SidecarExtractor {
    http_client: reqwest::blocking::Client,
    url: String,
    jpeg_quality: u8,
}

impl SidecarExtractor {
    pub fn new(config: &ExtractorConfig) -> Result<Self> {
        let http_client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http_client,
            url: config.url.clone(),
            jpeg_quality: config.jpeg_quality,
        })
    }
}

impl LandmarkExtractor for SidecarExtractor {
    fn extract(&mut self, image: &RgbImage) -> Result<HolisticLandmarks> {
        let jpeg = encode_jpeg(image, self.jpeg_quality)?;
        let request = ExtractionRequest {
            image: base64::engine::general_purpose::STANDARD.encode(&jpeg),
            width: image.width(),
            height: image.height(),
        };

        let response = self
            .http_client
            .post(&self.url)
            .json(&request)
            .send()
            .with_context(|| format!("Landmark service unreachable at {}", self.url))?
            .error_for_status()
            .context("Landmark service returned an error status")?;

        let landmarks: HolisticLandmarks = response
            .json()
            .context("Landmark service returned malformed landmarks")?;

        debug!(
            pose = landmarks.pose.is_some(),
            face = landmarks.face.is_some(),
            left_hand = landmarks.left_hand.is_some(),
            right_hand = landmarks.right_hand.is_some(),
            "Landmarks extracted"
        );

        Ok(landmarks)
    }
}

fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality);
    image
        .write_with_encoder(encoder)
        .context("Failed to encode frame as JPEG")?;
    Ok(buf)
}
