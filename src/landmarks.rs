// src/landmarks.rs
//
// Landmark groups as produced by the holistic extractor, and their
// flattening into the fixed-length feature vector the classifier was
// trained on. Order is pose → face → left hand → right hand; absent
// groups are zero-filled.

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

// ============================================================================
// LAYOUT
// ============================================================================

pub const POSE_POINTS: usize = 33;
pub const FACE_POINTS: usize = 468;
pub const HAND_POINTS: usize = 21;

/// x, y, z, visibility
pub const POSE_VALUES: usize = POSE_POINTS * 4;
/// x, y, z
pub const FACE_VALUES: usize = FACE_POINTS * 3;
pub const HAND_VALUES: usize = HAND_POINTS * 3;

pub const FEATURE_LEN: usize = POSE_VALUES + FACE_VALUES + 2 * HAND_VALUES;

// ============================================================================
// EXTRACTOR OUTPUT
// ============================================================================

/// One frame's detected landmarks. Every group is optional; `None` means
/// the extractor found nothing for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HolisticLandmarks {
    #[serde(default)]
    pub pose: Option<Vec<[f32; 4]>>,
    #[serde(default)]
    pub face: Option<Vec<[f32; 3]>>,
    #[serde(default)]
    pub left_hand: Option<Vec<[f32; 3]>>,
    #[serde(default)]
    pub right_hand: Option<Vec<[f32; 3]>>,
}

impl HolisticLandmarks {
    pub fn has_hands(&self) -> bool {
        self.left_hand.is_some() || self.right_hand.is_some()
    }
}

// ============================================================================
// FEATURE VECTOR
// ============================================================================

/// Immutable per-frame feature vector.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f32>,
}

impl FeatureVector {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// Flatten landmark groups, zero-filling the missing ones.
    ///
    /// A present group with an unexpected point count is an extractor
    /// contract violation and is reported as an error.
    pub fn from_landmarks(landmarks: &HolisticLandmarks) -> Result<Self> {
        let mut values = Vec::with_capacity(FEATURE_LEN);

        append_group(&mut values, "pose", landmarks.pose.as_deref(), POSE_POINTS)?;
        append_group(&mut values, "face", landmarks.face.as_deref(), FACE_POINTS)?;
        append_group(
            &mut values,
            "left_hand",
            landmarks.left_hand.as_deref(),
            HAND_POINTS,
        )?;
        append_group(
            &mut values,
            "right_hand",
            landmarks.right_hand.as_deref(),
            HAND_POINTS,
        )?;

        Ok(Self { values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn nonzero_count(&self) -> usize {
        self.values.iter().filter(|v| **v != 0.0).count()
    }

    /// Mean absolute element-wise difference. Vectors of different length
    /// compare over their common prefix.
    pub fn mean_abs_diff(&self, other: &FeatureVector) -> f32 {
        let n = self.values.len().min(other.values.len());
        if n == 0 {
            return 0.0;
        }

        let sum: f32 = self
            .values
            .iter()
            .zip(&other.values)
            .map(|(a, b)| (a - b).abs())
            .sum();
        sum / n as f32
    }

    /// (mean, standard deviation) for debug logging
    pub fn stats(&self) -> (f32, f32) {
        if self.values.is_empty() {
            return (0.0, 0.0);
        }

        let n = self.values.len() as f32;
        let mean = self.values.iter().sum::<f32>() / n;
        let variance = self
            .values
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f32>()
            / n;
        (mean, variance.sqrt())
    }
}

fn append_group<const D: usize>(
    values: &mut Vec<f32>,
    name: &str,
    group: Option<&[[f32; D]]>,
    expected_points: usize,
) -> Result<()> {
    match group {
        Some(points) => {
            ensure!(
                points.len() == expected_points,
                "{} landmarks: expected {} points, got {}",
                name,
                expected_points,
                points.len()
            );
            for point in points {
                values.extend_from_slice(point);
            }
        }
        None => values.resize(values.len() + expected_points * D, 0.0),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand(value: f32) -> Vec<[f32; 3]> {
        vec![[value; 3]; HAND_POINTS]
    }

    #[test]
    fn test_feature_len_matches_reference_layout() {
        assert_eq!(FEATURE_LEN, 1662);
    }

    #[test]
    fn test_missing_groups_are_zero_filled() {
        let landmarks = HolisticLandmarks {
            right_hand: Some(hand(0.5)),
            ..Default::default()
        };

        let features = FeatureVector::from_landmarks(&landmarks).unwrap();
        assert_eq!(features.len(), FEATURE_LEN);
        assert_eq!(features.nonzero_count(), HAND_VALUES);

        // Right hand occupies the tail
        let tail = &features.as_slice()[FEATURE_LEN - HAND_VALUES..];
        assert!(tail.iter().all(|v| *v == 0.5));
    }

    #[test]
    fn test_group_order_is_pose_face_left_right() {
        let landmarks = HolisticLandmarks {
            pose: Some(vec![[1.0; 4]; POSE_POINTS]),
            face: Some(vec![[2.0; 3]; FACE_POINTS]),
            left_hand: Some(hand(3.0)),
            right_hand: Some(hand(4.0)),
        };

        let features = FeatureVector::from_landmarks(&landmarks).unwrap();
        let values = features.as_slice();
        assert_eq!(values[0], 1.0);
        assert_eq!(values[POSE_VALUES], 2.0);
        assert_eq!(values[POSE_VALUES + FACE_VALUES], 3.0);
        assert_eq!(values[FEATURE_LEN - 1], 4.0);
    }

    #[test]
    fn test_wrong_point_count_is_rejected() {
        let landmarks = HolisticLandmarks {
            left_hand: Some(vec![[0.1; 3]; 20]),
            ..Default::default()
        };
        assert!(FeatureVector::from_landmarks(&landmarks).is_err());
    }

    #[test]
    fn test_has_hands() {
        assert!(!HolisticLandmarks::default().has_hands());

        let landmarks = HolisticLandmarks {
            left_hand: Some(hand(0.0)),
            ..Default::default()
        };
        assert!(landmarks.has_hands());
    }

    #[test]
    fn test_mean_abs_diff() {
        let a = FeatureVector::new(vec![0.0, 1.0, 2.0, 3.0]);
        let b = FeatureVector::new(vec![1.0, 1.0, 2.0, 1.0]);
        assert!((a.mean_abs_diff(&b) - 0.75).abs() < 1e-6);
        assert_eq!(a.mean_abs_diff(&a), 0.0);
    }

    #[test]
    fn test_deserializes_null_groups() {
        let json = r#"{"pose": null, "face": null, "left_hand": null}"#;
        let landmarks: HolisticLandmarks = serde_json::from_str(json).unwrap();
        assert_eq!(landmarks, HolisticLandmarks::default());
    }
}
