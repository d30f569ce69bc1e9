// src/stabilization/motion_gate.rs

use crate::landmarks::FeatureVector;

/// Rejects frames that are near-duplicates of the last retained frame.
#[derive(Debug, Clone, Copy)]
pub struct MotionGate {
    threshold: f32,
}

impl MotionGate {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    /// True when the candidate should be dropped as static. An empty
    /// window always admits.
    pub fn is_static(&self, last: Option<&FeatureVector>, candidate: &FeatureVector) -> bool {
        match last {
            Some(last) => last.mean_abs_diff(candidate) < self.threshold,
            None => false,
        }
    }
}
