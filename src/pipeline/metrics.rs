// src/pipeline/metrics.rs
//
// Process-level counters. Cloned into the HTTP state so health can report
// them without going through the engine worker.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct PipelineMetrics {
    pub frames_submitted: Arc<AtomicU64>,
    pub frames_accepted: Arc<AtomicU64>,
    pub frames_while_locked: Arc<AtomicU64>,
    pub no_hands_frames: Arc<AtomicU64>,
    pub insufficient_frames: Arc<AtomicU64>,
    pub static_frames: Arc<AtomicU64>,
    pub classifier_calls: Arc<AtomicU64>,
    pub internal_failures: Arc<AtomicU64>,
    pub locks: Arc<AtomicU64>,
    pub resets: Arc<AtomicU64>,
    pub inference_time_us: Arc<AtomicU64>,
    pub started_at: Instant,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            frames_submitted: Arc::new(AtomicU64::new(0)),
            frames_accepted: Arc::new(AtomicU64::new(0)),
            frames_while_locked: Arc::new(AtomicU64::new(0)),
            no_hands_frames: Arc::new(AtomicU64::new(0)),
            insufficient_frames: Arc::new(AtomicU64::new(0)),
            static_frames: Arc::new(AtomicU64::new(0)),
            classifier_calls: Arc::new(AtomicU64::new(0)),
            internal_failures: Arc::new(AtomicU64::new(0)),
            locks: Arc::new(AtomicU64::new(0)),
            resets: Arc::new(AtomicU64::new(0)),
            inference_time_us: Arc::new(AtomicU64::new(0)),
            started_at: Instant::now(),
        }
    }

    pub fn inc(&self, counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_timing(&self, counter: &AtomicU64, duration_us: u64) {
        counter.store(duration_us, Ordering::Relaxed);
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            frames_submitted: self.frames_submitted.load(Ordering::Relaxed),
            frames_accepted: self.frames_accepted.load(Ordering::Relaxed),
            frames_while_locked: self.frames_while_locked.load(Ordering::Relaxed),
            no_hands_frames: self.no_hands_frames.load(Ordering::Relaxed),
            insufficient_frames: self.insufficient_frames.load(Ordering::Relaxed),
            static_frames: self.static_frames.load(Ordering::Relaxed),
            classifier_calls: self.classifier_calls.load(Ordering::Relaxed),
            internal_failures: self.internal_failures.load(Ordering::Relaxed),
            locks: self.locks.load(Ordering::Relaxed),
            resets: self.resets.load(Ordering::Relaxed),
            last_inference_us: self.inference_time_us.load(Ordering::Relaxed),
            uptime_secs: self.started_at.elapsed().as_secs_f64(),
        }
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSummary {
    pub frames_submitted: u64,
    pub frames_accepted: u64,
    pub frames_while_locked: u64,
    pub no_hands_frames: u64,
    pub insufficient_frames: u64,
    pub static_frames: u64,
    pub classifier_calls: u64,
    pub internal_failures: u64,
    pub locks: u64,
    pub resets: u64,
    pub last_inference_us: u64,
    pub uptime_secs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_reflects_shared_counters() {
        let metrics = PipelineMetrics::new();
        let shared = metrics.clone();

        metrics.inc(&metrics.frames_submitted);
        metrics.inc(&metrics.frames_submitted);
        metrics.inc(&metrics.locks);
        metrics.set_timing(&metrics.inference_time_us, 1500);
        metrics.set_timing(&metrics.inference_time_us, 900);

        let summary = shared.summary();
        assert_eq!(summary.frames_submitted, 2);
        assert_eq!(summary.locks, 1);
        assert_eq!(summary.resets, 0);
        assert_eq!(summary.last_inference_us, 900);
        assert!(summary.uptime_secs >= 0.0);
    }
}
