// src/pipeline/session.rs
//
// All mutable state of one inference session. Owned by the engine and
// only ever touched from the engine's &mut methods.

use crate::inference::PredictionSample;
use crate::stabilization::{
    LockController, LockState, MajorityVote, SequenceWindow, SmoothingBuffer, StableDecision,
};
use crate::types::StabilizerConfig;

#[derive(Debug, Clone, Copy)]
pub struct SmoothingOutcome {
    pub vote: MajorityVote,
    pub newly_locked: bool,
}

pub struct Session {
    pub window: SequenceWindow,
    pub smoothing: SmoothingBuffer,
    pub lock: LockController,
    pub stable: Option<StableDecision>,
    pub frame_count: u64,
}

impl Session {
    pub fn new(config: &StabilizerConfig) -> Self {
        Self {
            window: SequenceWindow::new(
                config.sequence_len,
                config.min_seq_for_predict,
                config.overlap_after_predict,
            ),
            smoothing: SmoothingBuffer::new(config.stable_frames),
            lock: LockController::new(config.stable_frames, config.lock_threshold),
            stable: None,
            frame_count: 0,
        }
    }

    /// Smoothing step: buffer the sample, refresh the stable decision once
    /// the majority label has two or more votes, then let the lock
    /// controller see the vote.
    pub fn apply_prediction(&mut self, sample: PredictionSample) -> SmoothingOutcome {
        let vote = self.smoothing.push(sample);

        if vote.count >= 2 {
            self.stable = Some(StableDecision {
                label: vote.label,
                confidence: vote.avg_confidence,
            });
        }

        let newly_locked = self.lock.observe(&vote);
        SmoothingOutcome { vote, newly_locked }
    }

    pub fn lock_state(&self) -> LockState {
        self.lock.state()
    }

    pub fn reset(&mut self) {
        self.window.clear();
        self.smoothing.clear();
        self.lock.reset();
        self.stable = None;
        self.frame_count = 0;
    }
}
