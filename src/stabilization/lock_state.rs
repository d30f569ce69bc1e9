// src/stabilization/lock_state.rs
//
// One-way lock: Unlocked → Locked(label, confidence). Nothing but an
// explicit reset goes back to Unlocked.

use super::smoother::MajorityVote;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LockState {
    Unlocked,
    Locked { label: usize, confidence: f32 },
}

/// Majority label backed by at least two buffered samples. Persists across
/// calls until overwritten by a newer vote or cleared by reset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StableDecision {
    pub label: usize,
    pub confidence: f32,
}

pub struct LockController {
    state: LockState,
    stable_frames: usize,
    lock_threshold: f32,
}

impl LockController {
    pub fn new(stable_frames: usize, lock_threshold: f32) -> Self {
        Self {
            state: LockState::Unlocked,
            stable_frames,
            lock_threshold,
        }
    }

    /// Feed the latest vote. Returns true when this vote caused a transition.
    ///
    /// Locks when the buffer is homogeneous (`count >= stable_frames`) and
    /// the averaged confidence reaches the lock threshold. Re-observing the
    /// already locked label is a no-op.
    pub fn observe(&mut self, vote: &MajorityVote) -> bool {
        if vote.count < self.stable_frames || vote.avg_confidence < self.lock_threshold {
            return false;
        }

        if self.locked_label() == Some(vote.label) {
            return false;
        }

        self.state = LockState::Locked {
            label: vote.label,
            confidence: vote.avg_confidence,
        };
        true
    }

    pub fn state(&self) -> LockState {
        self.state
    }

    pub fn is_locked(&self) -> bool {
        matches!(self.state, LockState::Locked { .. })
    }

    pub fn locked_label(&self) -> Option<usize> {
        match self.state {
            LockState::Locked { label, .. } => Some(label),
            LockState::Unlocked => None,
        }
    }

    pub fn reset(&mut self) {
        self.state = LockState::Unlocked;
    }
}
