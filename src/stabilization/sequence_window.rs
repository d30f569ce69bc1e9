// src/stabilization/sequence_window.rs
//
// Bounded window of retained feature vectors, oldest first. The classifier
// always sees exactly `capacity` frames: while the window is still short
// the oldest entry is repeated at the front. Readiness starts well before
// the window is full, so early classifications run on mostly duplicated
// history.

use crate::landmarks::FeatureVector;
use std::collections::VecDeque;

pub struct SequenceWindow {
    frames: VecDeque<FeatureVector>,
    capacity: usize,
    min_ready: usize,
    overlap: usize,
}

impl SequenceWindow {
    pub fn new(capacity: usize, min_ready: usize, overlap: usize) -> Self {
        Self {
            frames: VecDeque::with_capacity(capacity + 1),
            capacity,
            min_ready,
            overlap,
        }
    }

    /// Push to the back, evicting from the front past capacity.
    pub fn append(&mut self, frame: FeatureVector) {
        self.frames.push_back(frame);
        while self.frames.len() > self.capacity {
            self.frames.pop_front();
        }
    }

    /// Length the window would have after appending one more frame.
    pub fn len_after_append(&self) -> usize {
        (self.frames.len() + 1).min(self.capacity)
    }

    pub fn is_ready_after_append(&self) -> bool {
        self.len_after_append() >= self.min_ready
    }

    /// Classifier input as it would be after appending `candidate`, without
    /// touching the window. Used to stage a frame until the classifier
    /// call has succeeded.
    pub fn build_classifier_input_with<'a>(
        &'a self,
        candidate: &'a FeatureVector,
    ) -> Vec<&'a FeatureVector> {
        let frames = self
            .frames
            .iter()
            .chain(std::iter::once(candidate))
            .collect();
        pad_to(frames, self.capacity)
    }

    /// Keep only the most recent `overlap` entries.
    pub fn shrink_after_predict(&mut self) {
        let excess = self.frames.len().saturating_sub(self.overlap);
        self.frames.drain(..excess);
    }

    pub fn last(&self) -> Option<&FeatureVector> {
        self.frames.back()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

/// Keep the newest `len` frames, left-padding with the oldest one.
fn pad_to(mut frames: Vec<&FeatureVector>, len: usize) -> Vec<&FeatureVector> {
    if frames.len() > len {
        frames.drain(..frames.len() - len);
    }

    let Some(&oldest) = frames.first() else {
        return frames;
    };

    let missing = len - frames.len();
    if missing == 0 {
        return frames;
    }

    let mut padded = Vec::with_capacity(len);
    padded.extend(std::iter::repeat(oldest).take(missing));
    padded.extend(frames);
    padded
}
