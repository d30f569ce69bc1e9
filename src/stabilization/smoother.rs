// src/stabilization/smoother.rs

use crate::inference::PredictionSample;
use std::collections::VecDeque;

/// Result of a majority vote over the smoothing buffer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MajorityVote {
    pub label: usize,
    /// Number of buffered samples carrying `label`
    pub count: usize,
    /// Mean confidence of those samples only
    pub avg_confidence: f32,
}

/// Fixed-capacity ring buffer of recent classifier samples
pub struct SmoothingBuffer {
    history: VecDeque<PredictionSample>,
    capacity: usize,
}

impl SmoothingBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Insert a sample (evicting the oldest when full) and return the vote
    /// over the updated buffer.
    pub fn push(&mut self, sample: PredictionSample) -> MajorityVote {
        if self.history.len() >= self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(sample);

        self.majority()
            .unwrap_or(MajorityVote {
                label: sample.label,
                count: 1,
                avg_confidence: sample.confidence,
            })
    }

    /// Most frequent label. Ties go to the label whose first occurrence is
    /// earliest in buffer order (oldest sample first).
    pub fn majority(&self) -> Option<MajorityVote> {
        // (label, count, confidence sum) in order of first occurrence
        let mut tallies: Vec<(usize, usize, f32)> = Vec::with_capacity(self.history.len());

        for sample in &self.history {
            match tallies.iter_mut().find(|(label, _, _)| *label == sample.label) {
                Some(entry) => {
                    entry.1 += 1;
                    entry.2 += sample.confidence;
                }
                None => tallies.push((sample.label, 1, sample.confidence)),
            }
        }

        // Strictly greater keeps the earliest on ties
        let mut best: Option<(usize, usize, f32)> = None;
        for tally in tallies {
            if best.map_or(true, |(_, count, _)| tally.1 > count) {
                best = Some(tally);
            }
        }

        best.map(|(label, count, sum)| MajorityVote {
            label,
            count,
            avg_confidence: sum / count as f32,
        })
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
