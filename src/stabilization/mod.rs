// src/stabilization/mod.rs
//
// Building blocks of the stabilization engine.
//
// Signal flow per accepted frame:
//   FeatureVector → motion_gate → sequence_window → (classifier)
//                 → smoother (majority vote) → lock_state

mod lock_state;
mod motion_gate;
mod sequence_window;
mod smoother;

pub use lock_state::{LockController, LockState, StableDecision};
pub use motion_gate::MotionGate;
pub use sequence_window::SequenceWindow;
pub use smoother::{MajorityVote, SmoothingBuffer};
