// src/pipeline/worker.rs
//
// Owns the engine on a dedicated thread and processes commands strictly in
// arrival order. Every frame step and every reset runs to completion before
// the next command is taken, so concurrent HTTP requests never interleave
// inside a frame.

use super::engine::StabilizationEngine;
use super::response::FrameResponse;
use crate::error::FrameError;
use anyhow::{anyhow, Context, Result};
use std::thread::JoinHandle;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

enum EngineCommand {
    Submit {
        /// Base64 image as received from the client, if any
        image: Option<String>,
        reply: oneshot::Sender<Result<FrameResponse, FrameError>>,
    },
    Reset {
        reply: oneshot::Sender<()>,
    },
}

/// Cloneable handle to the engine worker.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    /// Move `engine` onto a new worker thread. The thread exits once every
    /// handle has been dropped.
    pub fn spawn(
        engine: StabilizationEngine,
        queue_depth: usize,
    ) -> Result<(Self, JoinHandle<()>)> {
        let (tx, rx) = mpsc::channel(queue_depth.max(1));

        let join = std::thread::Builder::new()
            .name("stabilizer-worker".to_string())
            .spawn(move || run(engine, rx))
            .context("Failed to spawn stabilizer worker thread")?;

        Ok((Self { tx }, join))
    }

    pub async fn submit(&self, image: Option<String>) -> Result<FrameResponse, FrameError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(EngineCommand::Submit { image, reply })
            .await
            .map_err(|_| worker_gone())?;

        response.await.map_err(|_| worker_gone())?
    }

    pub async fn reset(&self) -> Result<(), FrameError> {
        let (reply, done) = oneshot::channel();
        self.tx
            .send(EngineCommand::Reset { reply })
            .await
            .map_err(|_| worker_gone())?;

        done.await.map_err(|_| worker_gone())
    }
}

fn worker_gone() -> FrameError {
    FrameError::Internal(anyhow!("Stabilizer worker is not running"))
}

fn run(mut engine: StabilizationEngine, mut rx: mpsc::Receiver<EngineCommand>) {
    info!("Stabilizer worker started");

    while let Some(command) = rx.blocking_recv() {
        match command {
            EngineCommand::Submit { image, reply } => {
                let result = engine.submit_image(image.as_deref());
                if reply.send(result).is_err() {
                    debug!("Frame caller went away before the response was ready");
                }
            }
            EngineCommand::Reset { reply } => {
                engine.reset();
                if reply.send(()).is_err() {
                    warn!("Reset caller went away before acknowledgement");
                }
            }
        }
    }

    info!("Stabilizer worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::HolisticLandmarks;
    use crate::pipeline::response::FrameStatus;
    use crate::pipeline::test_support::{
        encode_png, hand_frame, ScriptedClassifier, ScriptedExtractor,
    };
    use crate::types::StabilizerConfig;
    use base64::Engine;

    fn png_base64() -> String {
        base64::engine::general_purpose::STANDARD.encode(encode_png())
    }

    fn spawn_with(extractions: Vec<HolisticLandmarks>) -> (EngineHandle, JoinHandle<()>) {
        let engine = StabilizationEngine::new(
            StabilizerConfig::default(),
            vec!["hello".into(), "thanks".into(), "iloveyou".into()],
            Box::new(ScriptedExtractor::new(extractions)),
            Box::new(ScriptedClassifier::new(vec![vec![0.1, 0.1, 0.8]])),
        );
        EngineHandle::spawn(engine, 4).unwrap()
    }

    #[tokio::test]
    async fn test_frames_are_processed_in_order() {
        let (handle, join) = spawn_with((0..10).map(hand_frame).collect());
        let png = png_base64();

        let mut last = None;
        for i in 0..10 {
            let response = handle.submit(Some(png.clone())).await.unwrap();
            if i < 9 {
                assert_eq!(
                    response.status,
                    FrameStatus::Collecting {
                        progress: i + 1,
                        required: 10
                    }
                );
            }
            last = Some(response);
        }

        let last = last.unwrap();
        assert_eq!(last.status, FrameStatus::Label("iloveyou".to_string()));
        assert_eq!(last.progress, 10);

        drop(handle);
        join.join().unwrap();
    }

    #[tokio::test]
    async fn test_reset_is_serialized_with_frames() {
        let (handle, join) = spawn_with(vec![hand_frame(0), hand_frame(1), hand_frame(2)]);
        let png = png_base64();

        handle.submit(Some(png.clone())).await.unwrap();
        handle.submit(Some(png.clone())).await.unwrap();
        handle.reset().await.unwrap();

        let response = handle.submit(Some(png)).await.unwrap();
        assert_eq!(
            response.status,
            FrameStatus::Collecting {
                progress: 1,
                required: 10
            }
        );

        drop(handle);
        join.join().unwrap();
    }

    #[tokio::test]
    async fn test_decode_failure_reaches_caller() {
        let (handle, join) = spawn_with(vec![]);

        let err = handle.submit(Some("nope".to_string())).await.unwrap_err();
        assert!(err.is_client_error());

        drop(handle);
        join.join().unwrap();
    }
}
