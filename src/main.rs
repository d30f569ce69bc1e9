// src/main.rs

use anyhow::{Context, Result};
use gesture_stabilizer::extractor::SidecarExtractor;
use gesture_stabilizer::inference::OnnxClassifier;
use gesture_stabilizer::web_api::{create_router, AppState};
use gesture_stabilizer::{Config, EngineHandle, StabilizationEngine};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    let config_path =
        std::env::var("GESTURE_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());
    let config = Config::load(&config_path)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "gesture_stabilizer={},ort=warn,tower_http=info",
                    config.logging.level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🤟 Gesture Stabilizer v{} starting", env!("CARGO_PKG_VERSION"));
    info!("✓ Configuration loaded from {}", config_path);

    let stabilizer = &config.stabilizer;
    info!(
        "Stabilizer: seq_len={}, min_seq={}, overlap={}, stable_frames={}, detect={:.2}, lock={:.2}, freeze_on_lock={}",
        stabilizer.sequence_len,
        stabilizer.min_seq_for_predict,
        stabilizer.overlap_after_predict,
        stabilizer.stable_frames,
        stabilizer.detect_threshold,
        stabilizer.lock_threshold,
        stabilizer.freeze_on_lock
    );
    info!("Actions: {:?}", config.model.labels);

    // The blocking HTTP client must be built outside the async runtime.
    let classifier =
        OnnxClassifier::new(&config.model, stabilizer.sequence_len, stabilizer.feature_len)?;
    info!("✓ Sequence classifier ready");

    let extractor = SidecarExtractor::new(&config.extractor)?;
    info!("✓ Landmark extractor at {}", config.extractor.url);

    let engine = StabilizationEngine::new(
        config.stabilizer.clone(),
        config.model.labels.clone(),
        Box::new(extractor),
        Box::new(classifier),
    );
    let info = engine.info();
    let metrics = engine.metrics().clone();

    let (handle, worker) = EngineHandle::spawn(engine, config.server.queue_depth)?;
    let state = AppState::new(handle, info, metrics);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;
    runtime.block_on(serve(&config, state))?;

    // Router (and with it the last engine handle) is gone; let the worker drain.
    drop(runtime);
    if worker.join().is_err() {
        tracing::error!("Stabilizer worker panicked");
    }

    info!("Gesture Stabilizer stopped");
    Ok(())
}

async fn serve(config: &Config, state: AppState) -> Result<()> {
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("🚀 Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
