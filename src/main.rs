//! Student Dropout Prediction API
//!
//! Serves a trained outcome classifier over HTTP.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                  DROPOUT PREDICTION API                      │
//! ├──────────────────────────────────────────────────────────────┤
//! │  POST /predict                                               │
//! │     │                                                        │
//! │     ▼                                                        │
//! │  ┌───────────┐   ┌────────────┐   ┌──────────┐   ┌─────────┐ │
//! │  │ Vectorize │──▶│ Classifier │──▶│ Annotate │──▶│ Respond │ │
//! │  │ (schema)  │   │ (JSON file)│   │ (rules)  │   │ (JSON)  │ │
//! │  └───────────┘   └────────────┘   └──────────┘   └─────────┘ │
//! └──────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod inference;
mod models;
mod pipeline;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};

use pipeline::Predictor;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    init_logging(&config);

    tracing::info!("Student Dropout Prediction API starting...");
    tracing::info!("Environment: {}", config.environment);

    // Load model; a missing or broken file leaves the service degraded
    let predictor = Predictor::from_path(&config.model_path);
    if let Some(info) = predictor.model_info() {
        tracing::info!("Model: {} from {} ({} features)", info.model_type, info.path, info.n_features);
    } else {
        tracing::warn!("{}", "=".repeat(60));
        tracing::warn!("WARNING: Model file not found or invalid!");
        tracing::warn!("Please ensure '{}' exists", config.model_path.display());
        tracing::warn!("/predict will fail until the service is restarted with a model");
        tracing::warn!("{}", "=".repeat(60));
    }

    // Build application state
    let state = AppState {
        predictor: Arc::new(predictor),
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("🚀 Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_logging(config: &config::Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "dropout_predictor=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<Predictor>,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    if state.config.is_production() {
        tracing::warn!("CORS allows any origin and there is no authentication");
    }

    Router::new()
        .route("/", get(handlers::health::home))
        .route("/health", get(handlers::health::check))
        .route("/model", get(handlers::model::info))
        .route("/predict", post(handlers::predict::predict))
        .route("/v2/predict", post(handlers::predict::predict_v2))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
