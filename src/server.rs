use anyhow::{Context, Result};
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::ask::ask;
use crate::config::Config;
use crate::model::ModelHandle;

/// Request-time view of what startup resolved. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct AppState {
    model: Option<ModelHandle>,
    api_key_present: bool,
}

impl AppState {
    pub fn new(model: Option<ModelHandle>, api_key_present: bool) -> Self {
        Self {
            model,
            api_key_present,
        }
    }

    pub fn model(&self) -> Option<&ModelHandle> {
        self.model.as_ref()
    }

    pub fn is_configured(&self) -> bool {
        self.model.is_some()
    }
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub gemini_configured: bool,
    pub api_key_present: bool,
}

/// Liveness only: always 200, with the resolver outcome reported in the body.
pub async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "healthy",
        gemini_configured: state.is_configured(),
        api_key_present: state.api_key_present,
    })
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/ask", post(ask))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(cfg: &Config, state: AppState) -> Result<()> {
    let bind_addr = cfg.bind_addr();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind HTTP listener to {bind_addr}"))?;
    let local_addr = listener
        .local_addr()
        .context("Failed to read bound listener address")?;

    if !state.is_configured() {
        warn!("serving without a model; /ask will fail until the service is restarted");
    }
    info!(addr = %local_addr, "listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
