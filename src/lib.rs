pub mod ask;
pub mod config;
pub mod logging;
pub mod model;
pub mod prompt;
pub mod providers;
pub mod resolver;
pub mod server;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::{info, warn};

use config::Config;
use server::AppState;

pub async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init();

    let cfg = Config::from_env();
    info!(
        provider = %cfg.model_provider,
        api_key_present = cfg.api_key_present(),
        candidates = ?cfg.model_candidates,
        model_timeout_secs = cfg.model_timeout_secs,
        bind_addr = %cfg.bind_addr(),
        "loaded runtime configuration"
    );

    let client = Client::builder()
        .build()
        .context("Failed to initialize HTTP client")?;

    let model = match model::connect(&client, &cfg) {
        Ok(provider) => resolver::resolve_active_model(provider, &cfg.model_candidates).await,
        Err(err) => {
            warn!(error = %err, "model provider unavailable; skipping model resolution");
            None
        }
    };

    let state = AppState::new(model, cfg.api_key_present());
    server::serve(&cfg, state).await
}
