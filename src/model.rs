use anyhow::{Result, anyhow};
use reqwest::Client;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::Config;
use crate::providers::GenerativeProvider;
use crate::providers::gemini::GeminiProvider;

/// A provider paired with one model id. Cloning shares the provider.
#[derive(Clone)]
pub struct ModelHandle {
    provider: Arc<dyn GenerativeProvider>,
    model: String,
}

impl ModelHandle {
    pub fn new(provider: Arc<dyn GenerativeProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn generate(&self, prompt: &str) -> Result<String> {
        debug!(
            model = %self.model,
            prompt_len = prompt.len(),
            "dispatching generation request"
        );
        self.provider.generate(&self.model, prompt).await
    }
}

impl fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelHandle")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.model)
    }
}

/// Builds the backend named by `MODEL_PROVIDER`.
pub fn connect(client: &Client, cfg: &Config) -> Result<Arc<dyn GenerativeProvider>> {
    let provider = cfg.model_provider.to_ascii_lowercase();

    match provider.as_str() {
        "gemini" => {
            let api_key = cfg
                .gemini_api_key
                .clone()
                .ok_or_else(|| anyhow!("GEMINI_API_KEY is not set"))?;
            debug!(
                provider = "gemini",
                base_url = %cfg.gemini_base_url,
                "connecting model provider"
            );
            Ok(Arc::new(GeminiProvider::new(
                client.clone(),
                api_key,
                cfg.gemini_base_url.clone(),
                cfg.model_timeout_secs,
            )))
        }
        other => {
            warn!(provider = %other, "unsupported model provider configured");
            Err(anyhow!(
                "Unsupported MODEL_PROVIDER='{}'. Supported providers: gemini.",
                other
            ))
        }
    }
}
