//! Startup model selection.
//!
//! Candidates are probed one at a time, in order, and the first one that
//! answers becomes the active model for the rest of the process. Nothing here
//! is retried later; a restart is the only way to resolve again.

use anyhow::Result;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};

use crate::model::ModelHandle;
use crate::providers::GenerativeProvider;

/// Prompt sent to each candidate to check that it actually answers.
pub const PROBE_PROMPT: &str = "Hello";

/// Returns the first candidate for which `probe` succeeds.
pub async fn resolve<H, F, Fut>(candidates: impl IntoIterator<Item = H>, mut probe: F) -> Option<H>
where
    H: Display,
    F: FnMut(&H) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    for candidate in candidates {
        info!(candidate = %candidate, "trying model");
        match probe(&candidate).await {
            Ok(()) => {
                info!(candidate = %candidate, "using model");
                return Some(candidate);
            }
            Err(err) => {
                let error = format!("{err:#}");
                warn!(candidate = %candidate, error = %error, "model probe failed");
            }
        }
    }

    None
}

/// Lists the provider's models for diagnostics, then probes `candidates`.
///
/// A failed listing is treated as an authentication failure and skips probing.
pub async fn resolve_active_model(
    provider: Arc<dyn GenerativeProvider>,
    candidates: &[String],
) -> Option<ModelHandle> {
    let available: Vec<String> = match provider.list_models().await {
        Ok(models) => models
            .into_iter()
            .filter(|model| model.supports_text_generation())
            .map(|model| model.name)
            .collect(),
        Err(err) => {
            let error = format!("{err:#}");
            warn!(error = %error, "provider setup failed; could not list models");
            return None;
        }
    };
    info!(count = available.len(), models = ?available, "available text generation models");

    let handles = candidates
        .iter()
        .map(|id| ModelHandle::new(Arc::clone(&provider), id.clone()));
    let resolved = resolve(handles, |handle| {
        let handle = handle.clone();
        async move { handle.generate(PROBE_PROMPT).await.map(drop) }
    })
    .await;

    if resolved.is_none() {
        warn!(
            candidates = ?candidates,
            available = ?available,
            "no working model found"
        );
    }

    resolved
}
