use anyhow::{Context, Result, anyhow};
use reqwest::{Client, RequestBuilder, Response, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::providers::http_errors::provider_request_error;
use crate::providers::{GenerativeProvider, ModelInfo, ProviderFuture};

const API_KEY_HEADER: &str = "x-goog-api-key";
const LIST_PAGE_SIZE: u32 = 1000;

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

impl<'a> GenerateContentRequest<'a> {
    fn user_prompt(prompt: &'a str) -> Self {
        Self {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ApiModel>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiModel {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

/// Google Generative Language REST backend.
pub struct GeminiProvider {
    client: Client,
    api_key: SecretString,
    base_url: String,
    timeout_secs: u64,
}

impl GeminiProvider {
    pub fn new(
        client: Client,
        api_key: SecretString,
        base_url: impl Into<String>,
        timeout_secs: u64,
    ) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.into(),
            timeout_secs,
        }
    }

    fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    async fn send(&self, request: RequestBuilder, api_url: &str) -> Result<Response> {
        let response = request
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .timeout(Duration::from_secs(self.timeout_secs))
            .send()
            .await
            .map_err(|err| {
                warn!(api_url = %api_url, error = %err, "provider request failed");
                provider_request_error(err, api_url, self.timeout_secs)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let response_body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read response body>".to_string());
            warn!(
                api_url = %api_url,
                status = %status,
                response_body_len = response_body.len(),
                "provider returned non-success status"
            );
            return Err(anyhow!(
                "Provider request failed with status {}: {}",
                status,
                response_body.trim()
            ));
        }

        Ok(response)
    }

    async fn list_page(&self, page_token: Option<&str>) -> Result<ListModelsResponse> {
        let mut url = Url::parse(&format!("{}/models", self.base_url()))
            .context("Invalid GEMINI_BASE_URL")?;
        url.query_pairs_mut()
            .append_pair("pageSize", &LIST_PAGE_SIZE.to_string());
        if let Some(token) = page_token {
            url.query_pairs_mut().append_pair("pageToken", token);
        }

        let api_url = url.to_string();
        debug!(api_url = %api_url, "listing provider models");
        let response = self.send(self.client.get(url), &api_url).await?;
        response
            .json()
            .await
            .context("Failed to parse provider model list")
    }
}

impl GenerativeProvider for GeminiProvider {
    fn list_models(&self) -> ProviderFuture<'_, Vec<ModelInfo>> {
        Box::pin(async move {
            let mut models = Vec::new();
            let mut page_token: Option<String> = None;

            loop {
                let page = self.list_page(page_token.as_deref()).await?;
                models.extend(page.models.into_iter().map(|model| ModelInfo {
                    name: model.name,
                    supported_generation_methods: model.supported_generation_methods,
                }));

                match page.next_page_token.filter(|token| !token.is_empty()) {
                    Some(token) => page_token = Some(token),
                    None => break,
                }
            }

            Ok(models)
        })
    }

    fn generate<'a>(&'a self, model: &'a str, prompt: &'a str) -> ProviderFuture<'a, String> {
        Box::pin(async move {
            let api_url = format!("{}/{}:generateContent", self.base_url(), model_path(model));
            let body = GenerateContentRequest::user_prompt(prompt);
            debug!(
                api_url = %api_url,
                model = %model,
                prompt_len = prompt.len(),
                "sending generation request"
            );

            let response = self
                .send(self.client.post(&api_url).json(&body), &api_url)
                .await?;
            let parsed: GenerateContentResponse = response
                .json()
                .await
                .context("Failed to parse provider generation response")?;
            let text = extract_text(parsed)?;
            debug!(model = %model, response_len = text.len(), "received generation response");
            Ok(text)
        })
    }
}

/// Accepts both bare ids (`gemini-1.5-flash`) and resource names (`models/gemini-1.5-flash`).
fn model_path(model: &str) -> String {
    if model.starts_with("models/") || model.starts_with("tunedModels/") {
        model.to_string()
    } else {
        format!("models/{model}")
    }
}

fn extract_text(response: GenerateContentResponse) -> Result<String> {
    let block_reason = response
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason);

    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(match block_reason {
            Some(reason) => anyhow!("Prompt was blocked by the provider: {reason}"),
            None => anyhow!("Provider response contained no candidates"),
        });
    };

    let text: String = candidate
        .content
        .map(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|part| part.text)
        .collect();

    if text.is_empty() {
        return Err(match candidate.finish_reason {
            Some(reason) => anyhow!("Provider response contained no text (finish reason: {reason})"),
            None => anyhow!("Provider response contained no text"),
        });
    }

    Ok(text)
}
