//! `POST /ask`: validate, build the prompt, forward it, map the outcome.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::prompt::build_prompt;
use crate::server::AppState;

#[derive(Debug, Error)]
pub enum AskError {
    #[error("Gemini API not properly configured")]
    NotConfigured,

    #[error("Request must be JSON")]
    NotJson,

    #[error("No JSON data received")]
    EmptyPayload,

    #[error("Question field is required and cannot be empty")]
    MissingQuestion,

    #[error("{}", .0.body_text())]
    UnreadableBody(BytesRejection),

    #[error("Internal server error: {0}")]
    Provider(anyhow::Error),
}

impl AskError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotJson | Self::EmptyPayload | Self::MissingQuestion => StatusCode::BAD_REQUEST,
            Self::UnreadableBody(rejection) => rejection.status(),
            Self::NotConfigured | Self::Provider(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AskError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
}

/// Runs the request checks in order and returns the question on success.
///
/// The question is returned as sent; only the emptiness check trims it.
pub fn extract_question(headers: &HeaderMap, body: &[u8]) -> Result<String, AskError> {
    if !has_json_content_type(headers) {
        return Err(AskError::NotJson);
    }

    let payload: Value = serde_json::from_slice(body).map_err(|_| AskError::NotJson)?;
    info!(payload = %payload, "received ask payload");

    if is_empty_payload(&payload) {
        return Err(AskError::EmptyPayload);
    }

    let question = payload
        .get("question")
        .and_then(Value::as_str)
        .unwrap_or_default();
    info!(question = %question, "extracted question");

    if question.trim().is_empty() {
        return Err(AskError::MissingQuestion);
    }

    Ok(question.to_string())
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };

    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || (mime.contains('/') && mime.ends_with("+json"))
}

fn is_empty_payload(payload: &Value) -> bool {
    match payload {
        Value::Null => true,
        Value::Bool(value) => !value,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(value) => value.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(_) => false,
    }
}

pub async fn ask(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<AskResponse>, AskError> {
    let Some(model) = state.model() else {
        error!("ask rejected: no model was resolved at startup");
        return Err(AskError::NotConfigured);
    };

    let body = body.map_err(|rejection| {
        debug!(error = %rejection.body_text(), "ask request body could not be read");
        AskError::UnreadableBody(rejection)
    })?;

    let question = extract_question(&headers, &body).inspect_err(|err| {
        debug!(error = %err, "ask request failed validation");
    })?;

    let prompt = build_prompt(&question);
    info!(model = %model, prompt_len = prompt.len(), "sending request to model");

    let answer = model.generate(&prompt).await.map_err(|err| {
        error!(model = %model, error = ?err, "model generation failed");
        AskError::Provider(err)
    })?;
    info!(model = %model, answer_len = answer.len(), "model response received");

    Ok(Json(AskResponse { answer }))
}
