use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use reqwest::Client;
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use nutriwise::providers::GenerativeProvider;
use nutriwise::providers::gemini::GeminiProvider;
use nutriwise::resolver::resolve_active_model;

const API_KEY: &str = "test-key";
const WORKING_MODEL: &str = "gemini-1.5-pro";

#[derive(Clone, Default)]
struct MockApi {
    generate_calls: Arc<Mutex<Vec<(String, String)>>>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("x-goog-api-key")
        .and_then(|value| value.to_str().ok())
        == Some(API_KEY)
}

fn api_error(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({"error": {"code": status.as_u16(), "message": message}})),
    )
}

async fn list_models(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return api_error(StatusCode::FORBIDDEN, "API key not valid");
    }

    let page = match params.get("pageToken").map(String::as_str) {
        None => json!({
            "models": [
                {"name": "models/gemini-1.5-flash", "supportedGenerationMethods": ["generateContent", "countTokens"]},
                {"name": "models/text-embedding-004", "supportedGenerationMethods": ["embedContent"]}
            ],
            "nextPageToken": "page-2"
        }),
        Some("page-2") => json!({
            "models": [
                {"name": "models/gemini-1.5-pro", "supportedGenerationMethods": ["generateContent"]}
            ]
        }),
        Some(_) => return api_error(StatusCode::BAD_REQUEST, "bad page token"),
    };
    (StatusCode::OK, Json(page))
}

async fn generate_content(
    State(api): State<MockApi>,
    Path(action): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return api_error(StatusCode::FORBIDDEN, "API key not valid");
    }

    let Some(model) = action.strip_suffix(":generateContent") else {
        return api_error(StatusCode::NOT_FOUND, "unknown method");
    };
    let prompt = body["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    api.generate_calls
        .lock()
        .expect("lock should not be poisoned")
        .push((model.to_string(), prompt.clone()));

    if model != WORKING_MODEL {
        return api_error(
            StatusCode::NOT_FOUND,
            &format!("models/{model} is not found for API version v1beta"),
        );
    }

    (
        StatusCode::OK,
        Json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "echo: "}, {"text": prompt}]},
                "finishReason": "STOP"
            }]
        })),
    )
}

async fn spawn_mock_api() -> (String, MockApi) {
    let api = MockApi::default();
    let app = Router::new()
        .route("/v1beta/models", get(list_models))
        .route("/v1beta/models/:action", post(generate_content))
        .with_state(api.clone());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind should succeed");
    let addr = listener.local_addr().expect("address should be available");
    tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("mock server should run");
    });

    (format!("http://{addr}/v1beta/"), api)
}

fn provider(base_url: &str, api_key: &str) -> GeminiProvider {
    GeminiProvider::new(
        Client::new(),
        SecretString::new(api_key.to_string()),
        base_url,
        5,
    )
}

#[tokio::test]
async fn list_models_follows_every_page() {
    let (base_url, _) = spawn_mock_api().await;

    let models = provider(&base_url, API_KEY)
        .list_models()
        .await
        .expect("listing should succeed");

    let names: Vec<&str> = models.iter().map(|model| model.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "models/gemini-1.5-flash",
            "models/text-embedding-004",
            "models/gemini-1.5-pro"
        ]
    );
    assert_eq!(
        models
            .iter()
            .filter(|model| model.supports_text_generation())
            .count(),
        2
    );
}

#[tokio::test]
async fn list_models_surfaces_authentication_failure() {
    let (base_url, _) = spawn_mock_api().await;

    let err = provider(&base_url, "wrong-key")
        .list_models()
        .await
        .expect_err("listing should fail with a bad key");

    let msg = format!("{err:#}");
    assert!(msg.contains("403"), "unexpected message: {msg}");
    assert!(msg.contains("API key not valid"), "unexpected message: {msg}");
    assert!(!msg.contains("wrong-key"), "api key leaked: {msg}");
}

#[tokio::test]
async fn generate_accepts_bare_and_prefixed_model_ids() {
    let (base_url, api) = spawn_mock_api().await;
    let gemini = provider(&base_url, API_KEY);

    let bare = gemini
        .generate("gemini-1.5-pro", "Hello")
        .await
        .expect("bare id should work");
    let prefixed = gemini
        .generate("models/gemini-1.5-pro", "Hello")
        .await
        .expect("prefixed id should work");

    assert_eq!(bare, "echo: Hello");
    assert_eq!(prefixed, bare);
    assert_eq!(
        api.generate_calls
            .lock()
            .expect("lock should not be poisoned")
            .len(),
        2
    );
}

#[tokio::test]
async fn generate_reports_unknown_model() {
    let (base_url, _) = spawn_mock_api().await;

    let err = provider(&base_url, API_KEY)
        .generate("gemini-1.0-pro", "Hello")
        .await
        .expect_err("unknown model should fail");

    let msg = format!("{err:#}");
    assert!(msg.contains("404"), "unexpected message: {msg}");
    assert!(msg.contains("is not found"), "unexpected message: {msg}");
}

#[tokio::test]
async fn resolver_falls_back_to_first_model_that_answers() {
    let (base_url, api) = spawn_mock_api().await;
    let gemini: Arc<dyn GenerativeProvider> = Arc::new(provider(&base_url, API_KEY));
    let candidates = vec![
        "gemini-1.5-flash".to_string(),
        "gemini-1.5-pro".to_string(),
        "gemini-1.0-pro".to_string(),
    ];

    let handle = resolve_active_model(gemini, &candidates)
        .await
        .expect("a working model should be found");

    assert_eq!(handle.model(), "gemini-1.5-pro");
    let calls = api
        .generate_calls
        .lock()
        .expect("lock should not be poisoned")
        .clone();
    assert_eq!(
        calls,
        [
            ("gemini-1.5-flash".to_string(), "Hello".to_string()),
            ("gemini-1.5-pro".to_string(), "Hello".to_string()),
        ]
    );
}

#[tokio::test]
async fn resolver_gives_up_when_authentication_fails() {
    let (base_url, api) = spawn_mock_api().await;
    let gemini: Arc<dyn GenerativeProvider> = Arc::new(provider(&base_url, "wrong-key"));

    let handle = resolve_active_model(gemini, &["gemini-1.5-pro".to_string()]).await;

    assert!(handle.is_none());
    assert!(
        api.generate_calls
            .lock()
            .expect("lock should not be poisoned")
            .is_empty()
    );
}
