use secrecy::{ExposeSecret, SecretString};
use std::env;

const DEFAULT_MODEL_PROVIDER: &str = "gemini";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL_CANDIDATES: &[&str] = &[
    "gemini-1.5-flash",
    "gemini-1.5-pro",
    "gemini-1.0-pro",
    "models/gemini-1.5-flash",
    "models/gemini-1.5-pro",
    "models/gemini-1.0-pro",
];
const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 60;
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Clone)]
pub struct Config {
    pub model_provider: String,
    pub gemini_api_key: Option<SecretString>,
    pub gemini_base_url: String,
    pub model_candidates: Vec<String>,
    pub model_timeout_secs: u64,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_env_with(|key| env::var(key).ok())
    }

    pub(crate) fn from_env_with(mut get_var: impl FnMut(&str) -> Option<String>) -> Self {
        let gemini_api_key = get_var("GEMINI_API_KEY")
            .filter(|value| !value.is_empty())
            .map(SecretString::new);

        Self {
            model_provider: parse_non_empty(get_var("MODEL_PROVIDER").as_deref())
                .unwrap_or_else(|| DEFAULT_MODEL_PROVIDER.to_string()),
            gemini_api_key,
            gemini_base_url: parse_non_empty(get_var("GEMINI_BASE_URL").as_deref())
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            model_candidates: parse_model_candidates(
                get_var("GEMINI_MODEL_CANDIDATES").as_deref(),
            ),
            model_timeout_secs: parse_positive_u64(
                get_var("MODEL_TIMEOUT_SECS").as_deref(),
                DEFAULT_MODEL_TIMEOUT_SECS,
            ),
            host: parse_non_empty(get_var("HOST").as_deref())
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_port(get_var("PORT").as_deref()),
        }
    }

    pub fn api_key_present(&self) -> bool {
        self.gemini_api_key
            .as_ref()
            .is_some_and(|key| !key.expose_secret().is_empty())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_non_empty(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn parse_positive_u64(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

fn parse_port(raw: Option<&str>) -> u16 {
    raw.and_then(|value| value.trim().parse::<u16>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_PORT)
}

fn parse_model_candidates(raw: Option<&str>) -> Vec<String> {
    let parsed: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect();

    if parsed.is_empty() {
        DEFAULT_MODEL_CANDIDATES
            .iter()
            .map(|value| (*value).to_string())
            .collect()
    } else {
        parsed
    }
}
