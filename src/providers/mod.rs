//! Generative-language backends.
//!
//! The service only needs three things from a provider: list the models it
//! advertises, name one of them, and generate text from a prompt with it.
//! Naming a model is [`crate::model::ModelHandle::new`]; the other two live on
//! [`GenerativeProvider`].

pub mod gemini;
pub(crate) mod http_errors;

use anyhow::Result;
use std::future::Future;
use std::pin::Pin;

/// Generation method a model must advertise to be usable for free-text answers.
pub const TEXT_GENERATION_METHOD: &str = "generateContent";

pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    pub name: String,
    pub supported_generation_methods: Vec<String>,
}

impl ModelInfo {
    pub fn supports_text_generation(&self) -> bool {
        self.supported_generation_methods
            .iter()
            .any(|method| method == TEXT_GENERATION_METHOD)
    }
}

pub trait GenerativeProvider: Send + Sync {
    fn list_models(&self) -> ProviderFuture<'_, Vec<ModelInfo>>;

    fn generate<'a>(&'a self, model: &'a str, prompt: &'a str) -> ProviderFuture<'a, String>;
}
