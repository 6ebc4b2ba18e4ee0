//! AI providers: every model backend the cascade can call.
//!
//! A provider takes the analysis prompt and returns the model's raw text.
//! Parsing that text is the normalizer's job, not the provider's.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;

pub mod anthropic;
pub mod gemini;
pub mod http;
pub mod openai;

/// System prompt for providers that accept one.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error("provider quota exhausted: {0}")]
    Quota(String),

    #[error("provider access forbidden: {0}")]
    Forbidden(String),

    #[error("model or endpoint not found: {0}")]
    NotFound(String),

    #[error("provider error: {0}")]
    Unknown(String),
}

/// One AI backend in the cascade.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Human-readable name recorded in the result's provenance.
    fn name(&self) -> &str;

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// Builds the cascade's provider list in its fixed order: Gemini, OpenAI, Claude.
/// Providers without an API key are skipped.
pub fn from_config(config: &Config) -> Result<Vec<Arc<dyn Provider>>> {
    let mut providers: Vec<Arc<dyn Provider>> = Vec::new();

    match &config.gemini_api_key {
        Some(key) => providers.push(Arc::new(gemini::GeminiProvider::new(key.clone())?)),
        None => warn!("GEMINI_API_KEY is not set. Gemini analysis will not be available."),
    }
    match &config.aimlapi_key {
        Some(key) => providers.push(Arc::new(openai::OpenAiProvider::new(key.clone())?)),
        None => warn!("AIMLAPI_KEY is not set. OpenAI analysis will not be available."),
    }
    match &config.anthropic_api_key {
        Some(key) => providers.push(Arc::new(anthropic::AnthropicProvider::new(key.clone())?)),
        None => warn!("ANTHROPIC_API_KEY is not set. Claude analysis will not be available."),
    }

    if providers.is_empty() {
        warn!("No AI providers configured; every analysis will use the heuristic fallback");
    } else {
        let names: Vec<&str> = providers.iter().map(|p| p.name()).collect();
        info!("AI provider cascade: {}", names.join(" -> "));
    }
    Ok(providers)
}
