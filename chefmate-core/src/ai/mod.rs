//! AI client module for recipe generation via the Gemini API.
//!
//! This module provides:
//! - `AiClient` trait for abstracting generation backends
//! - `GeminiClient`, the HTTP implementation (blocking and streaming)
//! - `CachingAiClient` with disk-based caching
//! - `FakeAiClient` with scripted replies for tests and offline demos
//! - Prompt templates and the response schema
//!
//! # Configuration
//!
//! Set these environment variables:
//!
//! - `GEMINI_API_KEY` (required for gemini): Your Gemini API key
//! - `CHEFMATE_AI_PROVIDER` (optional): "gemini" or "fake"
//! - `CHEFMATE_AI_MODELS` (optional): Comma-separated fallback chain
//! - `CHEFMATE_AI_BASE_URL` (optional): API base URL
//! - `CHEFMATE_AI_TIMEOUT_SECS` (optional): Per-request timeout
//! - `CHEFMATE_AI_CACHE_DIR` (optional): Cache directory path
//! - `CHEFMATE_AI_OFFLINE` (optional): Set to "true" to use cache only
//!
//! # Example
//!
//! ```ignore
//! use chefmate_core::ai::{create_client, AiConfig};
//!
//! let config = AiConfig::from_env()?;
//! let client = create_client(&config)?;
//! let response = client.generate("gemini-2.5-flash", &request).await?;
//! println!("Response: {}", response.content);
//! ```

mod cache;
mod client;
mod config;
mod fake;
mod gemini;
pub mod prompts;
mod types;

use std::sync::Arc;

pub use cache::{AiCache, CacheKey, CacheStats, CachedAiResponse, CachingAiClient};
pub use client::{AiClient, AiError, TRANSIENT_MARKERS, TRANSIENT_STATUSES};
pub use config::{parse_model_list, AiConfig, ConfigError, ProviderKind};
pub use fake::{FakeAiClient, FakeReply, SAMPLE_RECIPE_JSON};
pub use gemini::GeminiClient;
pub use types::{GenerateRequest, GenerateResponse, OnUpdate, Part, Usage};

/// Build the configured client, wrapped in the disk cache when one is configured.
pub fn create_client(config: &AiConfig) -> Result<Arc<dyn AiClient>, AiError> {
    match config.provider {
        ProviderKind::Gemini => Ok(with_cache(GeminiClient::new(config)?, config)),
        ProviderKind::Fake => Ok(with_cache(FakeAiClient::default(), config)),
    }
}

fn with_cache<C: AiClient + 'static>(client: C, config: &AiConfig) -> Arc<dyn AiClient> {
    match &config.cache_dir {
        Some(dir) => {
            tracing::info!(
                provider = client.provider_name(),
                cache_dir = %dir.display(),
                offline = config.offline,
                "AI response cache enabled"
            );
            Arc::new(CachingAiClient::new(client, dir.clone()).offline(config.offline))
        }
        None => Arc::new(client),
    }
}
