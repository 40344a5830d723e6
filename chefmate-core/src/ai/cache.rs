//! Disk-based AI response cache.
//!
//! Wraps any [`AiClient`]. Identical requests to the same model are answered from
//! disk, which keeps repeated development runs free and deterministic.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use super::client::{AiClient, AiError};
use super::types::{GenerateRequest, GenerateResponse, OnUpdate, Part, Usage};

/// Disk-based AI response cache.
#[derive(Debug, Clone)]
pub struct AiCache {
    cache_dir: PathBuf,
}

/// A cached response with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedAiResponse {
    pub content: String,
    pub usage: Usage,
    pub cached_at: DateTime<Utc>,
    pub model: String,
}

impl From<CachedAiResponse> for GenerateResponse {
    fn from(cached: CachedAiResponse) -> Self {
        Self {
            content: cached.content,
            usage: cached.usage,
            model: cached.model,
            cached: true,
        }
    }
}

/// Cache key components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    pub model: String,
    pub input_hash: String,
}

impl CacheKey {
    /// Hash every input that influences the model's answer.
    pub fn new(model: &str, request: &GenerateRequest) -> Self {
        let mut hasher = Sha256::new();

        hasher.update(model.as_bytes());
        hasher.update([0]);
        if let Some(instruction) = &request.system_instruction {
            hasher.update(instruction.as_bytes());
        }
        hasher.update([0]);
        if let Some(schema) = &request.response_schema {
            hasher.update(schema.to_string().as_bytes());
        }
        for part in &request.parts {
            match part {
                Part::Text(text) => {
                    hasher.update(b"text\0");
                    hasher.update(text.as_bytes());
                }
                Part::InlineData { mime_type, data } => {
                    hasher.update(b"data\0");
                    hasher.update(mime_type.as_bytes());
                    hasher.update([0]);
                    hasher.update(data);
                }
            }
            hasher.update([0]);
        }

        Self {
            model: model.to_string(),
            input_hash: hex::encode(hasher.finalize()),
        }
    }

    /// Convert to a filesystem path relative to the cache directory.
    ///
    /// Format: {model_safe}/{hash[0:2]}/{hash}.json
    pub fn to_path(&self) -> PathBuf {
        let model_safe = self.model.replace(['/', ':'], "--");

        PathBuf::new()
            .join(model_safe)
            .join(&self.input_hash[..2])
            .join(format!("{}.json", &self.input_hash))
    }
}

impl AiCache {
    /// Create a new cache with the given directory.
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Get a cached response if it exists.
    pub fn get(&self, key: &CacheKey) -> Option<CachedAiResponse> {
        let path = self.cache_dir.join(key.to_path());

        if path.exists() {
            let content = fs::read_to_string(&path).ok()?;
            serde_json::from_str(&content).ok()
        } else {
            None
        }
    }

    /// Store a response in the cache.
    pub fn put(&self, key: &CacheKey, response: &GenerateResponse) -> std::io::Result<()> {
        let path = self.cache_dir.join(key.to_path());

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let cached = CachedAiResponse {
            content: response.content.clone(),
            usage: response.usage.clone(),
            cached_at: Utc::now(),
            model: response.model.clone(),
        };

        let json = serde_json::to_string_pretty(&cached)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        fs::write(&path, json)
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats::default();

        if !self.cache_dir.exists() {
            return stats;
        }

        fn count_json_files(dir: &Path, count: &mut usize) {
            if let Ok(entries) = fs::read_dir(dir) {
                for entry in entries.filter_map(|e| e.ok()) {
                    let path = entry.path();
                    if path.is_dir() {
                        count_json_files(&path, count);
                    } else if path.extension().is_some_and(|ext| ext == "json") {
                        *count += 1;
                    }
                }
            }
        }

        count_json_files(&self.cache_dir, &mut stats.cached_responses);
        stats
    }

    /// Clear all cached responses.
    pub fn clear(&self) -> std::io::Result<()> {
        if self.cache_dir.exists() {
            fs::remove_dir_all(&self.cache_dir)?;
        }
        Ok(())
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub cached_responses: usize,
}

/// A caching wrapper around any AI client.
pub struct CachingAiClient<C> {
    inner: C,
    cache: AiCache,
    offline: bool,
}

impl<C: AiClient> CachingAiClient<C> {
    pub fn new(inner: C, cache_dir: PathBuf) -> Self {
        Self {
            inner,
            cache: AiCache::new(cache_dir),
            offline: false,
        }
    }

    /// Only answer from cache; misses fail with [`AiError::OfflineNotCached`].
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    pub fn cache(&self) -> &AiCache {
        &self.cache
    }

    fn lookup(&self, key: &CacheKey) -> Result<Option<GenerateResponse>, AiError> {
        if let Some(cached) = self.cache.get(key) {
            tracing::debug!(
                provider = self.inner.provider_name(),
                model = %key.model,
                hash = %key.input_hash,
                "AI response found in cache"
            );
            return Ok(Some(cached.into()));
        }

        if self.offline {
            return Err(AiError::OfflineNotCached);
        }

        Ok(None)
    }

    /// Write a response to disk. Blank or non-JSON text is never cached, so a bad
    /// reply is retried instead of replayed.
    fn store(&self, key: &CacheKey, response: &GenerateResponse) {
        if !is_cacheable(&response.content) {
            tracing::debug!(
                model = %key.model,
                hash = %key.input_hash,
                "Not caching response that is not valid JSON"
            );
            return;
        }

        // Caching is best-effort
        if let Err(e) = self.cache.put(key, response) {
            tracing::warn!(error = %e, "Failed to cache AI response");
        }
    }
}

fn is_cacheable(content: &str) -> bool {
    !content.trim().is_empty() && serde_json::from_str::<serde::de::IgnoredAny>(content).is_ok()
}

#[async_trait]
impl<C: AiClient> AiClient for CachingAiClient<C> {
    async fn generate(
        &self,
        model: &str,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, AiError> {
        let key = CacheKey::new(model, request);
        if let Some(cached) = self.lookup(&key)? {
            return Ok(cached);
        }

        let response = self.inner.generate(model, request).await?;
        self.store(&key, &response);
        Ok(response)
    }

    async fn generate_stream(
        &self,
        model: &str,
        request: &GenerateRequest,
        on_update: OnUpdate<'_>,
    ) -> Result<GenerateResponse, AiError> {
        let key = CacheKey::new(model, request);
        if let Some(cached) = self.lookup(&key)? {
            on_update(&cached.content);
            return Ok(cached);
        }

        let response = self.inner.generate_stream(model, request, on_update).await?;
        self.store(&key, &response);
        Ok(response)
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::FakeAiClient;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn request(text: &str) -> GenerateRequest {
        GenerateRequest {
            parts: vec![Part::text(text)],
            ..Default::default()
        }
    }

    #[test]
    fn cache_key_path() {
        let key = CacheKey::new("models/gemini-2.5-flash", &request("test"));
        let path = key.to_path();
        assert!(path.starts_with("models--gemini-2.5-flash/"));
        assert!(path.to_string_lossy().ends_with(".json"));
    }

    #[test]
    fn key_depends_on_image_bytes() {
        let mut a = request("scan");
        a.parts.push(Part::inline_data("image/png", vec![1]));
        let mut b = request("scan");
        b.parts.push(Part::inline_data("image/png", vec![2]));

        assert_ne!(CacheKey::new("m", &a), CacheKey::new("m", &b));
        assert_eq!(CacheKey::new("m", &a), CacheKey::new("m", &a.clone()));
        assert_ne!(CacheKey::new("m", &a), CacheKey::new("n", &a));
    }

    #[tokio::test]
    async fn second_call_hits_cache() {
        let temp_dir = TempDir::new().unwrap();
        let client = CachingAiClient::new(
            FakeAiClient::with_response("m", r#"{"answer":"world"}"#),
            temp_dir.path().to_path_buf(),
        );

        let first = client.generate("m", &request("hello")).await.unwrap();
        assert!(!first.cached);

        let second = client.generate("m", &request("hello")).await.unwrap();
        assert!(second.cached);
        assert_eq!(second.content, r#"{"answer":"world"}"#);

        assert_eq!(client.inner.calls().len(), 1);
        assert_eq!(client.cache().stats().cached_responses, 1);
    }

    #[tokio::test]
    async fn streaming_hit_delivers_single_update() {
        let temp_dir = TempDir::new().unwrap();
        let client = CachingAiClient::new(
            FakeAiClient::with_response("m", r#"{"cached":true}"#),
            temp_dir.path().to_path_buf(),
        );
        client.generate("m", &request("x")).await.unwrap();

        let seen = Mutex::new(Vec::new());
        let on_update = |text: &str| seen.lock().unwrap().push(text.to_string());
        let response = client
            .generate_stream("m", &request("x"), &on_update)
            .await
            .unwrap();

        assert!(response.cached);
        assert_eq!(seen.into_inner().unwrap(), vec![r#"{"cached":true}"#]);
    }

    #[tokio::test]
    async fn offline_miss_fails() {
        let temp_dir = TempDir::new().unwrap();
        let client = CachingAiClient::new(
            FakeAiClient::with_response("m", "world"),
            temp_dir.path().to_path_buf(),
        )
        .offline(true);

        let err = client.generate("m", &request("hello")).await.unwrap_err();
        assert!(matches!(err, AiError::OfflineNotCached));
        assert!(client.inner.calls().is_empty());
    }

    #[tokio::test]
    async fn unparseable_replies_are_not_cached() {
        let temp_dir = TempDir::new().unwrap();
        let fake = FakeAiClient::new();
        fake.add_response("truncated", r#"{"originalName":"Las"#);
        fake.add_response("blank", "   ");
        fake.add_response("prose", "Hier ist dein Rezept!");
        let client = CachingAiClient::new(fake, temp_dir.path().to_path_buf());

        for model in ["truncated", "blank", "prose"] {
            client.generate(model, &request("hello")).await.unwrap();
            client.generate(model, &request("hello")).await.unwrap();
        }

        assert_eq!(client.cache().stats().cached_responses, 0);
        assert_eq!(client.inner.calls().len(), 6);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let temp_dir = TempDir::new().unwrap();
        let fake = FakeAiClient::new();
        fake.add_error("m", 503, "busy");
        let client = CachingAiClient::new(fake, temp_dir.path().to_path_buf());

        assert!(client.generate("m", &request("hello")).await.is_err());
        assert_eq!(client.cache().stats().cached_responses, 0);

        client.cache().clear().unwrap();
        assert!(!client.cache().dir().exists());
    }
}
