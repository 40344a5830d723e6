//! AI configuration from environment variables.

use std::env;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::normalize::NormalizePolicy;

/// Default Gemini API base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model chain: fast model first, stronger fallback second.
pub const DEFAULT_MODELS: &[&str] = &["gemini-2.5-flash", "gemini-2.5-pro"];

/// Default transport timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}

/// Which backend answers generation requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProviderKind {
    #[default]
    Gemini,
    /// Scripted replies, no network access.
    Fake,
}

impl ProviderKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "gemini" => Some(ProviderKind::Gemini),
            "fake" => Some(ProviderKind::Fake),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::Fake => "fake",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for the generation pipeline.
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub provider: ProviderKind,
    /// API key for the Gemini API. Unused by the fake provider.
    pub api_key: String,
    /// Model identifiers, tried in order.
    pub models: Vec<String>,
    /// Base URL for the API.
    pub base_url: String,
    /// Transport timeout for a single request.
    pub timeout_secs: u64,
    /// If set, responses are cached on disk here.
    pub cache_dir: Option<PathBuf>,
    /// If true, only use cache, error if not cached.
    pub offline: bool,
    /// How to treat structurally incomplete responses.
    pub policy: NormalizePolicy,
}

impl AiConfig {
    /// Configuration with the given key and defaults for everything else.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            provider: ProviderKind::default(),
            api_key: api_key.into(),
            models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            cache_dir: None,
            offline: false,
            policy: NormalizePolicy::default(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `GEMINI_API_KEY`: API key (unless the provider is "fake")
    ///
    /// Optional:
    /// - `CHEFMATE_AI_PROVIDER`: "gemini" | "fake" (default: "gemini")
    /// - `CHEFMATE_AI_MODELS`: comma-separated model chain (default: "gemini-2.5-flash,gemini-2.5-pro")
    /// - `CHEFMATE_AI_BASE_URL`: API base URL
    /// - `CHEFMATE_AI_TIMEOUT_SECS`: request timeout (default: 60)
    /// - `CHEFMATE_AI_CACHE_DIR`: enable the response cache in this directory
    /// - `CHEFMATE_AI_OFFLINE`: use cache only (default: false)
    /// - `CHEFMATE_NORMALIZE_STRICT`: reject incomplete responses (default: false)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let provider = match get("CHEFMATE_AI_PROVIDER") {
            Some(value) => ProviderKind::parse(&value).ok_or(ConfigError::InvalidValue {
                name: "CHEFMATE_AI_PROVIDER".to_string(),
                value,
            })?,
            None => ProviderKind::default(),
        };

        let api_key = match (provider, get("GEMINI_API_KEY")) {
            (_, Some(key)) => key,
            (ProviderKind::Fake, None) => String::new(),
            (ProviderKind::Gemini, None) => {
                return Err(ConfigError::MissingEnvVar("GEMINI_API_KEY".to_string()))
            }
        };

        let mut config = Self::new(api_key);
        config.provider = provider;

        if let Some(models) = get("CHEFMATE_AI_MODELS") {
            config.models = parse_model_list(&models);
            if config.models.is_empty() {
                return Err(ConfigError::InvalidValue {
                    name: "CHEFMATE_AI_MODELS".to_string(),
                    value: models,
                });
            }
        }

        if let Some(base_url) = get("CHEFMATE_AI_BASE_URL") {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }

        if let Some(timeout) = get("CHEFMATE_AI_TIMEOUT_SECS") {
            config.timeout_secs = timeout.parse().map_err(|_| ConfigError::InvalidValue {
                name: "CHEFMATE_AI_TIMEOUT_SECS".to_string(),
                value: timeout.clone(),
            })?;
        }

        config.cache_dir = get("CHEFMATE_AI_CACHE_DIR").map(PathBuf::from);
        config.offline = get("CHEFMATE_AI_OFFLINE").is_some_and(|v| is_truthy(&v));

        if get("CHEFMATE_NORMALIZE_STRICT").is_some_and(|v| is_truthy(&v)) {
            config.policy = NormalizePolicy::Strict;
        }

        Ok(config)
    }

    /// Get the default cache directory: ~/.chefmate/ai-cache
    pub fn default_cache_dir() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".chefmate").join("ai-cache"))
            .unwrap_or_else(|| PathBuf::from("data/ai-cache"))
    }
}

/// Split a comma-separated model list, dropping blanks.
pub fn parse_model_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "1" | "true" | "yes")
}
