//! The recipe generation pipeline: prompt, model fallback chain, normalization
//! and assembly.

use std::sync::{Arc, Mutex};
use tracing::Instrument;

use crate::ai::prompts::build_request;
use crate::ai::{
    create_client, AiClient, AiConfig, AiError, GenerateRequest, GenerateResponse, OnUpdate,
};
use crate::assemble::assemble_recipe;
use crate::error::GenerateError;
use crate::image::ImageInput;
use crate::normalize::{normalize_recipe, NormalizePolicy};
use crate::types::{Recipe, SourceType};

/// Input of one generation call.
#[derive(Debug, Clone, Default)]
pub struct GenerateParams {
    /// Dish name, ingredient list or link text. Ignored for scans.
    pub prompt: String,
    pub source_type: Option<SourceType>,
    pub image: Option<ImageInput>,
}

impl GenerateParams {
    pub fn new(prompt: impl Into<String>, source_type: SourceType) -> Self {
        Self {
            prompt: prompt.into(),
            source_type: Some(source_type),
            image: None,
        }
    }

    pub fn with_image(mut self, image: ImageInput) -> Self {
        self.image = Some(image);
        self
    }

    fn validate(&self) -> Result<SourceType, GenerateError> {
        let source_type = self
            .source_type
            .ok_or_else(|| GenerateError::InvalidInput("sourceType is required".to_string()))?;

        match source_type {
            SourceType::Scan if self.image.is_none() => Err(GenerateError::InvalidInput(
                "scan requests need an image".to_string(),
            )),
            SourceType::Scan => Ok(source_type),
            _ if self.prompt.trim().is_empty() => Err(GenerateError::InvalidInput(
                "prompt must not be empty".to_string(),
            )),
            _ => Ok(source_type),
        }
    }
}

/// Runs generation requests against an ordered chain of models.
#[derive(Clone)]
pub struct RecipeGenerator {
    client: Arc<dyn AiClient>,
    models: Vec<String>,
    policy: NormalizePolicy,
}

impl RecipeGenerator {
    pub fn new(client: Arc<dyn AiClient>, models: Vec<String>) -> Self {
        Self {
            client,
            models,
            policy: NormalizePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: NormalizePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build a generator from configuration, including the configured client.
    pub fn from_config(config: &AiConfig) -> Result<Self, GenerateError> {
        let client = create_client(config).map_err(|e| GenerateError::Config(e.to_string()))?;
        Ok(Self::new(client, config.models.clone()).with_policy(config.policy))
    }

    pub fn from_env() -> Result<Self, GenerateError> {
        Self::from_config(&AiConfig::from_env()?)
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn provider_name(&self) -> &'static str {
        self.client.provider_name()
    }

    /// Generate a recipe.
    ///
    /// With `on_update`, partial output is streamed: the callback receives the
    /// cumulative text after each chunk and, last, the exact text that gets parsed.
    /// Updates never get shorter: a model may only be replaced by the next one in the
    /// chain while nothing of its output has been delivered.
    pub async fn generate(
        &self,
        params: &GenerateParams,
        on_update: Option<OnUpdate<'_>>,
    ) -> Result<Recipe, GenerateError> {
        let source_type = params.validate()?;
        let request = build_request(source_type, &params.prompt, params.image.as_ref());

        let span = tracing::info_span!(
            "generate_recipe",
            source_type = %source_type,
            streaming = on_update.is_some()
        );
        let response = self.run_chain(&request, on_update).instrument(span).await?;
        tracing::info!(
            model = %response.model,
            cached = response.cached,
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            "Generation succeeded"
        );

        if response.content.trim().is_empty() {
            return Err(GenerateError::MalformedResponse(
                "model returned empty text".to_string(),
            ));
        }

        let data: serde_json::Value = serde_json::from_str(&response.content)
            .map_err(|e| GenerateError::MalformedResponse(format!("invalid JSON: {}", e)))?;
        let normalized = normalize_recipe(&data, self.policy)?;

        Ok(assemble_recipe(normalized, source_type))
    }

    /// Try each model in order until one succeeds or a fatal error occurs.
    async fn run_chain(
        &self,
        request: &GenerateRequest,
        on_update: Option<OnUpdate<'_>>,
    ) -> Result<GenerateResponse, GenerateError> {
        let mut last_error: Option<(String, AiError)> = None;

        for (attempt, model) in self.models.iter().enumerate() {
            tracing::debug!(model = %model, attempt = attempt + 1, "Trying model");

            let result = match on_update {
                Some(callback) => self.attempt_stream(model, request, callback).await,
                None => self
                    .client
                    .generate(model, request)
                    .await
                    .map_err(FailedAttempt::silent),
            };

            match result {
                Ok(response) => return Ok(response),
                Err(FailedAttempt {
                    error: e,
                    delivered: false,
                }) if e.is_transient() => {
                    tracing::warn!(model = %model, error = %e, "Model unavailable, trying next");
                    last_error = Some((model.clone(), e));
                }
                Err(FailedAttempt {
                    error: e,
                    delivered: true,
                }) if e.is_transient() => {
                    tracing::warn!(
                        model = %model,
                        error = %e,
                        "Stream interrupted after partial output, not falling back"
                    );
                    return Err(GenerateError::Unavailable {
                        model: model.clone(),
                        source: e,
                    });
                }
                Err(FailedAttempt { error: e, .. }) => {
                    tracing::error!(model = %model, error = %e, "Generation failed");
                    return Err(GenerateError::Provider {
                        model: model.clone(),
                        source: e,
                    });
                }
            }
        }

        match last_error {
            Some((model, source)) => Err(GenerateError::Unavailable { model, source }),
            None => Err(GenerateError::Config("no models configured".to_string())),
        }
    }

    async fn attempt_stream(
        &self,
        model: &str,
        request: &GenerateRequest,
        on_update: OnUpdate<'_>,
    ) -> Result<GenerateResponse, FailedAttempt> {
        let last_sent = Mutex::new(String::new());
        let forward = |text: &str| {
            if let Ok(mut last) = last_sent.lock() {
                last.clear();
                last.push_str(text);
            }
            on_update(text);
        };

        let response = match self.client.generate_stream(model, request, &forward).await {
            Ok(response) => response,
            Err(error) => {
                let delivered = last_sent.lock().map(|last| !last.is_empty()).unwrap_or(true);
                return Err(FailedAttempt { error, delivered });
            }
        };

        let already_sent = last_sent
            .lock()
            .map(|last| *last == response.content)
            .unwrap_or(false);
        if !already_sent {
            on_update(&response.content);
        }

        Ok(response)
    }
}

/// A failed model attempt, and whether any of its output reached the caller.
struct FailedAttempt {
    error: AiError,
    delivered: bool,
}

impl FailedAttempt {
    fn silent(error: AiError) -> Self {
        Self {
            error,
            delivered: false,
        }
    }
}

impl std::fmt::Debug for RecipeGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipeGenerator")
            .field("provider", &self.client.provider_name())
            .field("models", &self.models)
            .field("policy", &self.policy)
            .finish()
    }
}
