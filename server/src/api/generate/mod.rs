pub mod create;
pub mod stream;

use crate::AppState;
use axum::routing::post;
use axum::Router;
use chefmate_core::{GenerateParams, ImageInput, SourceType};
use serde::Deserialize;
use utoipa::{OpenApi, ToSchema};

/// Returns the router for /api/generate endpoints (mounted at /api/generate)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create::generate_recipe))
        .route("/stream", post(stream::generate_recipe_stream))
}

#[derive(OpenApi)]
#[openapi(
    paths(create::generate_recipe, stream::generate_recipe_stream),
    components(schemas(GenerateRequest, create::GenerateResponse))
)]
pub struct ApiDoc;

/// Body shared by the blocking and streaming endpoints.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Dish name, ingredient list or link text
    #[serde(default)]
    pub prompt: Option<String>,
    /// One of search, pantry, scan, social
    #[serde(default)]
    pub source_type: Option<String>,
    /// Image as base64, optionally a data URL
    #[serde(default)]
    pub image_base64: Option<String>,
}

impl GenerateRequest {
    /// Convert into pipeline parameters; the error is a client-facing message.
    pub fn into_params(self) -> Result<GenerateParams, String> {
        let source_type = match self.source_type.as_deref() {
            Some(raw) => Some(
                SourceType::from_str(raw).ok_or_else(|| format!("Unknown sourceType: {}", raw))?,
            ),
            None => None,
        };

        let image = match self.image_base64.as_deref() {
            Some(encoded) if !encoded.trim().is_empty() => Some(ImageInput::from_base64(encoded)?),
            _ => None,
        };

        Ok(GenerateParams {
            prompt: self.prompt.unwrap_or_default(),
            source_type,
            image,
        })
    }
}
