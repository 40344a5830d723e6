use super::GenerateRequest;
use crate::api::{error_response, ErrorResponse};
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chefmate_core::{GenerateError, Recipe};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GenerateResponse {
    pub recipe: Recipe,
}

/// Map a pipeline failure to an HTTP error response.
pub fn generate_error_response(err: &GenerateError) -> axum::response::Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    error_response(status, err.to_string())
}

#[utoipa::path(
    post,
    path = "/api/generate",
    tag = "generate",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Recipe generated", body = GenerateResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 500, description = "Server misconfigured", body = ErrorResponse),
        (status = 502, description = "Provider error or malformed response", body = ErrorResponse),
        (status = 503, description = "All models unavailable", body = ErrorResponse)
    )
)]
pub async fn generate_recipe(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> impl IntoResponse {
    let params = match request.into_params() {
        Ok(params) => params,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };

    let recipe = match state.generator.generate(&params, None).await {
        Ok(recipe) => recipe,
        Err(e) => {
            tracing::warn!(error = %e, "Recipe generation failed");
            return generate_error_response(&e);
        }
    };

    state.store.write().await.recipes.push(recipe.clone());

    (StatusCode::OK, Json(GenerateResponse { recipe })).into_response()
}
