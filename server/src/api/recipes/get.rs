use crate::api::{error_response, ErrorResponse};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chefmate_core::Recipe;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Recipe details", body = Recipe),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn get_recipe(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let store = state.store.read().await;

    match store.recipe(id) {
        Some(recipe) => (StatusCode::OK, Json(recipe.clone())).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "Recipe not found"),
    }
}
