use crate::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use chefmate_core::Recipe;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListRecipesResponse {
    /// Newest first
    pub recipes: Vec<Recipe>,
}

#[utoipa::path(
    get,
    path = "/api/recipes",
    tag = "recipes",
    responses(
        (status = 200, description = "Generation history", body = ListRecipesResponse)
    )
)]
pub async fn list_recipes(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.store.read().await;
    let recipes = store.recipes.iter().rev().cloned().collect();

    Json(ListRecipesResponse { recipes })
}
