pub mod get;
pub mod list;

use crate::AppState;
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/recipes endpoints (mounted at /api/recipes)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_recipes))
        .route("/{id}", get(get::get_recipe))
}

#[derive(OpenApi)]
#[openapi(
    paths(list::list_recipes, get::get_recipe),
    components(schemas(list::ListRecipesResponse))
)]
pub struct ApiDoc;
