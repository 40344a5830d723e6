pub mod add;
pub mod get;
pub mod remove;

use crate::AppState;
use axum::routing::{delete, get};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/planner endpoints (mounted at /api/planner)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get::get_planner).post(add::add_meal))
        .route("/{day}/{slot}", delete(remove::remove_meal))
}

#[derive(OpenApi)]
#[openapi(
    paths(get::get_planner, add::add_meal, remove::remove_meal),
    components(schemas(add::AddMealRequest, add::AddMealResponse, chefmate_core::planner::Placement))
)]
pub struct ApiDoc;
