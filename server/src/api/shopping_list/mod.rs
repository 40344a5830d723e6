pub mod clear_checked;
pub mod list;
pub mod toggle;

use crate::AppState;
use axum::routing::{delete, get, post};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/shopping-list endpoints
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_items))
        .route("/{index}/toggle", post(toggle::toggle_item))
        .route("/checked", delete(clear_checked::clear_checked))
}

#[derive(OpenApi)]
#[openapi(
    paths(list::list_items, toggle::toggle_item, clear_checked::clear_checked),
    components(schemas(
        list::ShoppingListResponse,
        list::CategoryGroup,
        toggle::ToggleResponse,
        clear_checked::ClearCheckedResponse,
    ))
)]
pub struct ApiDoc;
