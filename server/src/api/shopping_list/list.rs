use crate::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use chefmate_core::ShoppingItem;
use serde::Serialize;
use utoipa::ToSchema;

/// Indices into `items`, grouped by category.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryGroup {
    pub category: String,
    pub item_indices: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingListResponse {
    pub items: Vec<ShoppingItem>,
    pub open_count: usize,
    /// Sorted by category name
    pub categories: Vec<CategoryGroup>,
}

#[utoipa::path(
    get,
    path = "/api/shopping-list",
    tag = "shopping_list",
    responses(
        (status = 200, description = "The aggregated shopping list", body = ShoppingListResponse)
    )
)]
pub async fn list_items(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.store.read().await;
    let list = &store.shopping_list;

    let categories = list
        .by_category()
        .into_iter()
        .map(|(category, items)| CategoryGroup {
            category: category.to_string(),
            item_indices: items.into_iter().map(|(index, _)| index).collect(),
        })
        .collect();

    Json(ShoppingListResponse {
        items: list.items.clone(),
        open_count: list.open_count(),
        categories,
    })
}
