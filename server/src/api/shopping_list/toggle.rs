use crate::api::{error_response, ErrorResponse};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ToggleResponse {
    pub checked: bool,
}

#[utoipa::path(
    post,
    path = "/api/shopping-list/{index}/toggle",
    tag = "shopping_list",
    params(
        ("index" = usize, Path, description = "Position in the item list")
    ),
    responses(
        (status = 200, description = "Item toggled", body = ToggleResponse),
        (status = 404, description = "No item at this index", body = ErrorResponse)
    )
)]
pub async fn toggle_item(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> impl IntoResponse {
    let mut store = state.store.write().await;
    match store.shopping_list.toggle(index) {
        Some(checked) => Json(ToggleResponse { checked }).into_response(),
        None => error_response(
            StatusCode::NOT_FOUND,
            format!("No shopping list item at index {}", index),
        ),
    }
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{app, send};
    use axum::http::StatusCode;
    use chefmate_core::{ai::SAMPLE_RECIPE_JSON, ShoppingList, SourceType, VariantKind};
    use chefmate_core::{assemble_recipe, normalize_recipe, NormalizePolicy};

    #[tokio::test]
    async fn toggles_back_and_forth() {
        let (app, state) = app();
        {
            let data: serde_json::Value = serde_json::from_str(SAMPLE_RECIPE_JSON).unwrap();
            let normalized = normalize_recipe(&data, NormalizePolicy::Lenient).unwrap();
            let recipe = assemble_recipe(normalized, SourceType::Search);
            let mut list = ShoppingList::new();
            list.add_recipe(&recipe, VariantKind::Student);
            state.store.write().await.shopping_list = list;
        }

        let (status, body) = send(&app, "POST", "/api/shopping-list/0/toggle", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checked"], true);
        assert!(state.store.read().await.shopping_list.items[0].checked);

        let (_, body) = send(&app, "POST", "/api/shopping-list/0/toggle", None).await;
        assert_eq!(body["checked"], false);
    }

    #[tokio::test]
    async fn unknown_index_is_not_found() {
        let (app, _) = app();
        let (status, body) = send(&app, "POST", "/api/shopping-list/3/toggle", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("index 3"));
    }
}
