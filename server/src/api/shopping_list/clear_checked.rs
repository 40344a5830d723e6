use crate::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClearCheckedResponse {
    pub deleted_count: usize,
}

#[utoipa::path(
    delete,
    path = "/api/shopping-list/checked",
    tag = "shopping_list",
    responses(
        (status = 200, description = "Checked items cleared", body = ClearCheckedResponse)
    )
)]
pub async fn clear_checked(State(state): State<AppState>) -> impl IntoResponse {
    let mut store = state.store.write().await;
    let deleted_count = store.shopping_list.clear_checked();

    if deleted_count > 0 {
        tracing::info!(deleted_count, "Cleared checked shopping list items");
    }

    Json(ClearCheckedResponse { deleted_count })
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{app, send};
    use axum::http::StatusCode;
    use chefmate_core::{Ingredient, ShoppingList};
    use uuid::Uuid;

    fn ingredient(item: &str) -> Ingredient {
        Ingredient {
            item: item.to_string(),
            amount: 1.0,
            unit: "Stk".to_string(),
            category: "Gemüse".to_string(),
        }
    }

    #[tokio::test]
    async fn removes_only_checked_items() {
        let (app, state) = app();
        {
            let mut list = ShoppingList::new();
            let recipe_id = Uuid::new_v4();
            list.add_ingredient(&ingredient("Karotte"), recipe_id);
            list.add_ingredient(&ingredient("Lauch"), recipe_id);
            list.add_ingredient(&ingredient("Sellerie"), recipe_id);
            list.toggle(0);
            list.toggle(2);
            state.store.write().await.shopping_list = list;
        }

        let (status, body) = send(&app, "DELETE", "/api/shopping-list/checked", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deletedCount"], 2);

        let store = state.store.read().await;
        assert_eq!(store.shopping_list.len(), 1);
        assert_eq!(store.shopping_list.items[0].ingredient.item, "Lauch");
    }

    #[tokio::test]
    async fn nothing_checked_is_a_no_op() {
        let (app, _) = app();
        let (status, body) = send(&app, "DELETE", "/api/shopping-list/checked", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deletedCount"], 0);
    }
}
