use crate::api::{error_response, ErrorResponse};
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chefmate_core::planner::Placement;
use chefmate_core::{PlannerError, VariantKind, WeekPlan};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddMealRequest {
    pub recipe_id: Uuid,
    pub version: VariantKind,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AddMealResponse {
    pub placement: Placement,
    pub planner: WeekPlan,
}

/// Plan a recipe variant for today and add its ingredients to the shopping list.
#[utoipa::path(
    post,
    path = "/api/planner",
    tag = "planner",
    request_body = AddMealRequest,
    responses(
        (status = 200, description = "Meal planned", body = AddMealResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 409, description = "Day is full", body = ErrorResponse)
    )
)]
pub async fn add_meal(
    State(state): State<AppState>,
    Json(request): Json<AddMealRequest>,
) -> impl IntoResponse {
    let mut guard = state.store.write().await;
    let store = &mut *guard;

    let Some(recipe) = store.recipe(request.recipe_id).cloned() else {
        return error_response(StatusCode::NOT_FOUND, "Recipe not found");
    };

    let today = Utc::now().date_naive();
    let placement = match store
        .planner
        .add_meal(today, recipe.recipe_id, request.version)
    {
        Ok(placement) => placement,
        Err(e @ PlannerError::DayFull(_)) => {
            return error_response(StatusCode::CONFLICT, e.to_string())
        }
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    store.shopping_list.add_recipe(&recipe, request.version);

    tracing::info!(
        recipe_id = %recipe.recipe_id,
        version = %request.version,
        date = %placement.date,
        slot = %placement.slot,
        "Added {} to the planner",
        recipe.original_name
    );

    (
        StatusCode::OK,
        Json(AddMealResponse {
            placement,
            planner: store.planner.clone(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{app, send};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn plans_meal_and_fills_shopping_list() {
        let (app, _) = app();
        let (_, created) = send(
            &app,
            "POST",
            "/api/generate",
            Some(json!({"prompt": "Lasagne", "sourceType": "search"})),
        )
        .await;
        let id = created["recipe"]["recipeId"].clone();

        let (status, body) = send(
            &app,
            "POST",
            "/api/planner",
            Some(json!({"recipeId": id, "version": "student"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["placement"]["slot"], "dinner");

        let (_, list) = send(&app, "GET", "/api/shopping-list", None).await;
        assert_eq!(list["items"].as_array().unwrap().len(), 3);

        for expected in ["lunch", "breakfast"] {
            let (_, body) = send(
                &app,
                "POST",
                "/api/planner",
                Some(json!({"recipeId": id, "version": "profi"})),
            )
            .await;
            assert_eq!(body["placement"]["slot"], expected);
        }

        let (status, _) = send(
            &app,
            "POST",
            "/api/planner",
            Some(json!({"recipeId": id, "version": "airfryer"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn unknown_recipe_is_not_found() {
        let (app, _) = app();
        let (status, _) = send(
            &app,
            "POST",
            "/api/planner",
            Some(json!({"recipeId": uuid::Uuid::new_v4(), "version": "student"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
