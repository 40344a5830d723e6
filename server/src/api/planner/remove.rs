use crate::api::{error_response, ErrorResponse};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chefmate_core::MealSlot;

#[utoipa::path(
    delete,
    path = "/api/planner/{day}/{slot}",
    tag = "planner",
    params(
        ("day" = usize, Path, description = "Day index, 0 = Monday"),
        ("slot" = MealSlot, Path, description = "breakfast, lunch or dinner")
    ),
    responses(
        (status = 204, description = "Slot cleared"),
        (status = 404, description = "Day out of range", body = ErrorResponse)
    )
)]
pub async fn remove_meal(
    State(state): State<AppState>,
    Path((day, slot)): Path<(usize, MealSlot)>,
) -> impl IntoResponse {
    let mut store = state.store.write().await;

    // Ingredients already on the shopping list stay there
    match store.planner.remove_meal(day, slot) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(StatusCode::NOT_FOUND, e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{app, send};
    use axum::http::StatusCode;
    use chefmate_core::MealSlot;
    use serde_json::json;

    #[tokio::test]
    async fn clears_slot_and_keeps_shopping_list() {
        let (app, state) = app();
        let (_, created) = send(
            &app,
            "POST",
            "/api/generate",
            Some(json!({"prompt": "Lasagne", "sourceType": "search"})),
        )
        .await;
        let (_, planned) = send(
            &app,
            "POST",
            "/api/planner",
            Some(json!({"recipeId": created["recipe"]["recipeId"], "version": "student"})),
        )
        .await;
        let day = planned["placement"]["dayIndex"].as_u64().unwrap();

        let (status, _) = send(&app, "DELETE", &format!("/api/planner/{day}/dinner"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let store = state.store.read().await;
        assert!(store.planner.days[day as usize]
            .slots
            .get(MealSlot::Dinner)
            .is_none());
        assert!(!store.shopping_list.is_empty());
    }

    #[tokio::test]
    async fn rejects_bad_day_and_slot() {
        let (app, _) = app();

        let (status, _) = send(&app, "DELETE", "/api/planner/9/lunch", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, "DELETE", "/api/planner/0/brunch", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
