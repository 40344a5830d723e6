use crate::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use chefmate_core::WeekPlan;

#[utoipa::path(
    get,
    path = "/api/planner",
    tag = "planner",
    responses(
        (status = 200, description = "The current week", body = WeekPlan)
    )
)]
pub async fn get_planner(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.store.read().await;
    Json(store.planner.clone())
}
