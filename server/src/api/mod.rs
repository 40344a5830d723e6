pub mod generate;
pub mod planner;
pub mod recipes;
pub mod shopping_list;
pub mod testing;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chefmate_core::{
    Ingredient, MealSlot, PlannedMeal, PlannerDay, Recipe, RecipeVariant, RecipeVariantSet,
    ShoppingItem, SourceType, VariantKind, WeekPlan,
};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

/// Shared error response used by all endpoints
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Build an error response with the given status.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Generate the complete OpenAPI spec by merging all module specs
pub fn openapi() -> utoipa::openapi::OpenApi {
    // Base spec with shared components
    #[derive(OpenApi)]
    #[openapi(components(schemas(
        ErrorResponse,
        Recipe,
        RecipeVariantSet,
        RecipeVariant,
        Ingredient,
        SourceType,
        VariantKind,
        WeekPlan,
        PlannerDay,
        PlannedMeal,
        MealSlot,
        ShoppingItem,
    )))]
    struct BaseApi;

    let mut spec = BaseApi::openapi();

    // Merge in each module's spec
    let modules: Vec<utoipa::openapi::OpenApi> = vec![
        generate::ApiDoc::openapi(),
        recipes::ApiDoc::openapi(),
        planner::ApiDoc::openapi(),
        shopping_list::ApiDoc::openapi(),
        testing::ApiDoc::openapi(),
    ];

    for module_spec in modules {
        // Merge paths
        spec.paths.paths.extend(module_spec.paths.paths);

        // Merge components (schemas)
        if let Some(module_components) = module_spec.components {
            if let Some(spec_components) = spec.components.as_mut() {
                spec_components.schemas.extend(module_components.schemas);
            }
        }
    }

    spec
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::state::ServerState;
    use crate::AppState;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use chefmate_core::ai::FakeAiClient;
    use chefmate_core::RecipeGenerator;
    use std::sync::Arc;
    use tower::ServiceExt;

    pub fn state_with(fake: FakeAiClient) -> AppState {
        let generator = RecipeGenerator::new(Arc::new(fake), vec!["fake-model".to_string()]);
        Arc::new(ServerState::new(generator))
    }

    pub fn app() -> (Router, AppState) {
        let state = state_with(FakeAiClient::default());
        (crate::app(state.clone()), state)
    }

    /// Send a request and return the status with the body parsed as JSON (Null if empty).
    pub async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let (status, bytes) = send_raw(app, method, uri, body).await;
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn send_raw(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, Vec<u8>) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }
}
