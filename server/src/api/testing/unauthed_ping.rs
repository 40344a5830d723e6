use axum::{response::IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UnauthedPingResponse {
    pub message: String,
}

#[utoipa::path(
    get,
    path = "/api/test/unauthed-ping",
    tag = "testing",
    responses(
        (status = 200, description = "Liveness check", body = UnauthedPingResponse)
    )
)]
pub async fn unauthed_ping() -> impl IntoResponse {
    Json(UnauthedPingResponse {
        message: "unauthed-ping".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{app, send};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn responds_without_configuration() {
        let (app, _) = app();
        let (status, body) = send(&app, "GET", "/api/test/unauthed-ping", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "unauthed-ping"}));
    }
}
