mod api;
mod state;

use axum::extract::MatchedPath;
use axum::http::Request;
use axum::Router;
use chefmate_core::RecipeGenerator;
use std::env;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Application state shared across all handlers
pub type AppState = Arc<state::ServerState>;

fn init_telemetry() {
    let fmt_layer = tracing_subscriber::fmt::layer();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api/generate", api::generate::router())
        .nest("/api/recipes", api::recipes::router())
        .nest("/api/planner", api::planner::router())
        .nest("/api/shopping-list", api::shopping_list::router())
        .nest("/api/test", api::testing::router())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    let matched_path = request
                        .extensions()
                        .get::<MatchedPath>()
                        .map(MatchedPath::as_str)
                        .unwrap_or(request.uri().path());

                    // Don't create a span at all for noisy endpoints
                    if matched_path == "/api/test/unauthed-ping" {
                        tracing::trace_span!("http_request")
                    } else {
                        tracing::info_span!(
                            "http_request",
                            method = %request.method(),
                            path = %matched_path,
                        )
                    }
                })
                .on_request(|_request: &Request<_>, _span: &Span| {})
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        if span.metadata().map(|m| m.level()) == Some(&tracing::Level::TRACE) {
                            return;
                        }
                        let status = response.status().as_u16();
                        if status >= 500 {
                            tracing::error!(
                                status = %status,
                                latency_ms = %latency.as_millis(),
                                "request failed with server error"
                            );
                        } else {
                            tracing::info!(
                                status = %status,
                                latency_ms = %latency.as_millis(),
                                "request completed"
                            );
                        }
                    },
                ),
        )
}

#[tokio::main]
async fn main() {
    // Check for --openapi flag to dump spec and exit
    if env::args().any(|arg| arg == "--openapi") {
        match api::openapi().to_pretty_json() {
            Ok(spec) => println!("{}", spec),
            Err(e) => {
                eprintln!("Failed to render OpenAPI spec: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    init_telemetry();

    let generator = match RecipeGenerator::from_env() {
        Ok(generator) => generator,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };
    tracing::info!(
        provider = generator.provider_name(),
        models = ?generator.models(),
        "Recipe generator ready"
    );

    let state: AppState = Arc::new(state::ServerState::new(generator));

    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, port = %port, "Failed to bind");
            std::process::exit(1);
        }
    };

    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Server listening on {}", addr);
    }

    if let Err(e) = axum::serve(listener, app(state)).await {
        tracing::error!(error = %e, "Server error");
    }
}
