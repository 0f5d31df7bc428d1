// Server module - Router assembly and the listening loop used by main.rs

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::get;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::infrastructure::AppState;
use crate::infrastructure::config::Config;

/// Build the full application: API, OpenAPI document and static page
pub fn build_router(state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/api-docs/openapi.json", get(api::openapi_json))
        .nest("/api", api::api_router(state))
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(cors_layer(&config.cors_allowed_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let mut allowed = Vec::new();
    for origin in origins {
        match origin.parse::<HeaderValue>() {
            Ok(v) => allowed.push(v),
            Err(e) => tracing::error!("Failed to parse CORS origin '{}': {}", origin, e),
        }
    }
    cors.allow_origin(allowed)
}

/// Bind and serve until the process is stopped
pub async fn serve(state: AppState, config: &Config) -> Result<(), String> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| format!("Invalid listen address {}:{}: {}", config.host, config.port, e))?;

    let app = build_router(state, config);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    tracing::info!("pagemark server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| format!("HTTP server error: {}", e))
}
