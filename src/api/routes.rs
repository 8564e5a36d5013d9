//! Router configuration for the API.
//!
//! Centralized route registration and middleware configuration.

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::middleware;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::doc::ApiDoc;
use crate::api::handlers;
use crate::api::middleware::{logging_middleware, request_id_middleware};
use crate::config::settings::ServerConfig;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Creates the main application router with all routes and middleware.
///
/// Middleware is applied in reverse order of declaration (last added runs
/// first): request IDs are assigned before logging sees the request.
pub fn create_router(state: AppState, server: &ServerConfig) -> AppResult<Router> {
    let cors = cors_layer(server)?;

    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/tasks", handlers::tasks::task_routes())
        .split_for_parts();

    Ok(router
        .merge(handlers::health::health_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
        .layer(cors)
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state))
}

/// Restricts cross-origin requests to the configured UI origin.
fn cors_layer(server: &ServerConfig) -> AppResult<CorsLayer> {
    let origin: HeaderValue =
        server
            .allowed_origin
            .parse()
            .map_err(|e| AppError::Configuration {
                key: "server.allowed_origin".to_string(),
                source: anyhow::anyhow!("invalid origin '{}': {}", server.allowed_origin, e),
            })?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]))
}
