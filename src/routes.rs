//! HTTP router.

use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

use crate::{handlers, middleware::cors::cors_layer, state::AppState};

/// Build the application router with all routes and layers.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/v1/auth/token", post(handlers::tokens::issue_token))
        .route(
            "/v1/license/validate",
            post(handlers::licenses::validate_license),
        )
        .route("/v1/admin/licenses", post(handlers::admin::upsert_license))
        .route(
            "/v1/admin/licenses/{license_key}",
            delete(handlers::admin::delete_license),
        )
        .layer(cors_layer())
        // Add distributed tracing middleware for observability
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
