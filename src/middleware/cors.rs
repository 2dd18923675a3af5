//! CORS policy for web clients.
//!
//! Any origin may call the API. Browsers must be allowed to send the two credential headers,
//! otherwise preflight requests for validation and admin calls fail.

use axum::http::{HeaderName, Method, header};
use tower_http::cors::{Any, CorsLayer};

use super::auth::{ACCESS_TOKEN_HEADER, ADMIN_SECRET_HEADER};

pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(ACCESS_TOKEN_HEADER),
            HeaderName::from_static(ADMIN_SECRET_HEADER),
        ])
}
