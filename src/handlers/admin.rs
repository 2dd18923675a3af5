//! License administration endpoints.
//!
//! - POST /v1/admin/licenses - Insert or update a license
//! - DELETE /v1/admin/licenses/{license_key} - Delete a license
//!
//! Both require the `x-admin-secret` header. The secret is checked before the body or path
//! is parsed, so a wrong secret is always a 403.

use crate::{
    error::AppError,
    middleware::auth::CallerMetadata,
    models::license::UpsertLicenseRequest,
    state::AppState,
};
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use serde_json::{Value, json};

/// Upsert a license keyed by `licenseKey`.
///
/// # Request Body
///
/// ```json
/// { "licenseKey": "LIC-1", "productId": "PROD-A", "isActive": true }
/// ```
///
/// # Response
///
/// - **Success (200 OK)**: `{}`
/// - **Error (400)**: Body is not a valid upsert request, or a field is empty
/// - **Error (403)**: Admin secret missing or wrong
/// - **Error (500)**: Store error
pub async fn upsert_license(
    State(state): State<AppState>,
    metadata: CallerMetadata,
    body: Result<Json<UpsertLicenseRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    state.admin.authorize(Some(&metadata))?;
    let Json(request) = body?;

    state.admin.upsert_license(Some(&metadata), &request).await?;
    Ok(Json(json!({})))
}

/// Delete a license. Unknown keys succeed as well.
pub async fn delete_license(
    State(state): State<AppState>,
    metadata: CallerMetadata,
    license_key: Result<Path<String>, PathRejection>,
) -> Result<Json<Value>, AppError> {
    state.admin.authorize(Some(&metadata))?;
    let Path(license_key) = license_key?;

    state.admin.delete_license(Some(&metadata), &license_key).await?;
    Ok(Json(json!({})))
}
