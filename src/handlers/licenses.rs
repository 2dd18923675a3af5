//! License validation endpoint.
//!
//! - POST /v1/license/validate - Burn an access token and check a license

use crate::{
    error::AppError,
    middleware::auth::CallerMetadata,
    models::license::{ValidateLicenseRequest, ValidateLicenseResponse},
    state::AppState,
};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

/// Validate a license.
///
/// # Headers
///
/// `x-access-token: <token>` obtained from `POST /v1/auth/token`. The token is consumed
/// by this call whatever the license outcome, and it is checked before the body is read.
///
/// # Request Body
///
/// ```json
/// { "licenseKey": "LIC-1", "productId": "PROD-A", "hwid": "A" }
/// ```
///
/// # Response
///
/// - **Success (200 OK)**: `{"valid": bool, "message": "...", "reason": "..."}`.
///   Unknown, suspended and HWID-mismatched licenses are `valid: false` here, not errors.
/// - **Error (400)**: Body is not a valid validation request (the token is still consumed)
/// - **Error (401)**: Token header missing, or token invalid/expired/already used
/// - **Error (500)**: Store error
pub async fn validate_license(
    State(state): State<AppState>,
    metadata: CallerMetadata,
    body: Result<Json<ValidateLicenseRequest>, JsonRejection>,
) -> Result<Json<ValidateLicenseResponse>, AppError> {
    state.licenses.authenticate(Some(&metadata)).await?;
    let Json(request) = body?;

    let outcome = state.licenses.check_license(&request).await?;
    Ok(Json(outcome.into()))
}
