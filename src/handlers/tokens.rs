//! Access token issuance.
//!
//! - POST /v1/auth/token - Exchange an API key for a single-use access token

use crate::{
    error::AppError,
    models::access_token::{IssueTokenRequest, IssuedToken},
    state::AppState,
};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

/// Issue an access token.
///
/// # Request Body
///
/// ```json
/// { "apiKey": "valid-key" }
/// ```
///
/// # Response
///
/// - **Success (200 OK)**: `{"token": "...", "expiresInSeconds": 30}`
/// - **Error (400)**: API key missing or empty, or the body is not JSON
/// - **Error (401)**: API key unknown or expired
/// - **Error (500)**: Store error
pub async fn issue_token(
    State(state): State<AppState>,
    body: Result<Json<IssueTokenRequest>, JsonRejection>,
) -> Result<Json<IssuedToken>, AppError> {
    let Json(request) = body?;
    let issued = state.tokens.issue_token(&request.api_key).await?;
    Ok(Json(issued))
}
