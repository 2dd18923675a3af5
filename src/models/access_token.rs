//! Single-use access token model and the token issuance API types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents an access token record from the database.
///
/// # Database Table
///
/// Maps to the `access_tokens` table. A row exists only while the token is neither
/// redeemed nor swept after expiry. Absence of a row is always treated as "invalid";
/// the cause is never distinguished.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccessToken {
    /// Server-generated opaque identifier
    pub token: String,

    pub created_at: DateTime<Utc>,

    /// Redemption is refused at or after this instant
    pub expires_at: DateTime<Utc>,
}

/// Request body for issuing an access token.
///
/// ```json
/// { "apiKey": "valid-key" }
/// ```
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueTokenRequest {
    #[serde(default)]
    pub api_key: String,
}

/// Response returned after a token is issued.
///
/// ```json
/// { "token": "3f1c0e1a-...", "expiresInSeconds": 30 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    pub token: String,

    pub expires_in_seconds: u64,
}
