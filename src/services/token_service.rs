//! Token service - issuance and redemption of single-use access tokens.
//!
//! # One-Time Use
//!
//! Redemption and consumption are the same store operation: a conditional delete of the
//! unexpired row followed by a look at the affected-row count. No in-process lock is
//! involved, so any number of concurrent redeemers of one token yields exactly one success.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::error::AppError;
use crate::models::access_token::IssuedToken;
use crate::store::LicenseStore;

/// Lifetime of an access token, measured from issuance.
pub const ACCESS_TOKEN_TTL: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct TokenManager {
    store: Arc<dyn LicenseStore>,
}

impl TokenManager {
    pub fn new(store: Arc<dyn LicenseStore>) -> Self {
        Self { store }
    }

    /// Issue a new access token to the holder of a valid API key.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument`: API key is empty
    /// - `Unauthenticated`: API key is unknown or expired
    /// - `Internal`: store failure
    pub async fn issue_token(&self, api_key: &str) -> Result<IssuedToken, AppError> {
        if api_key.is_empty() {
            return Err(AppError::InvalidArgument("API Key required".to_string()));
        }

        if !self.store.api_key_is_active(api_key).await? {
            tracing::debug!("token requested with unknown or expired API key");
            return Err(AppError::Unauthenticated("Invalid or Expired API Key"));
        }

        let token = Uuid::new_v4().to_string();
        let access_token = self
            .store
            .insert_access_token(&token, ACCESS_TOKEN_TTL)
            .await?;

        tracing::debug!(
            created_at = %access_token.created_at,
            expires_at = %access_token.expires_at,
            "access token issued"
        );

        Ok(IssuedToken {
            token: access_token.token,
            expires_in_seconds: ACCESS_TOKEN_TTL.as_secs(),
        })
    }

    /// Validate and burn a token in one step.
    ///
    /// Never reveals whether the token was never issued, already redeemed, or expired.
    pub async fn redeem_token(&self, token: &str) -> Result<(), AppError> {
        match self.store.delete_unexpired_token(token).await? {
            0 => Err(AppError::Unauthenticated("invalid or expired access token")),
            _ => Ok(()),
        }
    }
}
