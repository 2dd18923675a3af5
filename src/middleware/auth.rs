//! Caller credential extraction.
//!
//! The gateway forwards exactly two credential headers to the services:
//! - `x-access-token`: single-use token consumed by license validation
//! - `x-admin-secret`: shared secret for the admin operations
//!
//! Header names are matched case-insensitively (HTTP header maps are normalized to lowercase).
//! The services receive the collected values as [`CallerMetadata`] and decide what is required.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};

pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";
pub const ADMIN_SECRET_HEADER: &str = "x-admin-secret";

/// Credential headers forwarded from the caller's request.
#[derive(Default, Clone)]
pub struct CallerMetadata {
    access_token: Option<String>,
    admin_secret: Option<String>,
}

impl CallerMetadata {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            access_token: header_value(headers, ACCESS_TOKEN_HEADER),
            admin_secret: header_value(headers, ADMIN_SECRET_HEADER),
        }
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn admin_secret(&self) -> Option<&str> {
        self.admin_secret.as_deref()
    }

    #[cfg(test)]
    pub fn with_access_token(mut self, token: &str) -> Self {
        self.access_token = Some(token.to_string());
        self
    }

    #[cfg(test)]
    pub fn with_admin_secret(mut self, secret: &str) -> Self {
        self.admin_secret = Some(secret.to_string());
        self
    }
}

// Secrets stay out of logs.
impl std::fmt::Debug for CallerMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallerMetadata")
            .field("access_token", &self.access_token.as_ref().map(|_| "<present>"))
            .field("admin_secret", &self.admin_secret.as_ref().map(|_| "<present>"))
            .finish()
    }
}

/// First value of a header, if it is valid visible ASCII.
fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

impl<S> FromRequestParts<S> for CallerMetadata
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}
