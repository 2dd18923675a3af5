//! License data models and API request/response types.
//!
//! This module defines:
//! - `License`: Database entity representing an entitlement
//! - `ValidationOutcome`: The result of a successful validation call
//! - Request bodies for validation and the admin operations

use serde::{Deserialize, Serialize};

/// The columns of a `licenses` row that validation decides on.
///
/// # HWID Binding
///
/// `hwid` starts out `NULL` (or empty). The first validation that supplies a hardware id
/// binds it, and validation never overwrites it afterwards.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct License {
    /// Suspended licenses validate as `valid: false`
    pub is_active: bool,

    pub hwid: Option<String>,
}

impl License {
    /// The bound hardware id, if any. An empty string counts as unbound.
    pub fn bound_hwid(&self) -> Option<&str> {
        self.hwid.as_deref().filter(|hwid| !hwid.is_empty())
    }
}

/// Request body for license validation.
///
/// The access token travels in the `x-access-token` header, not in the body.
///
/// ```json
/// { "licenseKey": "LIC-1", "productId": "PROD-A", "hwid": "A" }
/// ```
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateLicenseRequest {
    pub license_key: String,

    pub product_id: String,

    /// Optional hardware id; an empty string is treated as absent
    #[serde(default)]
    pub hwid: Option<String>,
}

impl ValidateLicenseRequest {
    pub fn hwid(&self) -> Option<&str> {
        self.hwid.as_deref().filter(|hwid| !hwid.is_empty())
    }
}

/// Result of a validation that got past the access token check.
///
/// Every variant is a well-formed answer, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationOutcome {
    Authenticated,
    LicenseNotFound,
    LicenseSuspended,
    HwidMismatch,
}

impl ValidationOutcome {
    pub fn is_valid(self) -> bool {
        matches!(self, ValidationOutcome::Authenticated)
    }

    pub fn message(self) -> &'static str {
        match self {
            ValidationOutcome::Authenticated => "Authenticated",
            ValidationOutcome::LicenseNotFound => "License not found",
            ValidationOutcome::LicenseSuspended => "License is suspended",
            ValidationOutcome::HwidMismatch => "HWID mismatch",
        }
    }
}

/// Response returned by license validation.
///
/// ```json
/// { "valid": false, "message": "License not found", "reason": "license_not_found" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidateLicenseResponse {
    pub valid: bool,

    pub message: String,

    pub reason: ValidationOutcome,
}

impl From<ValidationOutcome> for ValidateLicenseResponse {
    fn from(outcome: ValidationOutcome) -> Self {
        Self {
            valid: outcome.is_valid(),
            message: outcome.message().to_string(),
            reason: outcome,
        }
    }
}

/// Request body for the admin upsert.
///
/// ```json
/// { "licenseKey": "LIC-1", "productId": "PROD-A", "isActive": true }
/// ```
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertLicenseRequest {
    pub license_key: String,

    pub product_id: String,

    pub is_active: bool,
}
