//! Admin operations on license records, gated by a shared secret.
//!
//! The secret is injected at construction from [`crate::config::Config`]; it is never read
//! from the environment per call.

use std::sync::Arc;

use crate::error::AppError;
use crate::middleware::auth::CallerMetadata;
use crate::models::license::UpsertLicenseRequest;
use crate::store::LicenseStore;

/// Shared admin secret. Compared byte-for-byte against the `x-admin-secret` header.
#[derive(Clone)]
pub struct AdminSecret(Arc<str>);

impl AdminSecret {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self(secret.into())
    }

    fn matches(&self, candidate: &str) -> bool {
        self.0.as_bytes() == candidate.as_bytes()
    }
}

impl std::fmt::Debug for AdminSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AdminSecret(<redacted>)")
    }
}

#[derive(Clone)]
pub struct AdminManager {
    store: Arc<dyn LicenseStore>,
    secret: AdminSecret,
}

impl AdminManager {
    pub fn new(store: Arc<dyn LicenseStore>, secret: AdminSecret) -> Self {
        Self { store, secret }
    }

    /// Check the caller's admin secret. Runs before any store access.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated`: no caller metadata at all
    /// - `PermissionDenied`: secret header missing or wrong
    pub fn authorize(&self, metadata: Option<&CallerMetadata>) -> Result<(), AppError> {
        let metadata = metadata.ok_or(AppError::Unauthenticated("metadata missing"))?;

        match metadata.admin_secret() {
            Some(candidate) if self.secret.matches(candidate) => Ok(()),
            _ => {
                tracing::warn!("admin request rejected: invalid admin secret");
                Err(AppError::PermissionDenied("invalid admin secret"))
            }
        }
    }

    /// Insert or update a license keyed by `license_key`.
    ///
    /// Always overwrites `product_id` and `is_active`; an existing hwid binding is kept.
    pub async fn upsert_license(
        &self,
        metadata: Option<&CallerMetadata>,
        request: &UpsertLicenseRequest,
    ) -> Result<(), AppError> {
        self.authorize(metadata)?;

        if request.license_key.is_empty() {
            return Err(AppError::InvalidArgument("license key required".to_string()));
        }
        if request.product_id.is_empty() {
            return Err(AppError::InvalidArgument("product id required".to_string()));
        }

        self.store
            .upsert_license(&request.license_key, &request.product_id, request.is_active)
            .await?;

        tracing::info!(
            license_key = %request.license_key,
            product_id = %request.product_id,
            is_active = request.is_active,
            "license upserted"
        );

        Ok(())
    }

    /// Delete a license. Deleting a key that does not exist succeeds.
    pub async fn delete_license(
        &self,
        metadata: Option<&CallerMetadata>,
        license_key: &str,
    ) -> Result<(), AppError> {
        self.authorize(metadata)?;

        let deleted = self.store.delete_license(license_key).await?;
        tracing::info!(license_key, deleted, "license deleted");

        Ok(())
    }
}
