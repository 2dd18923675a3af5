//! License validation.
//!
//! # Process
//!
//! 1. Require an access token in the caller metadata
//! 2. Redeem (burn) the token; any failure stops here
//! 3. Look up the license for `(license_key, product_id)`
//! 4. Apply the activity check and the HWID lock policy
//!
//! # HWID Lock
//!
//! First write wins and is permanent. The binding is a conditional update that only fires
//! while no hwid is stored, so two machines racing on first use cannot both bind.

use std::sync::Arc;

use crate::error::AppError;
use crate::middleware::auth::CallerMetadata;
use crate::models::license::{ValidateLicenseRequest, ValidationOutcome};
use crate::services::token_service::TokenManager;
use crate::store::LicenseStore;

#[derive(Clone)]
pub struct LicenseValidator {
    store: Arc<dyn LicenseStore>,
    tokens: TokenManager,
}

impl LicenseValidator {
    pub fn new(store: Arc<dyn LicenseStore>, tokens: TokenManager) -> Self {
        Self { store, tokens }
    }

    /// Validate a license on behalf of a caller holding a fresh access token.
    ///
    /// # Returns
    ///
    /// A [`ValidationOutcome`]; negative outcomes are successful results, not errors.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated`: metadata or token missing, token invalid/expired/already used
    /// - `Internal`: store failure
    pub async fn validate(
        &self,
        metadata: Option<&CallerMetadata>,
        request: &ValidateLicenseRequest,
    ) -> Result<ValidationOutcome, AppError> {
        self.authenticate(metadata).await?;
        self.check_license(request).await
    }

    /// Require an access token in the caller metadata and burn it.
    ///
    /// The HTTP handler runs this before the request body is parsed.
    pub async fn authenticate(&self, metadata: Option<&CallerMetadata>) -> Result<(), AppError> {
        let metadata = metadata.ok_or(AppError::Unauthenticated("no metadata"))?;
        let token = metadata
            .access_token()
            .ok_or(AppError::Unauthenticated("missing x-access-token header"))?;

        self.tokens.redeem_token(token).await
    }

    /// License lookup and HWID policy for a caller whose token was already redeemed.
    pub async fn check_license(
        &self,
        request: &ValidateLicenseRequest,
    ) -> Result<ValidationOutcome, AppError> {
        let Some(license) = self
            .store
            .find_license(&request.license_key, &request.product_id)
            .await?
        else {
            return Ok(ValidationOutcome::LicenseNotFound);
        };

        if !license.is_active {
            return Ok(ValidationOutcome::LicenseSuspended);
        }

        let Some(hwid) = request.hwid() else {
            return Ok(ValidationOutcome::Authenticated);
        };

        match license.bound_hwid() {
            Some(bound) if bound == hwid => Ok(ValidationOutcome::Authenticated),
            Some(_) => Ok(ValidationOutcome::HwidMismatch),
            None => self.bind_first_hwid(request, hwid).await,
        }
    }

    async fn bind_first_hwid(
        &self,
        request: &ValidateLicenseRequest,
        hwid: &str,
    ) -> Result<ValidationOutcome, AppError> {
        let license_key = request.license_key.as_str();
        if self.store.bind_hwid(license_key, hwid).await? == 1 {
            tracing::info!(license_key, "license bound to hardware id");
            return Ok(ValidationOutcome::Authenticated);
        }

        // Lost a race with another first use; the winner's binding decides.
        tracing::warn!(license_key, "concurrent hardware id binding detected");
        let stored = self
            .store
            .find_license(license_key, &request.product_id)
            .await?;

        match stored.as_ref().and_then(|license| license.bound_hwid()) {
            Some(bound) if bound == hwid => Ok(ValidationOutcome::Authenticated),
            Some(_) => Ok(ValidationOutcome::HwidMismatch),
            None => Ok(ValidationOutcome::LicenseNotFound),
        }
    }
}
