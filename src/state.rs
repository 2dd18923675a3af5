//! Shared application state handed to every handler.

use std::sync::Arc;

use crate::services::admin_service::{AdminManager, AdminSecret};
use crate::services::license_service::LicenseValidator;
use crate::services::token_service::TokenManager;
use crate::store::LicenseStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LicenseStore>,
    pub tokens: TokenManager,
    pub licenses: LicenseValidator,
    pub admin: AdminManager,
}

impl AppState {
    pub fn new(store: Arc<dyn LicenseStore>, admin_secret: AdminSecret) -> Self {
        let tokens = TokenManager::new(store.clone());
        let licenses = LicenseValidator::new(store.clone(), tokens.clone());
        let admin = AdminManager::new(store.clone(), admin_secret);

        Self {
            store,
            tokens,
            licenses,
            admin,
        }
    }
}
