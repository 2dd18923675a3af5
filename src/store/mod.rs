//! Persistent store abstraction.
//!
//! The store is the single source of truth for API keys, access tokens and licenses.
//! Services hold no cache; every call is one round-trip, and every method is atomic
//! on its own. Token one-time use rests entirely on [`LicenseStore::delete_unexpired_token`]
//! being a single conditional delete that reports the affected row count.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{access_token::AccessToken, license::License};

#[cfg(test)]
pub mod memory;
pub mod postgres;

#[async_trait]
pub trait LicenseStore: Send + Sync {
    /// Connectivity check used by the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Whether an API key row matching `key` exists with no expiry or an expiry in the future.
    async fn api_key_is_active(&self, key: &str) -> Result<bool, StoreError>;

    /// Insert a token expiring `ttl` after the store's current time.
    async fn insert_access_token(&self, token: &str, ttl: Duration) -> Result<AccessToken, StoreError>;

    /// Delete `token` only if it has not expired. Returns the number of rows removed (0 or 1).
    async fn delete_unexpired_token(&self, token: &str) -> Result<u64, StoreError>;

    /// Bulk delete of every expired token. Returns the number of rows removed.
    async fn delete_expired_tokens(&self) -> Result<u64, StoreError>;

    async fn find_license(&self, license_key: &str, product_id: &str) -> Result<Option<License>, StoreError>;

    /// Set `hwid` on a license whose stored hwid is NULL or empty. Returns rows updated;
    /// 0 means another binding already exists (or the license is gone).
    async fn bind_hwid(&self, license_key: &str, hwid: &str) -> Result<u64, StoreError>;

    /// Insert or update keyed by `license_key`. Leaves `hwid` untouched on conflict.
    async fn upsert_license(&self, license_key: &str, product_id: &str, is_active: bool) -> Result<(), StoreError>;

    async fn delete_license(&self, license_key: &str) -> Result<u64, StoreError>;
}
