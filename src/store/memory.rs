//! In-memory [`LicenseStore`] for tests.
//!
//! Each method takes the mutex once, which gives the same per-statement atomicity the
//! database provides. The clock can be moved forward and the store can be switched to fail.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::LicenseStore;
use crate::error::StoreError;
use crate::models::{access_token::AccessToken, license::License};

/// Full license row as the in-memory store keeps it.
#[derive(Debug, Clone)]
pub struct LicenseRecord {
    pub product_id: String,
    pub is_active: bool,
    pub hwid: Option<String>,
}

impl LicenseRecord {
    fn columns(&self) -> License {
        License {
            is_active: self.is_active,
            hwid: self.hwid.clone(),
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    /// API key to optional expiry
    api_keys: Mutex<HashMap<String, Option<DateTime<Utc>>>>,
    tokens: Mutex<HashMap<String, AccessToken>>,
    licenses: Mutex<HashMap<String, LicenseRecord>>,
    clock_offset: Mutex<chrono::Duration>,
    unavailable: AtomicBool,
    license_lookups: AtomicUsize,
    mutations: AtomicUsize,
}

impl MemoryStore {
    pub fn now(&self) -> DateTime<Utc> {
        Utc::now() + *self.clock_offset.lock().unwrap()
    }

    /// Move the store clock forward.
    pub fn advance(&self, by: Duration) {
        let mut offset = self.clock_offset.lock().unwrap();
        *offset += chrono::Duration::from_std(by).unwrap();
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn add_api_key(&self, key: &str, expires_at: Option<DateTime<Utc>>) {
        self.api_keys
            .lock()
            .unwrap()
            .insert(key.to_string(), expires_at);
    }

    pub fn token_count(&self) -> usize {
        self.tokens.lock().unwrap().len()
    }

    pub fn license(&self, license_key: &str) -> Option<LicenseRecord> {
        self.licenses.lock().unwrap().get(license_key).cloned()
    }

    /// Number of `find_license` calls served so far.
    pub fn license_lookups(&self) -> usize {
        self.license_lookups.load(Ordering::SeqCst)
    }

    /// Number of license mutations (upsert, delete, hwid binding) applied so far.
    pub fn license_mutations(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        Ok(())
    }
}

#[async_trait]
impl LicenseStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.check_available()
    }

    async fn api_key_is_active(&self, key: &str) -> Result<bool, StoreError> {
        self.check_available()?;
        let now = self.now();
        let api_keys = self.api_keys.lock().unwrap();
        Ok(api_keys
            .get(key)
            .is_some_and(|expires_at| expires_at.is_none_or(|expires_at| expires_at > now)))
    }

    async fn insert_access_token(&self, token: &str, ttl: Duration) -> Result<AccessToken, StoreError> {
        self.check_available()?;
        let now = self.now();
        let access_token = AccessToken {
            token: token.to_string(),
            created_at: now,
            expires_at: now + chrono::Duration::from_std(ttl).unwrap(),
        };
        self.tokens
            .lock()
            .unwrap()
            .insert(token.to_string(), access_token.clone());
        Ok(access_token)
    }

    async fn delete_unexpired_token(&self, token: &str) -> Result<u64, StoreError> {
        self.check_available()?;
        let now = self.now();
        let mut tokens = self.tokens.lock().unwrap();
        let live = tokens
            .get(token)
            .is_some_and(|access_token| access_token.expires_at > now);
        if live {
            tokens.remove(token);
        }
        Ok(u64::from(live))
    }

    async fn delete_expired_tokens(&self) -> Result<u64, StoreError> {
        self.check_available()?;
        let now = self.now();
        let mut tokens = self.tokens.lock().unwrap();
        let before = tokens.len();
        tokens.retain(|_, access_token| access_token.expires_at > now);
        Ok((before - tokens.len()) as u64)
    }

    async fn find_license(&self, license_key: &str, product_id: &str) -> Result<Option<License>, StoreError> {
        self.check_available()?;
        self.license_lookups.fetch_add(1, Ordering::SeqCst);
        let licenses = self.licenses.lock().unwrap();
        Ok(licenses
            .get(license_key)
            .filter(|license| license.product_id == product_id)
            .map(LicenseRecord::columns))
    }

    async fn bind_hwid(&self, license_key: &str, hwid: &str) -> Result<u64, StoreError> {
        self.check_available()?;
        let mut licenses = self.licenses.lock().unwrap();
        match licenses.get_mut(license_key) {
            Some(license) if license.hwid.as_deref().is_none_or(str::is_empty) => {
                license.hwid = Some(hwid.to_string());
                self.mutations.fetch_add(1, Ordering::SeqCst);
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn upsert_license(&self, license_key: &str, product_id: &str, is_active: bool) -> Result<(), StoreError> {
        self.check_available()?;
        let mut licenses = self.licenses.lock().unwrap();
        licenses
            .entry(license_key.to_string())
            .and_modify(|license| {
                license.product_id = product_id.to_string();
                license.is_active = is_active;
            })
            .or_insert_with(|| LicenseRecord {
                product_id: product_id.to_string(),
                is_active,
                hwid: None,
            });
        self.mutations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete_license(&self, license_key: &str) -> Result<u64, StoreError> {
        self.check_available()?;
        self.mutations.fetch_add(1, Ordering::SeqCst);
        let removed = self.licenses.lock().unwrap().remove(license_key);
        Ok(u64::from(removed.is_some()))
    }
}
