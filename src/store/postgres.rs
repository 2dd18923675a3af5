//! PostgreSQL implementation of [`LicenseStore`].
//!
//! All time comparisons use the database clock (`NOW()`), so expiry is decided in one place
//! no matter how many service processes share the database.

use std::time::Duration;

use async_trait::async_trait;

use super::LicenseStore;
use crate::db::DbPool;
use crate::error::StoreError;
use crate::models::{access_token::AccessToken, license::License};

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LicenseStore for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        if self.pool.is_closed() {
            return Err(StoreError::Unavailable);
        }
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn api_key_is_active(&self, key: &str) -> Result<bool, StoreError> {
        let active = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM api_keys
                WHERE key = $1 AND (expires_at IS NULL OR expires_at > NOW())
            )
            "#,
        )
        .bind(key)
        .fetch_one(&self.pool)
        .await?;

        Ok(active)
    }

    async fn insert_access_token(&self, token: &str, ttl: Duration) -> Result<AccessToken, StoreError> {
        let access_token = sqlx::query_as::<_, AccessToken>(
            r#"
            INSERT INTO access_tokens (token, created_at, expires_at)
            VALUES ($1, NOW(), NOW() + make_interval(secs => $2))
            RETURNING token, created_at, expires_at
            "#,
        )
        .bind(token)
        .bind(ttl.as_secs_f64())
        .fetch_one(&self.pool)
        .await?;

        Ok(access_token)
    }

    async fn delete_unexpired_token(&self, token: &str) -> Result<u64, StoreError> {
        // Check and consume in one statement: concurrent redeemers race on the row lock
        // and only one of them sees rows_affected == 1.
        let deleted = sqlx::query("DELETE FROM access_tokens WHERE token = $1 AND expires_at > NOW()")
            .bind(token)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }

    async fn delete_expired_tokens(&self) -> Result<u64, StoreError> {
        let deleted = sqlx::query("DELETE FROM access_tokens WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }

    async fn find_license(&self, license_key: &str, product_id: &str) -> Result<Option<License>, StoreError> {
        let license = sqlx::query_as::<_, License>(
            r#"
            SELECT is_active, hwid
            FROM licenses
            WHERE license_key = $1 AND product_id = $2
            "#,
        )
        .bind(license_key)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(license)
    }

    async fn bind_hwid(&self, license_key: &str, hwid: &str) -> Result<u64, StoreError> {
        let updated = sqlx::query(
            r#"
            UPDATE licenses
            SET hwid = $1,
                updated_at = NOW()
            WHERE license_key = $2 AND (hwid IS NULL OR hwid = '')
            "#,
        )
        .bind(hwid)
        .bind(license_key)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated)
    }

    async fn upsert_license(&self, license_key: &str, product_id: &str, is_active: bool) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO licenses (license_key, product_id, is_active)
            VALUES ($1, $2, $3)
            ON CONFLICT (license_key)
            DO UPDATE SET product_id = EXCLUDED.product_id,
                          is_active = EXCLUDED.is_active,
                          updated_at = NOW()
            "#,
        )
        .bind(license_key)
        .bind(product_id)
        .bind(is_active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_license(&self, license_key: &str) -> Result<u64, StoreError> {
        let deleted = sqlx::query("DELETE FROM licenses WHERE license_key = $1")
            .bind(license_key)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    //! Run against a scratch database per test: `DATABASE_URL=postgres://... cargo test -- --ignored`.

    use sqlx::PgPool;

    use super::*;

    async fn insert_expired_token(pool: &PgPool, token: &str) {
        sqlx::query(
            "INSERT INTO access_tokens (token, created_at, expires_at) \
             VALUES ($1, NOW() - INTERVAL '1 minute', NOW() - INTERVAL '1 second')",
        )
        .bind(token)
        .execute(pool)
        .await
        .unwrap();
    }

    async fn token_exists(pool: &PgPool, token: &str) -> bool {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM access_tokens WHERE token = $1)")
            .bind(token)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test]
    #[ignore = "needs a PostgreSQL DATABASE_URL"]
    async fn api_key_expiry_is_checked_by_the_database(pool: PgPool) {
        sqlx::query(
            "INSERT INTO api_keys (key, expires_at) VALUES \
             ('forever', NULL), ('later', NOW() + INTERVAL '1 day'), ('gone', NOW() - INTERVAL '1 second')",
        )
        .execute(&pool)
        .await
        .unwrap();
        let store = PgStore::new(pool);

        assert!(store.api_key_is_active("forever").await.unwrap());
        assert!(store.api_key_is_active("later").await.unwrap());
        assert!(!store.api_key_is_active("gone").await.unwrap());
        assert!(!store.api_key_is_active("unknown").await.unwrap());
    }

    #[sqlx::test]
    #[ignore = "needs a PostgreSQL DATABASE_URL"]
    async fn inserted_token_expires_after_ttl(pool: PgPool) {
        let store = PgStore::new(pool);

        let token = store
            .insert_access_token("tok-1", Duration::from_secs(30))
            .await
            .unwrap();

        assert_eq!(token.token, "tok-1");
        assert_eq!((token.expires_at - token.created_at).num_seconds(), 30);
    }

    #[sqlx::test]
    #[ignore = "needs a PostgreSQL DATABASE_URL"]
    async fn concurrent_redeems_delete_the_row_once(pool: PgPool) {
        let store = PgStore::new(pool.clone());
        store
            .insert_access_token("tok-1", Duration::from_secs(30))
            .await
            .unwrap();

        let attempts: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.delete_unexpired_token("tok-1").await.unwrap() })
            })
            .collect();

        let mut deleted = 0;
        for attempt in attempts {
            deleted += attempt.await.unwrap();
        }

        assert_eq!(deleted, 1);
        assert!(!token_exists(&pool, "tok-1").await);
    }

    #[sqlx::test]
    #[ignore = "needs a PostgreSQL DATABASE_URL"]
    async fn expired_token_is_not_redeemable(pool: PgPool) {
        insert_expired_token(&pool, "stale").await;
        let store = PgStore::new(pool.clone());

        assert_eq!(store.delete_unexpired_token("stale").await.unwrap(), 0);
        assert_eq!(store.delete_unexpired_token("never-issued").await.unwrap(), 0);
        // Left for the sweep
        assert!(token_exists(&pool, "stale").await);
    }

    #[sqlx::test]
    #[ignore = "needs a PostgreSQL DATABASE_URL"]
    async fn sweep_removes_only_expired_tokens(pool: PgPool) {
        insert_expired_token(&pool, "stale-1").await;
        insert_expired_token(&pool, "stale-2").await;
        let store = PgStore::new(pool.clone());
        store
            .insert_access_token("live", Duration::from_secs(30))
            .await
            .unwrap();

        assert_eq!(store.delete_expired_tokens().await.unwrap(), 2);
        assert_eq!(store.delete_expired_tokens().await.unwrap(), 0);
        assert!(token_exists(&pool, "live").await);
        assert_eq!(store.delete_unexpired_token("live").await.unwrap(), 1);
    }

    #[sqlx::test]
    #[ignore = "needs a PostgreSQL DATABASE_URL"]
    async fn racing_binds_leave_one_hwid(pool: PgPool) {
        let store = PgStore::new(pool);
        store.upsert_license("LIC-1", "PROD-A", true).await.unwrap();

        let attempts: Vec<_> = ["A", "B", "C", "D", "E", "F", "G", "H"]
            .into_iter()
            .map(|hwid| {
                let store = store.clone();
                tokio::spawn(async move { (hwid, store.bind_hwid("LIC-1", hwid).await.unwrap()) })
            })
            .collect();

        let mut winners = Vec::new();
        for attempt in attempts {
            let (hwid, updated) = attempt.await.unwrap();
            if updated == 1 {
                winners.push(hwid);
            }
        }

        assert_eq!(winners.len(), 1);
        let license = store.find_license("LIC-1", "PROD-A").await.unwrap().unwrap();
        assert_eq!(license.bound_hwid(), Some(winners[0]));
        assert_eq!(store.bind_hwid("LIC-1", "Z").await.unwrap(), 0);
    }

    #[sqlx::test]
    #[ignore = "needs a PostgreSQL DATABASE_URL"]
    async fn empty_hwid_can_still_be_bound(pool: PgPool) {
        let store = PgStore::new(pool.clone());
        store.upsert_license("LIC-1", "PROD-A", true).await.unwrap();
        sqlx::query("UPDATE licenses SET hwid = '' WHERE license_key = 'LIC-1'")
            .execute(&pool)
            .await
            .unwrap();

        assert_eq!(store.bind_hwid("LIC-1", "A").await.unwrap(), 1);
        assert_eq!(store.bind_hwid("NOPE", "A").await.unwrap(), 0);
    }

    #[sqlx::test]
    #[ignore = "needs a PostgreSQL DATABASE_URL"]
    async fn upsert_overwrites_product_and_keeps_hwid(pool: PgPool) {
        let store = PgStore::new(pool);
        store.upsert_license("LIC-1", "PROD-A", true).await.unwrap();
        store.bind_hwid("LIC-1", "A").await.unwrap();

        store.upsert_license("LIC-1", "PROD-B", false).await.unwrap();

        assert_eq!(store.find_license("LIC-1", "PROD-A").await.unwrap(), None);
        let license = store.find_license("LIC-1", "PROD-B").await.unwrap().unwrap();
        assert_eq!(
            license,
            License {
                is_active: false,
                hwid: Some("A".to_string()),
            }
        );
    }

    #[sqlx::test]
    #[ignore = "needs a PostgreSQL DATABASE_URL"]
    async fn delete_license_reports_removed_rows(pool: PgPool) {
        let store = PgStore::new(pool);
        store.upsert_license("LIC-1", "PROD-A", true).await.unwrap();

        assert_eq!(store.delete_license("LIC-1").await.unwrap(), 1);
        assert_eq!(store.delete_license("LIC-1").await.unwrap(), 0);
        assert_eq!(store.find_license("LIC-1", "PROD-A").await.unwrap(), None);
    }
}
