//! Setting repository for database operations.

use domain::models::LoanPolicy;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::entities::SettingEntity;
use crate::metrics::QueryTimer;

/// Repository for portal settings.
#[derive(Clone)]
pub struct SettingRepository {
    pool: PgPool,
}

impl SettingRepository {
    /// Creates a new SettingRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get all settings.
    pub async fn get_all(&self) -> Result<Vec<SettingEntity>, sqlx::Error> {
        let timer = QueryTimer::new("get_all_settings");
        let result = sqlx::query_as::<_, SettingEntity>(
            "SELECT key, value, updated_by, updated_at FROM settings ORDER BY key",
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Get a single setting by key.
    pub async fn get(&self, key: &str) -> Result<Option<SettingEntity>, sqlx::Error> {
        let timer = QueryTimer::new("get_setting");
        let result = sqlx::query_as::<_, SettingEntity>(
            "SELECT key, value, updated_by, updated_at FROM settings WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Upsert a setting value.
    pub async fn upsert(
        &self,
        key: &str,
        value: &str,
        updated_by: Option<Uuid>,
    ) -> Result<SettingEntity, sqlx::Error> {
        let timer = QueryTimer::new("upsert_setting");
        let result = sqlx::query_as::<_, SettingEntity>(
            r#"
            INSERT INTO settings (key, value, updated_by)
            VALUES ($1, $2, $3)
            ON CONFLICT (key)
            DO UPDATE SET value = $2, updated_by = $3, updated_at = NOW()
            RETURNING key, value, updated_by, updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(updated_by)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// All settings as a key/value map.
    pub async fn get_all_map(&self) -> Result<HashMap<String, String>, sqlx::Error> {
        let settings = self.get_all().await?;
        Ok(settings.into_iter().map(|s| (s.key, s.value)).collect())
    }

    /// Resolve the loan policy from the settings store.
    pub async fn load_policy(&self) -> Result<LoanPolicy, sqlx::Error> {
        let map = self.get_all_map().await?;
        Ok(LoanPolicy::from_settings(&map))
    }
}
