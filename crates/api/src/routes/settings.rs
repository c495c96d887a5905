//! Portal settings endpoints.
//!
//! Settings are stored as strings; the lifecycle engines resolve them through
//! `LoanPolicy`, so updates are validated against the key they target.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::services::audit;
use domain::models::setting::{keys, UpdateSettingRequest};
use domain::models::LoanPolicy;
use domain::services::audit::audit_helpers;
use persistence::entities::SettingEntity;
use persistence::repositories::SettingRepository;

#[derive(Debug, Serialize)]
pub struct SettingResponse {
    pub key: String,
    pub value: String,
    pub updated_by: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

impl From<SettingEntity> for SettingResponse {
    fn from(entity: SettingEntity) -> Self {
        Self {
            key: entity.key,
            value: entity.value,
            updated_by: entity.updated_by,
            updated_at: entity.updated_at,
        }
    }
}

/// The stored rows plus the policy they resolve to, defaults filled in.
#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub settings: Vec<SettingResponse>,
    pub effective_policy: LoanPolicy,
}

pub async fn list_settings(
    auth: UserAuth,
    State(state): State<AppState>,
) -> Result<Json<SettingsResponse>, ApiError> {
    auth.require_admin()?;

    let repo = SettingRepository::new(state.pool.clone());
    let entities = repo.get_all().await?;
    let effective_policy = repo.load_policy().await?;

    Ok(Json(SettingsResponse {
        settings: entities.into_iter().map(Into::into).collect(),
        effective_policy,
    }))
}

fn validate_setting(key: &str, value: &str) -> Result<(), ApiError> {
    match key {
        keys::LATE_RETURN_AUTO_BAN
        | keys::REMINDER_3DAYS_ENABLED
        | keys::REMINDER_1DAY_ENABLED
        | keys::OVERDUE_NOTICE_ENABLED => {
            value.parse::<bool>().map_err(|_| {
                ApiError::Validation(format!("{} must be true or false", key))
            })?;
        }
        keys::LATE_RETURN_BAN_MONTHS => {
            let months = value.parse::<u32>().map_err(|_| {
                ApiError::Validation(format!("{} must be a whole number of months", key))
            })?;
            if months < 1 {
                return Err(ApiError::Validation(format!(
                    "{} must be at least one month",
                    key
                )));
            }
        }
        keys::MAX_ITEMS_PER_USER => {
            let max = value.parse::<i64>().map_err(|_| {
                ApiError::Validation(format!("{} must be a whole number", key))
            })?;
            if max < 1 {
                return Err(ApiError::Validation(format!(
                    "{} must be at least one",
                    key
                )));
            }
        }
        _ => return Err(ApiError::NotFound(format!("Unknown setting key: {}", key))),
    }
    Ok(())
}

pub async fn update_setting(
    auth: UserAuth,
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<UpdateSettingRequest>,
) -> Result<Json<SettingResponse>, ApiError> {
    auth.require_admin()?;

    let value = req.value.trim();
    validate_setting(&key, value)?;

    let repo = SettingRepository::new(state.pool.clone());
    let old_value = repo.get(&key).await?.map(|s| s.value);
    let entity = repo.upsert(&key, value, Some(auth.user_id)).await?;

    audit::record(
        &state.pool,
        audit_helpers::setting_updated(auth.user_id, &key, old_value, value),
    );

    Ok(Json(entity.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_boolean_settings() {
        assert!(validate_setting(keys::LATE_RETURN_AUTO_BAN, "true").is_ok());
        assert!(validate_setting(keys::REMINDER_1DAY_ENABLED, "false").is_ok());
        assert!(validate_setting(keys::OVERDUE_NOTICE_ENABLED, "yes").is_err());
    }

    #[test]
    fn test_validate_numeric_settings() {
        assert!(validate_setting(keys::LATE_RETURN_BAN_MONTHS, "6").is_ok());
        assert!(validate_setting(keys::LATE_RETURN_BAN_MONTHS, "0").is_err());
        assert!(validate_setting(keys::MAX_ITEMS_PER_USER, "3").is_ok());
        assert!(validate_setting(keys::MAX_ITEMS_PER_USER, "-1").is_err());
        assert!(validate_setting(keys::MAX_ITEMS_PER_USER, "many").is_err());
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(matches!(
            validate_setting("grace_period_days", "2"),
            Err(ApiError::NotFound(_))
        ));
    }
}
