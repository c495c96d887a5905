//! User account administration endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::routes::Paginated;
use crate::services::audit;
use domain::models::user::ChangeRoleRequest;
use domain::models::{AuditAction, User};
use domain::services::audit::audit_helpers;
use domain::services::AuditLogBuilder;
use persistence::repositories::UserRepository;
use shared::pagination::{PageInfo, PageQuery};

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    #[serde(default)]
    pub approved: Option<bool>,
    #[serde(flatten)]
    pub page: PageQuery,
}

pub async fn current_user(
    auth: UserAuth,
    State(state): State<AppState>,
) -> Result<Json<User>, ApiError> {
    let users = UserRepository::new(state.pool.clone());
    let entity = users
        .find_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    Ok(Json(entity.into()))
}

pub async fn list_users(
    auth: UserAuth,
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Paginated<User>>, ApiError> {
    auth.require_admin()?;

    let users = UserRepository::new(state.pool.clone());
    let (limit, offset) = query.page.limit_offset();
    let entities = users.list(query.approved, limit, offset).await?;
    let total = users.count(query.approved).await?;

    Ok(Json(Paginated::new(
        entities.into_iter().map(Into::into).collect(),
        PageInfo::new(&query.page, total),
    )))
}

pub async fn get_user(
    auth: UserAuth,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
    if !auth.is_admin() && auth.user_id != user_id {
        return Err(ApiError::Forbidden(
            "You may only view your own account".into(),
        ));
    }

    let users = UserRepository::new(state.pool.clone());
    let entity = users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    Ok(Json(entity.into()))
}

pub async fn approve_user(
    auth: UserAuth,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
    auth.require_admin()?;

    let users = UserRepository::new(state.pool.clone());
    let Some(entity) = users.approve(user_id).await? else {
        // Guarded update: distinguish missing from already approved.
        return match users.find_by_id(user_id).await? {
            Some(_) => Err(ApiError::InvalidState("User is already approved".into())),
            None => Err(ApiError::NotFound("User not found".into())),
        };
    };

    audit::record(
        &state.pool,
        AuditLogBuilder::user_action(auth.user_id, AuditAction::UserApprove)
            .on_entity("user", user_id.to_string())
            .build(),
    );

    Ok(Json(entity.into()))
}

pub async fn change_role(
    auth: UserAuth,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<ChangeRoleRequest>,
) -> Result<Json<User>, ApiError> {
    auth.require_admin()?;

    let users = UserRepository::new(state.pool.clone());
    let before = users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    let previous: User = before.into();

    let entity = users
        .change_role(user_id, req.role.into())
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    let user: User = entity.into();

    audit::record(
        &state.pool,
        audit_helpers::role_changed(
            auth.user_id,
            user_id,
            previous.role.as_str(),
            user.role.as_str(),
        ),
    );

    Ok(Json(user))
}

pub async fn activate_user(
    auth: UserAuth,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
    auth.require_admin()?;
    set_active(state, auth, user_id, true).await
}

pub async fn deactivate_user(
    auth: UserAuth,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
    auth.require_admin()?;
    if auth.user_id == user_id {
        return Err(ApiError::Validation(
            "You cannot deactivate your own account".into(),
        ));
    }
    set_active(state, auth, user_id, false).await
}

async fn set_active(
    state: AppState,
    auth: UserAuth,
    user_id: Uuid,
    active: bool,
) -> Result<Json<User>, ApiError> {
    let users = UserRepository::new(state.pool.clone());
    let entity = users
        .set_active(user_id, active)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let action = if active {
        AuditAction::UserReactivate
    } else {
        AuditAction::UserDeactivate
    };
    audit::record(
        &state.pool,
        AuditLogBuilder::user_action(auth.user_id, action)
            .on_entity("user", user_id.to_string())
            .build(),
    );

    Ok(Json(entity.into()))
}

#[derive(Debug, Deserialize)]
pub struct BanUserRequest {
    /// Omit for an indefinite ban.
    #[serde(default)]
    pub banned_until: Option<DateTime<Utc>>,
}

pub async fn ban_user(
    auth: UserAuth,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<BanUserRequest>,
) -> Result<Json<User>, ApiError> {
    auth.require_admin()?;

    let users = UserRepository::new(state.pool.clone());
    let entity = users
        .ban(user_id, req.banned_until)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let until = req
        .banned_until
        .map(|d| d.to_rfc3339())
        .unwrap_or_else(|| "indefinite".to_string());
    audit::record(
        &state.pool,
        AuditLogBuilder::user_action(auth.user_id, AuditAction::UserBan)
            .on_entity("user", user_id.to_string())
            .with_change("banned_until", None, Some(until))
            .build(),
    );

    Ok(Json(entity.into()))
}

pub async fn unban_user(
    auth: UserAuth,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
    auth.require_admin()?;

    let users = UserRepository::new(state.pool.clone());
    let entity = users
        .unban(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    audit::record(
        &state.pool,
        AuditLogBuilder::user_action(auth.user_id, AuditAction::UserUnban)
            .on_entity("user", user_id.to_string())
            .build(),
    );

    Ok(Json(entity.into()))
}

pub async fn delete_user(
    auth: UserAuth,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    auth.require_admin()?;
    if auth.user_id == user_id {
        return Err(ApiError::Validation(
            "You cannot delete your own account".into(),
        ));
    }

    let users = UserRepository::new(state.pool.clone());
    let deleted = users.delete(user_id).await.map_err(|e| match &e {
        // Issue and transfer history references users with RESTRICT.
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23503") => {
            ApiError::Conflict("User has borrowing or transfer history".into())
        }
        _ => e.into(),
    })?;
    if !deleted {
        return Err(ApiError::NotFound("User not found".into()));
    }

    audit::record(
        &state.pool,
        AuditLogBuilder::user_action(auth.user_id, AuditAction::UserDelete)
            .on_entity("user", user_id.to_string())
            .build(),
    );

    Ok(StatusCode::NO_CONTENT)
}
