//! Registration, login, token refresh and password reset.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::audit;
use domain::models::user::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, RegisterRequest, ResetPasswordRequest,
    User, UserRole, UserSummary,
};
use domain::services::AuditLogBuilder;
use persistence::repositories::UserRepository;
use shared::jwt::TokenType;
use shared::{crypto, password, validation};

/// Roles an account may self-select at registration. Privileged roles are
/// granted by an admin afterwards.
fn registerable(role: UserRole) -> bool {
    matches!(
        role,
        UserRole::Faculty | UserRole::Staff | UserRole::Student | UserRole::User
    )
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserSummary>), ApiError> {
    let email = req.email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(ApiError::Validation("Invalid email address".into()));
    }

    let allowed_domain = &state.config.security.allowed_email_domain;
    if !allowed_domain.is_empty() {
        validation::validate_institutional_email(&email, allowed_domain)
            .map_err(|e| ApiError::Validation(e.to_string()))?;
    }

    validation::validate_password_strength(&req.password)
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    validation::validate_non_empty(&req.display_name)
        .map_err(|_| ApiError::Validation("Display name must not be empty".into()))?;

    let role = req.role.unwrap_or(UserRole::Student);
    if !registerable(role) {
        return Err(ApiError::Validation(
            "This role cannot be self-registered".into(),
        ));
    }

    let password_hash =
        password::hash_password(&req.password).map_err(|e| ApiError::Internal(e.to_string()))?;

    let users = UserRepository::new(state.pool.clone());
    let entity = users
        .create(&email, &password_hash, req.display_name.trim(), role.into())
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                ApiError::Conflict("An account with this email already exists".into())
            }
            _ => e.into(),
        })?;
    let user: User = entity.into();

    audit::record(
        &state.pool,
        AuditLogBuilder::user_action(user.id, domain::models::AuditAction::UserRegister)
            .on_entity("user", user.id.to_string())
            .build(),
    );

    Ok((StatusCode::CREATED, Json(UserSummary::from(&user))))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let users = UserRepository::new(state.pool.clone());
    let entity = users
        .find_by_email(req.email.trim())
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".into()))?;
    let user: User = entity.into();

    let valid = password::verify_password(&req.password, &user.password_hash)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    if !valid {
        return Err(ApiError::Unauthorized("Invalid email or password".into()));
    }

    if !user.is_active {
        return Err(ApiError::Forbidden("Account is deactivated".into()));
    }

    let (access_token, _) = state
        .jwt
        .generate_access_token(user.id, user.role.as_str())
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let (refresh_token, _) = state
        .jwt
        .generate_refresh_token(user.id, user.role.as_str())
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(LoginResponse {
        access_token,
        refresh_token,
        user: UserSummary::from(&user),
    }))
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let claims = state
        .jwt
        .validate_token(&req.refresh_token)
        .map_err(|_| ApiError::Unauthorized("Invalid or expired refresh token".into()))?;

    if claims.token_type != TokenType::Refresh {
        return Err(ApiError::Unauthorized("Not a refresh token".into()));
    }

    let user_id = uuid::Uuid::parse_str(&claims.sub)
        .map_err(|_| ApiError::Unauthorized("Invalid subject claim".into()))?;

    // Re-read the account so new tokens carry the current role and a
    // deactivated account cannot refresh its way back in.
    let users = UserRepository::new(state.pool.clone());
    let entity = users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".into()))?;
    let user: User = entity.into();

    if !user.is_active {
        return Err(ApiError::Forbidden("Account is deactivated".into()));
    }

    let (access_token, _) = state
        .jwt
        .generate_access_token(user.id, user.role.as_str())
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let (refresh_token, _) = state
        .jwt
        .generate_refresh_token(user.id, user.role.as_str())
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(RefreshResponse {
        access_token,
        refresh_token,
    }))
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let users = UserRepository::new(state.pool.clone());

    // Same response whether or not the account exists.
    if let Some(entity) = users.find_by_email(req.email.trim()).await? {
        let user: User = entity.into();
        let token = crypto::generate_reset_token();
        let token_hash = crypto::sha256_hex(&token);
        let expires_at =
            Utc::now() + Duration::hours(state.config.security.reset_token_expiry_hours);

        users.set_reset_token(user.id, &token_hash, expires_at).await?;

        if let Err(e) = state
            .email
            .send_password_reset_email(&user.email, Some(&user.display_name), &token)
            .await
        {
            tracing::error!(user_id = %user.id, error = %e, "Failed to send reset email");
        }
    }

    Ok(Json(MessageResponse {
        message: "If the account exists, a reset email has been sent".to_string(),
    }))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    validation::validate_password_strength(&req.new_password)
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let users = UserRepository::new(state.pool.clone());
    let token_hash = crypto::sha256_hex(&req.token);
    let entity = users
        .find_by_reset_token(&token_hash)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired reset token".into()))?;

    let password_hash = password::hash_password(&req.new_password)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    users.reset_password(entity.id, &password_hash).await?;

    Ok(Json(MessageResponse {
        message: "Password has been reset".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registerable_roles() {
        assert!(registerable(UserRole::Student));
        assert!(registerable(UserRole::Faculty));
        assert!(registerable(UserRole::Staff));
        assert!(registerable(UserRole::User));
        assert!(!registerable(UserRole::Admin));
        assert!(!registerable(UserRole::Incharge));
        assert!(!registerable(UserRole::Procurement));
    }
}
