//! Bearer-token authentication extractor.
//!
//! Handlers that take a [`UserAuth`] argument require a valid access token.
//! The role claim travels with the token, so capability checks do not need
//! a user lookup.

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use std::str::FromStr;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use domain::models::UserRole;
use shared::jwt::TokenType;

/// Authenticated user identity extracted from the access token.
#[derive(Debug, Clone)]
pub struct UserAuth {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl UserAuth {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Admins and department in-charges can manage inventory.
    pub fn is_staff_level(&self) -> bool {
        matches!(
            self.role,
            UserRole::Admin | UserRole::Incharge | UserRole::Procurement
        )
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Admin access required".into()))
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for UserAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".into()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("Expected Bearer token".into()))?;

        let claims = state.jwt.validate_token(token).map_err(|e| {
            tracing::debug!("Token validation failed: {}", e);
            ApiError::Unauthorized("Invalid or expired token".into())
        })?;

        if claims.token_type != TokenType::Access {
            return Err(ApiError::Unauthorized(
                "Refresh tokens cannot be used for API access".into(),
            ));
        }

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ApiError::Unauthorized("Invalid subject claim".into()))?;
        let role = UserRole::from_str(&claims.role)
            .map_err(|_| ApiError::Unauthorized("Unknown role claim".into()))?;

        Ok(UserAuth { user_id, role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_checks() {
        let admin = UserAuth {
            user_id: Uuid::new_v4(),
            role: UserRole::Admin,
        };
        assert!(admin.is_admin());
        assert!(admin.is_staff_level());
        assert!(admin.require_admin().is_ok());
    }

    #[test]
    fn test_student_is_not_staff_level() {
        let student = UserAuth {
            user_id: Uuid::new_v4(),
            role: UserRole::Student,
        };
        assert!(!student.is_staff_level());
        assert!(student.require_admin().is_err());
    }

    #[test]
    fn test_incharge_is_staff_level_not_admin() {
        let incharge = UserAuth {
            user_id: Uuid::new_v4(),
            role: UserRole::Incharge,
        };
        assert!(incharge.is_staff_level());
        assert!(incharge.require_admin().is_err());
    }
}
