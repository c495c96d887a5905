//! User domain models and portal roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Portal role of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Incharge,
    Procurement,
    Faculty,
    Staff,
    Student,
    User,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Incharge => "incharge",
            UserRole::Procurement => "procurement",
            UserRole::Faculty => "faculty",
            UserRole::Staff => "staff",
            UserRole::Student => "student",
            UserRole::User => "user",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "incharge" => Ok(UserRole::Incharge),
            "procurement" => Ok(UserRole::Procurement),
            "faculty" => Ok(UserRole::Faculty),
            "staff" => Ok(UserRole::Staff),
            "student" => Ok(UserRole::Student),
            "user" => Ok(UserRole::User),
            _ => Err(()),
        }
    }
}

/// A portal user account.
///
/// `banned_until = None` while `is_banned` is true means an indefinite ban
/// that only an admin can lift.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub display_name: String,
    pub role: UserRole,
    pub is_approved: bool,
    pub is_active: bool,
    pub is_banned: bool,
    pub banned_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to register a new account (created unapproved).
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
    #[serde(default)]
    pub role: Option<UserRole>,
}

/// Request to log in.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response after a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserSummary,
}

/// Brief user info for embedding in responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: UserRole,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            role: user.role,
        }
    }
}

/// Request to change a user's role (admin only).
#[derive(Debug, Clone, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: UserRole,
}

/// Request to start a password reset.
#[derive(Debug, Clone, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Request to complete a password reset.
#[derive(Debug, Clone, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [
            UserRole::Admin,
            UserRole::Incharge,
            UserRole::Procurement,
            UserRole::Faculty,
            UserRole::Staff,
            UserRole::Student,
            UserRole::User,
        ] {
            assert_eq!(UserRole::from_str(role.as_str()), Ok(role));
        }
    }

    #[test]
    fn test_role_from_str_rejects_unknown() {
        assert!(UserRole::from_str("superuser").is_err());
        assert!(UserRole::from_str("ADMIN").is_err());
    }

    #[test]
    fn test_role_serde_lowercase() {
        let json = serde_json::to_string(&UserRole::Incharge).unwrap();
        assert_eq!(json, r#""incharge""#);
        let role: UserRole = serde_json::from_str(r#""procurement""#).unwrap();
        assert_eq!(role, UserRole::Procurement);
    }

    #[test]
    fn test_register_request_deserialize() {
        let json = r#"{"email":"a@example.edu","password":"pass1234","display_name":"A"}"#;
        let req: RegisterRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.email, "a@example.edu");
        assert!(req.role.is_none());
    }
}
