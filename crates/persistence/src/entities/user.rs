//! User entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{User, UserRole};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for user roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum UserRoleDb {
    Admin,
    Incharge,
    Procurement,
    Faculty,
    Staff,
    Student,
    User,
}

impl From<UserRoleDb> for UserRole {
    fn from(role: UserRoleDb) -> Self {
        match role {
            UserRoleDb::Admin => UserRole::Admin,
            UserRoleDb::Incharge => UserRole::Incharge,
            UserRoleDb::Procurement => UserRole::Procurement,
            UserRoleDb::Faculty => UserRole::Faculty,
            UserRoleDb::Staff => UserRole::Staff,
            UserRoleDb::Student => UserRole::Student,
            UserRoleDb::User => UserRole::User,
        }
    }
}

impl From<UserRole> for UserRoleDb {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Admin => UserRoleDb::Admin,
            UserRole::Incharge => UserRoleDb::Incharge,
            UserRole::Procurement => UserRoleDb::Procurement,
            UserRole::Faculty => UserRoleDb::Faculty,
            UserRole::Staff => UserRoleDb::Staff,
            UserRole::Student => UserRoleDb::Student,
            UserRole::User => UserRoleDb::User,
        }
    }
}

/// Database row mapping for the users table.
///
/// Carries the password-reset columns that never leave the persistence
/// layer; the domain model drops them.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub role: UserRoleDb,
    pub is_approved: bool,
    pub is_active: bool,
    pub is_banned: bool,
    pub banned_until: Option<DateTime<Utc>>,
    pub reset_token_hash: Option<String>,
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserEntity> for User {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            email: entity.email,
            password_hash: entity.password_hash,
            display_name: entity.display_name,
            role: entity.role.into(),
            is_approved: entity.is_approved,
            is_active: entity.is_active,
            is_banned: entity.is_banned,
            banned_until: entity.banned_until,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
