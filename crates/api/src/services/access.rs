//! Capability checks that need a database lookup.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::extractors::UserAuth;
use persistence::repositories::DepartmentRepository;

/// Admins pass; everyone else must be the in-charge of the department.
pub async fn ensure_department_manager(
    pool: &PgPool,
    auth: &UserAuth,
    department_id: Uuid,
) -> Result<(), ApiError> {
    if auth.is_admin() {
        return Ok(());
    }

    let repo = DepartmentRepository::new(pool.clone());
    if repo.is_incharge_of(auth.user_id, department_id).await? {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Only the department in-charge can perform this action".into(),
        ))
    }
}

/// Admins and department in-charges of any department may manage inventory.
pub async fn ensure_inventory_manager(pool: &PgPool, auth: &UserAuth) -> Result<(), ApiError> {
    if auth.is_staff_level() {
        return Ok(());
    }

    // Incharge assignments live in the departments table, so a stale role
    // claim falls back to a lookup.
    let repo = DepartmentRepository::new(pool.clone());
    let managed = repo.managed_by(auth.user_id).await?;
    if managed.is_empty() {
        Err(ApiError::Forbidden(
            "Inventory management access required".into(),
        ))
    } else {
        Ok(())
    }
}
