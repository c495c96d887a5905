//! Department management endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::services::audit;
use domain::models::department::{
    AssignInchargeRequest, CreateDepartmentRequest, UpdateDepartmentRequest,
};
use domain::models::{AuditAction, Department, UserRole};
use domain::services::AuditLogBuilder;
use persistence::repositories::{DepartmentRepository, UserRepository};
use shared::validation;

pub async fn create_department(
    auth: UserAuth,
    State(state): State<AppState>,
    Json(req): Json<CreateDepartmentRequest>,
) -> Result<(StatusCode, Json<Department>), ApiError> {
    auth.require_admin()?;

    let code = req.code.trim().to_uppercase();
    validation::validate_department_code(&code)
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    validation::validate_non_empty(&req.name)
        .map_err(|_| ApiError::Validation("Department name must not be empty".into()))?;

    let departments = DepartmentRepository::new(state.pool.clone());
    let entity = departments
        .create(req.name.trim(), &code)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                ApiError::Conflict("Department name or code is already in use".into())
            }
            _ => e.into(),
        })?;
    let department: Department = entity.into();

    audit::record(
        &state.pool,
        AuditLogBuilder::user_action(auth.user_id, AuditAction::DepartmentCreate)
            .on_entity("department", department.id.to_string())
            .build(),
    );

    Ok((StatusCode::CREATED, Json(department)))
}

pub async fn list_departments(
    _auth: UserAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Department>>, ApiError> {
    let departments = DepartmentRepository::new(state.pool.clone());
    let entities = departments.list().await?;
    Ok(Json(entities.into_iter().map(Into::into).collect()))
}

pub async fn get_department(
    _auth: UserAuth,
    State(state): State<AppState>,
    Path(department_id): Path<Uuid>,
) -> Result<Json<Department>, ApiError> {
    let departments = DepartmentRepository::new(state.pool.clone());
    let entity = departments
        .find_by_id(department_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Department not found".into()))?;
    Ok(Json(entity.into()))
}

pub async fn update_department(
    auth: UserAuth,
    State(state): State<AppState>,
    Path(department_id): Path<Uuid>,
    Json(req): Json<UpdateDepartmentRequest>,
) -> Result<Json<Department>, ApiError> {
    auth.require_admin()?;
    validation::validate_non_empty(&req.name)
        .map_err(|_| ApiError::Validation("Department name must not be empty".into()))?;

    let departments = DepartmentRepository::new(state.pool.clone());
    let entity = departments
        .update_name(department_id, req.name.trim())
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                ApiError::Conflict("Department name is already in use".into())
            }
            _ => e.into(),
        })?
        .ok_or_else(|| ApiError::NotFound("Department not found".into()))?;

    audit::record(
        &state.pool,
        AuditLogBuilder::user_action(auth.user_id, AuditAction::DepartmentUpdate)
            .on_entity("department", department_id.to_string())
            .build(),
    );

    Ok(Json(entity.into()))
}

pub async fn assign_incharge(
    auth: UserAuth,
    State(state): State<AppState>,
    Path(department_id): Path<Uuid>,
    Json(req): Json<AssignInchargeRequest>,
) -> Result<Json<Department>, ApiError> {
    auth.require_admin()?;

    let users = UserRepository::new(state.pool.clone());
    let incharge = users
        .find_by_id(req.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    let role: UserRole = incharge.role.into();
    if !matches!(role, UserRole::Incharge | UserRole::Admin) {
        return Err(ApiError::Validation(
            "The assigned user must hold the incharge role".into(),
        ));
    }

    let departments = DepartmentRepository::new(state.pool.clone());
    let entity = departments
        .assign_incharge(department_id, Some(req.user_id))
        .await?
        .ok_or_else(|| ApiError::NotFound("Department not found".into()))?;

    audit::record(
        &state.pool,
        AuditLogBuilder::user_action(auth.user_id, AuditAction::InchargeAssign)
            .on_entity("department", department_id.to_string())
            .with_change("incharge_id", None, Some(req.user_id.to_string()))
            .build(),
    );

    Ok(Json(entity.into()))
}

pub async fn remove_incharge(
    auth: UserAuth,
    State(state): State<AppState>,
    Path(department_id): Path<Uuid>,
) -> Result<Json<Department>, ApiError> {
    auth.require_admin()?;

    let departments = DepartmentRepository::new(state.pool.clone());
    let entity = departments
        .assign_incharge(department_id, None)
        .await?
        .ok_or_else(|| ApiError::NotFound("Department not found".into()))?;

    audit::record(
        &state.pool,
        AuditLogBuilder::user_action(auth.user_id, AuditAction::InchargeRemove)
            .on_entity("department", department_id.to_string())
            .build(),
    );

    Ok(Json(entity.into()))
}

pub async fn delete_department(
    auth: UserAuth,
    State(state): State<AppState>,
    Path(department_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    auth.require_admin()?;

    let departments = DepartmentRepository::new(state.pool.clone());
    let deleted = departments.delete(department_id).await.map_err(|e| match &e {
        // Items still reference the department.
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23503") => {
            ApiError::Conflict("Department still owns inventory items".into())
        }
        _ => e.into(),
    })?;
    if !deleted {
        return Err(ApiError::NotFound("Department not found".into()));
    }

    audit::record(
        &state.pool,
        AuditLogBuilder::user_action(auth.user_id, AuditAction::DepartmentDelete)
            .on_entity("department", department_id.to_string())
            .build(),
    );

    Ok(StatusCode::NO_CONTENT)
}
