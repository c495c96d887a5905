//! Equipment category endpoints.

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
use domain::models::category::{CreateCategoryRequest, UpdateCategoryRequest};
use domain::models::{AuditAction, Category};
use domain::services::AuditLogBuilder;
use persistence::repositories::CategoryRepository;
use shared::validation;

pub async fn create_category(
    auth: UserAuth,
    State(state): State<AppState>,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    if !auth.is_staff_level() {
        return Err(ApiError::Forbidden(
            "Inventory management access required".into(),
        ));
    }

    validation::validate_category_name(&req.name)
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    validation::validate_borrow_duration(req.max_borrow_duration_days)
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let categories = CategoryRepository::new(state.pool.clone());
    let entity = categories
        .create(
            req.name.trim(),
            req.max_borrow_duration_days,
            req.requires_approval,
            req.visible_to_students,
            req.visible_to_staff,
        )
        .await?;
    let category: Category = entity.into();

    audit::record(
        &state.pool,
        AuditLogBuilder::user_action(auth.user_id, AuditAction::CategoryCreate)
            .on_entity("category", category.id.to_string())
            .build(),
    );

    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn list_categories(
    _auth: UserAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = CategoryRepository::new(state.pool.clone());
    let entities = categories.list().await?;
    Ok(Json(entities.into_iter().map(Into::into).collect()))
}

pub async fn get_category(
    _auth: UserAuth,
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
) -> Result<Json<Category>, ApiError> {
    let categories = CategoryRepository::new(state.pool.clone());
    let entity = categories
        .find_by_id(category_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".into()))?;
    Ok(Json(entity.into()))
}

pub async fn update_category(
    auth: UserAuth,
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
    Json(req): Json<UpdateCategoryRequest>,
) -> Result<Json<Category>, ApiError> {
    if !auth.is_staff_level() {
        return Err(ApiError::Forbidden(
            "Inventory management access required".into(),
        ));
    }

    if let Some(name) = &req.name {
        validation::validate_category_name(name)
            .map_err(|e| ApiError::Validation(e.to_string()))?;
    }
    if let Some(days) = req.max_borrow_duration_days {
        validation::validate_borrow_duration(days)
            .map_err(|e| ApiError::Validation(e.to_string()))?;
    }

    let categories = CategoryRepository::new(state.pool.clone());
    let entity = categories
        .update(
            category_id,
            req.name.as_deref().map(str::trim),
            req.max_borrow_duration_days,
            req.requires_approval,
            req.visible_to_students,
            req.visible_to_staff,
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".into()))?;

    audit::record(
        &state.pool,
        AuditLogBuilder::user_action(auth.user_id, AuditAction::CategoryUpdate)
            .on_entity("category", category_id.to_string())
            .build(),
    );

    Ok(Json(entity.into()))
}

pub async fn delete_category(
    auth: UserAuth,
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    auth.require_admin()?;

    let categories = CategoryRepository::new(state.pool.clone());
    let deleted = categories.delete(category_id).await.map_err(|e| match &e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23503") => {
            ApiError::Conflict("Category still contains items".into())
        }
        _ => e.into(),
    })?;
    if !deleted {
        return Err(ApiError::NotFound("Category not found".into()));
    }

    audit::record(
        &state.pool,
        AuditLogBuilder::user_action(auth.user_id, AuditAction::CategoryDelete)
            .on_entity("category", category_id.to_string())
            .build(),
    );

    Ok(StatusCode::NO_CONTENT)
}
