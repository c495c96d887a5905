//! Inventory item endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::routes::Paginated;
use crate::services::{access, audit};
use domain::models::item::{CreateItemRequest, GrantAccessRequest, UpdateItemRequest};
use domain::models::{AuditAction, Item, UserRole};
use domain::services::AuditLogBuilder;
use persistence::entities::ItemAccessEntity;
use persistence::repositories::item::NewItem;
use persistence::repositories::{DepartmentRepository, ItemRepository};
use shared::pagination::{PageInfo, PageQuery};
use shared::validation;

/// Procurement can stock any department; everyone else needs to manage it.
async fn ensure_can_stock(
    state: &AppState,
    auth: &UserAuth,
    department_id: Uuid,
) -> Result<(), ApiError> {
    if auth.role == UserRole::Procurement {
        return Ok(());
    }
    access::ensure_department_manager(&state.pool, auth, department_id).await
}

pub async fn create_item(
    auth: UserAuth,
    State(state): State<AppState>,
    Json(req): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<Item>), ApiError> {
    ensure_can_stock(&state, &auth, req.department_id).await?;

    validation::validate_non_empty(&req.name)
        .map_err(|_| ApiError::Validation("Item name must not be empty".into()))?;

    if req.is_consumable {
        let stock = req
            .current_stock
            .ok_or_else(|| ApiError::Validation("Consumables need a current stock".into()))?;
        if stock < 0 {
            return Err(ApiError::Validation("Stock cannot be negative".into()));
        }
    } else if req.current_stock.is_some() || req.min_stock_level.is_some() {
        return Err(ApiError::Validation(
            "Stock fields only apply to consumables".into(),
        ));
    }

    let departments = DepartmentRepository::new(state.pool.clone());
    let department = departments
        .find_by_id(req.department_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Department not found".into()))?;

    let items = ItemRepository::new(state.pool.clone());
    let entity = items
        .create(
            &department.code,
            NewItem {
                name: req.name.trim(),
                category_id: req.category_id,
                department_id: req.department_id,
                condition: req.condition.into(),
                is_consumable: req.is_consumable,
                current_stock: req.current_stock,
                min_stock_level: req.min_stock_level,
                description: req.description.as_deref(),
                specifications: req.specifications.as_deref(),
                image_url: req.image_url.as_deref(),
            },
        )
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23503") => {
                ApiError::NotFound("Category not found".into())
            }
            _ => e.into(),
        })?;
    let item: Item = entity.into();

    audit::record(
        &state.pool,
        AuditLogBuilder::user_action(auth.user_id, AuditAction::ItemCreate)
            .on_entity("item", item.manual_id.clone())
            .build(),
    );

    Ok((StatusCode::CREATED, Json(item)))
}

#[derive(Debug, Deserialize)]
pub struct ListItemsQuery {
    #[serde(default)]
    pub department_id: Option<Uuid>,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(flatten)]
    pub page: PageQuery,
}

pub async fn list_items(
    _auth: UserAuth,
    State(state): State<AppState>,
    Query(query): Query<ListItemsQuery>,
) -> Result<Json<Paginated<Item>>, ApiError> {
    let items = ItemRepository::new(state.pool.clone());
    let (limit, offset) = query.page.limit_offset();
    let entities = items
        .list(query.department_id, query.category_id, limit, offset)
        .await?;
    let total = items.count(query.department_id, query.category_id).await?;

    Ok(Json(Paginated::new(
        entities.into_iter().map(Into::into).collect(),
        PageInfo::new(&query.page, total),
    )))
}

#[derive(Debug, Deserialize)]
pub struct LowStockQuery {
    #[serde(default)]
    pub department_id: Option<Uuid>,
}

pub async fn list_low_stock(
    auth: UserAuth,
    State(state): State<AppState>,
    Query(query): Query<LowStockQuery>,
) -> Result<Json<Vec<Item>>, ApiError> {
    access::ensure_inventory_manager(&state.pool, &auth).await?;

    let items = ItemRepository::new(state.pool.clone());
    let entities = items.list_low_stock(query.department_id).await?;
    Ok(Json(entities.into_iter().map(Into::into).collect()))
}

pub async fn get_item(
    _auth: UserAuth,
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> Result<Json<Item>, ApiError> {
    let items = ItemRepository::new(state.pool.clone());
    let entity = items
        .find_by_id(item_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Item not found".into()))?;
    Ok(Json(entity.into()))
}

pub async fn update_item(
    auth: UserAuth,
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
    Json(req): Json<UpdateItemRequest>,
) -> Result<Json<Item>, ApiError> {
    let items = ItemRepository::new(state.pool.clone());
    let existing = items
        .find_by_id(item_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Item not found".into()))?;
    ensure_can_stock(&state, &auth, existing.department_id).await?;

    if let Some(name) = &req.name {
        validation::validate_non_empty(name)
            .map_err(|_| ApiError::Validation("Item name must not be empty".into()))?;
    }
    if !existing.is_consumable && (req.current_stock.is_some() || req.min_stock_level.is_some()) {
        return Err(ApiError::Validation(
            "Stock fields only apply to consumables".into(),
        ));
    }

    let entity = items
        .update(
            item_id,
            req.name.as_deref().map(str::trim),
            req.condition.map(Into::into),
            req.current_stock,
            req.min_stock_level,
            req.description.as_deref(),
            req.specifications.as_deref(),
            req.image_url.as_deref(),
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Item not found".into()))?;

    audit::record(
        &state.pool,
        AuditLogBuilder::user_action(auth.user_id, AuditAction::ItemUpdate)
            .on_entity("item", entity.manual_id.clone())
            .build(),
    );

    Ok(Json(entity.into()))
}

pub async fn delete_item(
    auth: UserAuth,
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let items = ItemRepository::new(state.pool.clone());
    let existing = items
        .find_by_id(item_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Item not found".into()))?;
    access::ensure_department_manager(&state.pool, &auth, existing.department_id).await?;

    items.delete(item_id).await.map_err(|e| match &e {
        // Issue and transfer records reference items with RESTRICT.
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23503") => {
            ApiError::Conflict("Item has borrowing or transfer history".into())
        }
        _ => e.into(),
    })?;

    audit::record(
        &state.pool,
        AuditLogBuilder::user_action(auth.user_id, AuditAction::ItemDelete)
            .on_entity("item", existing.manual_id.clone())
            .build(),
    );

    Ok(StatusCode::NO_CONTENT)
}

/// Transfer visibility grant returned to the caller.
#[derive(Debug, Serialize)]
pub struct ItemAccessResponse {
    pub item_id: Uuid,
    pub department_id: Uuid,
    pub can_transfer: bool,
    pub granted_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<ItemAccessEntity> for ItemAccessResponse {
    fn from(entity: ItemAccessEntity) -> Self {
        Self {
            item_id: entity.item_id,
            department_id: entity.department_id,
            can_transfer: entity.can_transfer,
            granted_by: entity.granted_by,
            created_at: entity.created_at,
        }
    }
}

pub async fn grant_access(
    auth: UserAuth,
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
    Json(req): Json<GrantAccessRequest>,
) -> Result<(StatusCode, Json<ItemAccessResponse>), ApiError> {
    let items = ItemRepository::new(state.pool.clone());
    let item = items
        .find_by_id(item_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Item not found".into()))?;
    access::ensure_department_manager(&state.pool, &auth, item.department_id).await?;

    if req.department_id == item.department_id {
        return Err(ApiError::Validation(
            "Cannot grant a department access to its own item".into(),
        ));
    }

    let entity = items
        .grant_access(item_id, req.department_id, req.can_transfer, auth.user_id)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23503") => {
                ApiError::NotFound("Department not found".into())
            }
            _ => e.into(),
        })?;

    audit::record(
        &state.pool,
        AuditLogBuilder::user_action(auth.user_id, AuditAction::AccessGrant)
            .on_entity("item", item.manual_id.clone())
            .with_detail(
                "department_id",
                serde_json::json!(req.department_id.to_string()),
            )
            .build(),
    );

    Ok((StatusCode::CREATED, Json(entity.into())))
}

pub async fn list_access(
    auth: UserAuth,
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> Result<Json<Vec<ItemAccessResponse>>, ApiError> {
    let items = ItemRepository::new(state.pool.clone());
    let item = items
        .find_by_id(item_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Item not found".into()))?;
    access::ensure_department_manager(&state.pool, &auth, item.department_id).await?;

    let grants = items.list_access(item_id).await?;
    Ok(Json(grants.into_iter().map(Into::into).collect()))
}

pub async fn revoke_access(
    auth: UserAuth,
    State(state): State<AppState>,
    Path((item_id, department_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let items = ItemRepository::new(state.pool.clone());
    let item = items
        .find_by_id(item_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Item not found".into()))?;
    access::ensure_department_manager(&state.pool, &auth, item.department_id).await?;

    if !items.revoke_access(item_id, department_id).await? {
        return Err(ApiError::NotFound("No such access grant".into()));
    }

    audit::record(
        &state.pool,
        AuditLogBuilder::user_action(auth.user_id, AuditAction::AccessRevoke)
            .on_entity("item", item.manual_id.clone())
            .with_detail("department_id", serde_json::json!(department_id.to_string()))
            .build(),
    );

    Ok(StatusCode::NO_CONTENT)
}
