//! Cross-department transfer endpoints.
//!
//! Transfers move custody of equipment or split consumable stock between
//! departments. The destination pulls under a standing transfer grant, the
//! source department reviews, and either side records the handover.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::middleware::metrics::record_transfer_completed;
use crate::routes::Paginated;
use crate::services::{access, audit};
use domain::models::transfer::{
    CompleteTransferRequest, CreateTransferRequest, RejectTransferRequest,
};
use domain::models::{TransferRecord, TransferRequest, TransferRequestStatus, UserRole};
use domain::services::audit::audit_helpers;
use persistence::entities::ItemStatusDb;
use persistence::repositories::{DepartmentRepository, ItemRepository, TransferRepository};
use shared::pagination::{PageInfo, PageQuery};
use shared::validation;

pub async fn create_transfer(
    auth: UserAuth,
    State(state): State<AppState>,
    Json(req): Json<CreateTransferRequest>,
) -> Result<(StatusCode, Json<TransferRequest>), ApiError> {
    validation::validate_non_empty(&req.purpose)
        .map_err(|_| ApiError::Validation("Purpose must not be empty".into()))?;

    let items = ItemRepository::new(state.pool.clone());
    let item = items
        .find_by_id(req.item_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Item not found".into()))?;

    if req.to_department_id == item.department_id {
        return Err(ApiError::Validation(
            "Cannot transfer an item to its own department".into(),
        ));
    }

    let quantity = if item.is_consumable {
        let quantity = req
            .quantity
            .ok_or_else(|| ApiError::Validation("Consumable transfers need a quantity".into()))?;
        if quantity < 1 {
            return Err(ApiError::Validation(
                "Transfer quantity must be at least one".into(),
            ));
        }
        let available = item.current_stock.unwrap_or(0);
        if quantity > available {
            return Err(ApiError::InsufficientStock(format!(
                "Only {} units in stock",
                available
            )));
        }
        quantity
    } else {
        if item.status != ItemStatusDb::Available {
            return Err(ApiError::ItemUnavailable(
                "Item must be available to be transferred".into(),
            ));
        }
        1
    };

    // Every transfer pulls under a standing grant: the destination
    // department must hold transfer access to the item, no matter who asks.
    let granted = items
        .find_access(req.item_id, req.to_department_id)
        .await?
        .map_or(false, |g| g.can_transfer);
    if !granted {
        return Err(ApiError::Forbidden(
            "The destination department has no transfer access to this item".into(),
        ));
    }

    // Admins and procurement distribute stock anywhere; everyone else
    // must manage the destination department.
    if !auth.is_admin() && auth.role != UserRole::Procurement {
        let departments = DepartmentRepository::new(state.pool.clone());
        let manages_destination = departments
            .is_incharge_of(auth.user_id, req.to_department_id)
            .await?;
        if !manages_destination {
            return Err(ApiError::Forbidden(
                "You do not manage the destination department".into(),
            ));
        }
    }

    let transfers = TransferRepository::new(state.pool.clone());
    let entity = transfers
        .create(
            req.item_id,
            item.department_id,
            req.to_department_id,
            auth.user_id,
            quantity,
            req.purpose.trim(),
        )
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23503") => {
                ApiError::NotFound("Destination department not found".into())
            }
            _ => e.into(),
        })?;

    audit::record(
        &state.pool,
        audit_helpers::transfer_requested(auth.user_id, entity.id, req.item_id, quantity),
    );

    Ok((StatusCode::CREATED, Json(entity.into())))
}

#[derive(Debug, Deserialize)]
pub struct ListTransfersQuery {
    #[serde(default)]
    pub status: Option<TransferRequestStatus>,
    #[serde(default)]
    pub department_id: Option<Uuid>,
    #[serde(flatten)]
    pub page: PageQuery,
}

pub async fn list_transfers(
    auth: UserAuth,
    State(state): State<AppState>,
    Query(query): Query<ListTransfersQuery>,
) -> Result<Json<Paginated<TransferRequest>>, ApiError> {
    access::ensure_inventory_manager(&state.pool, &auth).await?;

    let transfers = TransferRepository::new(state.pool.clone());
    let (limit, offset) = query.page.limit_offset();
    let status = query.status.map(Into::into);
    let entities = transfers
        .list(status, query.department_id, limit, offset)
        .await?;
    let total = transfers.count(status, query.department_id).await?;

    Ok(Json(Paginated::new(
        entities.into_iter().map(Into::into).collect(),
        PageInfo::new(&query.page, total),
    )))
}

pub async fn get_transfer(
    auth: UserAuth,
    State(state): State<AppState>,
    Path(transfer_id): Path<Uuid>,
) -> Result<Json<TransferRequest>, ApiError> {
    let transfers = TransferRepository::new(state.pool.clone());
    let entity = transfers
        .find_by_id(transfer_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Transfer request not found".into()))?;

    if !auth.is_staff_level() && entity.requested_by != auth.user_id {
        return Err(ApiError::Forbidden(
            "You may only view your own transfer requests".into(),
        ));
    }

    Ok(Json(entity.into()))
}

#[derive(Debug, Deserialize)]
pub struct ListTransferRecordsQuery {
    #[serde(default)]
    pub department_id: Option<Uuid>,
    #[serde(flatten)]
    pub page: PageQuery,
}

pub async fn list_transfer_records(
    auth: UserAuth,
    State(state): State<AppState>,
    Query(query): Query<ListTransferRecordsQuery>,
) -> Result<Json<Vec<TransferRecord>>, ApiError> {
    access::ensure_inventory_manager(&state.pool, &auth).await?;

    let transfers = TransferRepository::new(state.pool.clone());
    let (limit, offset) = query.page.limit_offset();
    let entities = transfers
        .list_records(query.department_id, limit, offset)
        .await?;
    Ok(Json(entities.into_iter().map(Into::into).collect()))
}

/// Loads the transfer and checks the caller manages the source department.
async fn reviewable_transfer(
    state: &AppState,
    auth: &UserAuth,
    transfer_id: Uuid,
) -> Result<TransferRepository, ApiError> {
    let transfers = TransferRepository::new(state.pool.clone());
    let entity = transfers
        .find_by_id(transfer_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Transfer request not found".into()))?;
    access::ensure_department_manager(&state.pool, auth, entity.from_department_id).await?;
    Ok(transfers)
}

pub async fn approve_transfer(
    auth: UserAuth,
    State(state): State<AppState>,
    Path(transfer_id): Path<Uuid>,
) -> Result<Json<TransferRequest>, ApiError> {
    let transfers = reviewable_transfer(&state, &auth, transfer_id).await?;

    let entity = transfers
        .approve(transfer_id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::InvalidState("Transfer is no longer pending".into()))?;

    audit::record(
        &state.pool,
        domain::services::AuditLogBuilder::user_action(
            auth.user_id,
            domain::models::AuditAction::TransferApprove,
        )
        .on_entity("transfer_request", transfer_id.to_string())
        .build(),
    );

    Ok(Json(entity.into()))
}

pub async fn reject_transfer(
    auth: UserAuth,
    State(state): State<AppState>,
    Path(transfer_id): Path<Uuid>,
    Json(req): Json<RejectTransferRequest>,
) -> Result<Json<TransferRequest>, ApiError> {
    validation::validate_non_empty(&req.reason)
        .map_err(|_| ApiError::Validation("A rejection reason is required".into()))?;

    let transfers = reviewable_transfer(&state, &auth, transfer_id).await?;

    let entity = transfers
        .reject(transfer_id, auth.user_id, req.reason.trim())
        .await?
        .ok_or_else(|| ApiError::InvalidState("Transfer is no longer pending".into()))?;

    audit::record(
        &state.pool,
        domain::services::AuditLogBuilder::user_action(
            auth.user_id,
            domain::models::AuditAction::TransferReject,
        )
        .on_entity("transfer_request", transfer_id.to_string())
        .with_detail("reason", serde_json::json!(req.reason.trim()))
        .build(),
    );

    Ok(Json(entity.into()))
}

pub async fn complete_transfer(
    auth: UserAuth,
    State(state): State<AppState>,
    Path(transfer_id): Path<Uuid>,
    Json(req): Json<CompleteTransferRequest>,
) -> Result<Json<TransferRecord>, ApiError> {
    let transfers = TransferRepository::new(state.pool.clone());
    let entity = transfers
        .find_by_id(transfer_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Transfer request not found".into()))?;

    // Either side of the move may record the handover.
    if access::ensure_department_manager(&state.pool, &auth, entity.from_department_id)
        .await
        .is_err()
    {
        access::ensure_department_manager(&state.pool, &auth, entity.to_department_id).await?;
    }

    let record = transfers
        .complete(transfer_id, auth.user_id, req.notes.as_deref())
        .await
        .map_err(|e| match &e {
            // Unique request_id on transfer_records: already completed.
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                ApiError::Conflict("This transfer has already been completed".into())
            }
            _ => e.into(),
        })?
        .ok_or_else(|| {
            ApiError::InvalidState("Only approved transfers can be completed".into())
        })?;

    record_transfer_completed();
    audit::record(
        &state.pool,
        audit_helpers::transfer_completed(auth.user_id, transfer_id, record.id),
    );

    Ok(Json(record.into()))
}
