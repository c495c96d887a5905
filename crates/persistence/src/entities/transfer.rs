//! Transfer request and transfer record entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::{TransferRecord, TransferRequest, TransferRequestStatus};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for transfer request status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "transfer_request_status", rename_all = "lowercase")]
pub enum TransferRequestStatusDb {
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl From<TransferRequestStatusDb> for TransferRequestStatus {
    fn from(status: TransferRequestStatusDb) -> Self {
        match status {
            TransferRequestStatusDb::Pending => TransferRequestStatus::Pending,
            TransferRequestStatusDb::Approved => TransferRequestStatus::Approved,
            TransferRequestStatusDb::Rejected => TransferRequestStatus::Rejected,
            TransferRequestStatusDb::Completed => TransferRequestStatus::Completed,
        }
    }
}

impl From<TransferRequestStatus> for TransferRequestStatusDb {
    fn from(status: TransferRequestStatus) -> Self {
        match status {
            TransferRequestStatus::Pending => TransferRequestStatusDb::Pending,
            TransferRequestStatus::Approved => TransferRequestStatusDb::Approved,
            TransferRequestStatus::Rejected => TransferRequestStatusDb::Rejected,
            TransferRequestStatus::Completed => TransferRequestStatusDb::Completed,
        }
    }
}

/// Database row mapping for the transfer_requests table.
#[derive(Debug, Clone, FromRow)]
pub struct TransferRequestEntity {
    pub id: Uuid,
    pub item_id: Uuid,
    pub from_department_id: Uuid,
    pub to_department_id: Uuid,
    pub requested_by: Uuid,
    pub quantity: i32,
    pub purpose: String,
    pub status: TransferRequestStatusDb,
    pub rejection_reason: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TransferRequestEntity> for TransferRequest {
    fn from(entity: TransferRequestEntity) -> Self {
        Self {
            id: entity.id,
            item_id: entity.item_id,
            from_department_id: entity.from_department_id,
            to_department_id: entity.to_department_id,
            requested_by: entity.requested_by,
            quantity: entity.quantity,
            purpose: entity.purpose,
            status: entity.status.into(),
            rejection_reason: entity.rejection_reason,
            reviewed_by: entity.reviewed_by,
            reviewed_at: entity.reviewed_at,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Database row mapping for the transfer_records table.
#[derive(Debug, Clone, FromRow)]
pub struct TransferRecordEntity {
    pub id: Uuid,
    pub request_id: Uuid,
    pub item_id: Uuid,
    pub from_department_id: Uuid,
    pub to_department_id: Uuid,
    pub transferred_by: Uuid,
    pub quantity: i32,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<TransferRecordEntity> for TransferRecord {
    fn from(entity: TransferRecordEntity) -> Self {
        Self {
            id: entity.id,
            request_id: entity.request_id,
            item_id: entity.item_id,
            from_department_id: entity.from_department_id,
            to_department_id: entity.to_department_id,
            transferred_by: entity.transferred_by,
            quantity: entity.quantity,
            notes: entity.notes,
            created_at: entity.created_at,
        }
    }
}
