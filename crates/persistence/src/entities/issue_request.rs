//! Issue request entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{IssueRequest, IssueRequestStatus};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for issue request status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "issue_request_status", rename_all = "lowercase")]
pub enum IssueRequestStatusDb {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl From<IssueRequestStatusDb> for IssueRequestStatus {
    fn from(status: IssueRequestStatusDb) -> Self {
        match status {
            IssueRequestStatusDb::Pending => IssueRequestStatus::Pending,
            IssueRequestStatusDb::Approved => IssueRequestStatus::Approved,
            IssueRequestStatusDb::Rejected => IssueRequestStatus::Rejected,
            IssueRequestStatusDb::Cancelled => IssueRequestStatus::Cancelled,
        }
    }
}

impl From<IssueRequestStatus> for IssueRequestStatusDb {
    fn from(status: IssueRequestStatus) -> Self {
        match status {
            IssueRequestStatus::Pending => IssueRequestStatusDb::Pending,
            IssueRequestStatus::Approved => IssueRequestStatusDb::Approved,
            IssueRequestStatus::Rejected => IssueRequestStatusDb::Rejected,
            IssueRequestStatus::Cancelled => IssueRequestStatusDb::Cancelled,
        }
    }
}

/// Database row mapping for the issue_requests table.
#[derive(Debug, Clone, FromRow)]
pub struct IssueRequestEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub item_id: Uuid,
    pub purpose: String,
    pub requested_days: i32,
    pub status: IssueRequestStatusDb,
    pub approved_by: Option<Uuid>,
    pub approval_date: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<IssueRequestEntity> for IssueRequest {
    fn from(entity: IssueRequestEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            item_id: entity.item_id,
            purpose: entity.purpose,
            requested_days: entity.requested_days,
            status: entity.status.into(),
            approved_by: entity.approved_by,
            approval_date: entity.approval_date,
            rejection_reason: entity.rejection_reason,
            remarks: entity.remarks,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
