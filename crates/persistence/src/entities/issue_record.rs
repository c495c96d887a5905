//! Issue record entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::IssueRecord;
use sqlx::FromRow;
use uuid::Uuid;

use super::item::ItemConditionDb;

/// Database row mapping for the issue_records table.
#[derive(Debug, Clone, FromRow)]
pub struct IssueRecordEntity {
    pub id: Uuid,
    pub request_id: Uuid,
    pub item_id: Uuid,
    pub user_id: Uuid,
    pub department_id: Uuid,
    pub issued_by: Uuid,
    pub issue_date: DateTime<Utc>,
    pub expected_return_date: DateTime<Utc>,
    pub actual_return_date: Option<DateTime<Utc>>,
    pub is_returnable: bool,
    pub project_name: Option<String>,
    pub project_incharge: Option<String>,
    pub return_condition: Option<ItemConditionDb>,
    pub damage_remarks: Option<String>,
    pub reminder_3days_sent: bool,
    pub reminder_1day_sent: bool,
    pub overdue_sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<IssueRecordEntity> for IssueRecord {
    fn from(entity: IssueRecordEntity) -> Self {
        Self {
            id: entity.id,
            request_id: entity.request_id,
            item_id: entity.item_id,
            user_id: entity.user_id,
            department_id: entity.department_id,
            issued_by: entity.issued_by,
            issue_date: entity.issue_date,
            expected_return_date: entity.expected_return_date,
            actual_return_date: entity.actual_return_date,
            is_returnable: entity.is_returnable,
            project_name: entity.project_name,
            project_incharge: entity.project_incharge,
            return_condition: entity.return_condition.map(Into::into),
            damage_remarks: entity.damage_remarks,
            reminder_3days_sent: entity.reminder_3days_sent,
            reminder_1day_sent: entity.reminder_1day_sent,
            overdue_sent: entity.overdue_sent,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Open loan joined with borrower and item details for the reminder engine.
#[derive(Debug, Clone, FromRow)]
pub struct OpenLoanEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub item_id: Uuid,
    pub expected_return_date: DateTime<Utc>,
    pub reminder_3days_sent: bool,
    pub reminder_1day_sent: bool,
    pub overdue_sent: bool,
    pub borrower_email: String,
    pub borrower_name: String,
    pub item_name: String,
    pub item_manual_id: String,
}
