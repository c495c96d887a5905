//! Issue record (open loan) domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::item::ItemCondition;

/// Condition reported at return time.
pub type ReturnCondition = ItemCondition;

/// A record of an item actually handed out against an approved request.
///
/// The record is "open" while `actual_return_date` is null; an item has at
/// most one open record at a time, and a non-consumable item is `issued`
/// exactly while such a record exists.
#[derive(Debug, Clone, Serialize)]
pub struct IssueRecord {
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
    pub return_condition: Option<ItemCondition>,
    pub damage_remarks: Option<String>,
    /// One-shot reminder flags: false -> true once, reset only by closure.
    pub reminder_3days_sent: bool,
    pub reminder_1day_sent: bool,
    pub overdue_sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl IssueRecord {
    pub fn is_open(&self) -> bool {
        self.actual_return_date.is_none()
    }
}

/// Request body to return an issued item.
#[derive(Debug, Clone, Deserialize)]
pub struct ReturnItemRequest {
    pub return_condition: ReturnCondition,
    #[serde(default)]
    pub damage_remarks: Option<String>,
}

/// Outcome of a return, reported to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct ReturnItemResponse {
    pub record_id: Uuid,
    pub returned_at: DateTime<Utc>,
    pub days_overdue: i64,
    /// Set when the late-return policy banned the borrower.
    pub ban_applied_until: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_return_request_deserialize() {
        let json = r#"{"return_condition":"good"}"#;
        let req: ReturnItemRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.return_condition, ItemCondition::Good);
        assert!(req.damage_remarks.is_none());
    }

    #[test]
    fn test_return_request_with_damage() {
        let json = r#"{"return_condition":"damaged","damage_remarks":"cracked probe"}"#;
        let req: ReturnItemRequest = serde_json::from_str(json).unwrap();
        assert!(req.return_condition.needs_maintenance());
        assert_eq!(req.damage_remarks.as_deref(), Some("cracked probe"));
    }
}
