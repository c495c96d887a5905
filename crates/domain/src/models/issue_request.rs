//! Borrow request domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Status of a borrow request.
///
/// `Pending` is the only state that permits a transition; every terminal
/// status is one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueRequestStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl IssueRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueRequestStatus::Pending => "pending",
            IssueRequestStatus::Approved => "approved",
            IssueRequestStatus::Rejected => "rejected",
            IssueRequestStatus::Cancelled => "cancelled",
        }
    }

    /// Whether a request in this status still reserves the (user, item) pair.
    pub fn is_active(&self) -> bool {
        matches!(self, IssueRequestStatus::Pending | IssueRequestStatus::Approved)
    }
}

impl std::fmt::Display for IssueRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueRequestStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(IssueRequestStatus::Pending),
            "approved" => Ok(IssueRequestStatus::Approved),
            "rejected" => Ok(IssueRequestStatus::Rejected),
            "cancelled" => Ok(IssueRequestStatus::Cancelled),
            _ => Err(()),
        }
    }
}

/// A request by a user to borrow a specific item.
#[derive(Debug, Clone, Serialize)]
pub struct IssueRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub item_id: Uuid,
    pub purpose: String,
    pub requested_days: i32,
    pub status: IssueRequestStatus,
    pub approved_by: Option<Uuid>,
    pub approval_date: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body to submit a borrow request.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitIssueRequest {
    pub item_id: Uuid,
    pub purpose: String,
    pub requested_days: i32,
}

/// Request body to approve a borrow request.
#[derive(Debug, Clone, Deserialize)]
pub struct ApproveIssueRequest {
    /// Collection instructions passed to the requester, stored as remarks.
    #[serde(default)]
    pub collection_instructions: Option<String>,
}

/// Request body to reject a borrow request.
#[derive(Debug, Clone, Deserialize)]
pub struct RejectIssueRequest {
    pub reason: String,
}

/// Request body to issue the item for an approved request.
///
/// The record's project in-charge is not part of the payload; permanent
/// issues take it from the requester's account.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueItemRequest {
    #[serde(default = "default_returnable")]
    pub is_returnable: bool,
    /// Mandatory when the item is issued permanently to a project.
    #[serde(default)]
    pub project_name: Option<String>,
}

fn default_returnable() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            IssueRequestStatus::Pending,
            IssueRequestStatus::Approved,
            IssueRequestStatus::Rejected,
            IssueRequestStatus::Cancelled,
        ] {
            assert_eq!(IssueRequestStatus::from_str(status.as_str()), Ok(status));
        }
    }

    #[test]
    fn test_active_statuses() {
        assert!(IssueRequestStatus::Pending.is_active());
        assert!(IssueRequestStatus::Approved.is_active());
        assert!(!IssueRequestStatus::Rejected.is_active());
        assert!(!IssueRequestStatus::Cancelled.is_active());
    }

    #[test]
    fn test_issue_item_request_defaults() {
        let req: IssueItemRequest = serde_json::from_str("{}").unwrap();
        assert!(req.is_returnable);
        assert!(req.project_name.is_none());
    }

    #[test]
    fn test_submit_request_deserialize() {
        let json = format!(
            r#"{{"item_id":"{}","purpose":"Robotics demo","requested_days":5}}"#,
            Uuid::new_v4()
        );
        let req: SubmitIssueRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(req.requested_days, 5);
    }
}
