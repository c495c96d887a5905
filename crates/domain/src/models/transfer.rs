//! Cross-department transfer domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Status of a transfer request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferRequestStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl TransferRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferRequestStatus::Pending => "pending",
            TransferRequestStatus::Approved => "approved",
            TransferRequestStatus::Rejected => "rejected",
            TransferRequestStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for TransferRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransferRequestStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TransferRequestStatus::Pending),
            "approved" => Ok(TransferRequestStatus::Approved),
            "rejected" => Ok(TransferRequestStatus::Rejected),
            "completed" => Ok(TransferRequestStatus::Completed),
            _ => Err(()),
        }
    }
}

/// A request to move an item (or consumable stock) between departments.
#[derive(Debug, Clone, Serialize)]
pub struct TransferRequest {
    pub id: Uuid,
    pub item_id: Uuid,
    pub from_department_id: Uuid,
    pub to_department_id: Uuid,
    pub requested_by: Uuid,
    /// Units moved; always 1 for non-consumables.
    pub quantity: i32,
    pub purpose: String,
    pub status: TransferRequestStatus,
    pub rejection_reason: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The durable record of a completed transfer.
#[derive(Debug, Clone, Serialize)]
pub struct TransferRecord {
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

/// Request body to open a transfer request.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTransferRequest {
    pub item_id: Uuid,
    pub to_department_id: Uuid,
    pub purpose: String,
    /// Mandatory for consumables; ignored for non-consumables.
    #[serde(default)]
    pub quantity: Option<i32>,
}

/// Request body to reject a transfer request.
#[derive(Debug, Clone, Deserialize)]
pub struct RejectTransferRequest {
    pub reason: String,
}

/// Request body to complete an approved transfer.
#[derive(Debug, Clone, Deserialize)]
pub struct CompleteTransferRequest {
    #[serde(default)]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            TransferRequestStatus::Pending,
            TransferRequestStatus::Approved,
            TransferRequestStatus::Rejected,
            TransferRequestStatus::Completed,
        ] {
            assert_eq!(TransferRequestStatus::from_str(status.as_str()), Ok(status));
        }
    }

    #[test]
    fn test_create_transfer_deserialize() {
        let json = format!(
            r#"{{"item_id":"{}","to_department_id":"{}","purpose":"shared stock","quantity":5}}"#,
            Uuid::new_v4(),
            Uuid::new_v4()
        );
        let req: CreateTransferRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(req.quantity, Some(5));
    }
}
