//! Inventory item domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Physical condition of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCondition {
    New,
    Good,
    Fair,
    Damaged,
    UnderRepair,
}

impl ItemCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCondition::New => "new",
            ItemCondition::Good => "good",
            ItemCondition::Fair => "fair",
            ItemCondition::Damaged => "damaged",
            ItemCondition::UnderRepair => "under_repair",
        }
    }

    /// Whether an item returned in this condition must go to maintenance
    /// instead of back on the shelf.
    pub fn needs_maintenance(&self) -> bool {
        matches!(self, ItemCondition::Damaged | ItemCondition::UnderRepair)
    }
}

impl std::fmt::Display for ItemCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemCondition {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(ItemCondition::New),
            "good" => Ok(ItemCondition::Good),
            "fair" => Ok(ItemCondition::Fair),
            "damaged" => Ok(ItemCondition::Damaged),
            "under_repair" => Ok(ItemCondition::UnderRepair),
            _ => Err(()),
        }
    }
}

/// Availability status of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Available,
    Issued,
    Maintenance,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Available => "available",
            ItemStatus::Issued => "issued",
            ItemStatus::Maintenance => "maintenance",
        }
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An inventory item.
///
/// Consumables are tracked by `current_stock` and are moved between
/// departments in quantity; they are never individually borrowed.
/// Non-consumables cycle through issue/return and hold a status.
#[derive(Debug, Clone, Serialize)]
pub struct Item {
    pub id: Uuid,
    /// Human-readable identifier, `<DEPTCODE>-<seq:3>`.
    pub manual_id: String,
    pub name: String,
    pub category_id: Uuid,
    pub department_id: Uuid,
    pub condition: ItemCondition,
    pub status: ItemStatus,
    pub is_consumable: bool,
    pub current_stock: Option<i32>,
    pub min_stock_level: Option<i32>,
    /// Department the item originally came from, set after a transfer.
    pub source_department_id: Option<Uuid>,
    pub description: Option<String>,
    pub specifications: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create an item. The manual ID is generated server-side.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
    pub category_id: Uuid,
    pub department_id: Uuid,
    pub condition: ItemCondition,
    #[serde(default)]
    pub is_consumable: bool,
    pub current_stock: Option<i32>,
    pub min_stock_level: Option<i32>,
    pub description: Option<String>,
    pub specifications: Option<String>,
    pub image_url: Option<String>,
}

/// Request to update an item's mutable fields.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    pub condition: Option<ItemCondition>,
    pub current_stock: Option<i32>,
    pub min_stock_level: Option<i32>,
    pub description: Option<String>,
    pub specifications: Option<String>,
    pub image_url: Option<String>,
}

/// Request to grant another department transfer visibility on an item.
#[derive(Debug, Clone, Deserialize)]
pub struct GrantAccessRequest {
    pub department_id: Uuid,
    #[serde(default)]
    pub can_transfer: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_round_trip() {
        for condition in [
            ItemCondition::New,
            ItemCondition::Good,
            ItemCondition::Fair,
            ItemCondition::Damaged,
            ItemCondition::UnderRepair,
        ] {
            assert_eq!(ItemCondition::from_str(condition.as_str()), Ok(condition));
        }
    }

    #[test]
    fn test_needs_maintenance() {
        assert!(ItemCondition::Damaged.needs_maintenance());
        assert!(ItemCondition::UnderRepair.needs_maintenance());
        assert!(!ItemCondition::Good.needs_maintenance());
        assert!(!ItemCondition::Fair.needs_maintenance());
    }

    #[test]
    fn test_status_serde() {
        assert_eq!(
            serde_json::to_string(&ItemStatus::Issued).unwrap(),
            r#""issued""#
        );
        let status: ItemStatus = serde_json::from_str(r#""maintenance""#).unwrap();
        assert_eq!(status, ItemStatus::Maintenance);
    }

    #[test]
    fn test_condition_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&ItemCondition::UnderRepair).unwrap(),
            r#""under_repair""#
        );
    }
}
