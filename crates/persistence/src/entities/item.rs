//! Item entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Item, ItemCondition, ItemStatus};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for item condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "item_condition", rename_all = "snake_case")]
pub enum ItemConditionDb {
    New,
    Good,
    Fair,
    Damaged,
    UnderRepair,
}

impl From<ItemConditionDb> for ItemCondition {
    fn from(condition: ItemConditionDb) -> Self {
        match condition {
            ItemConditionDb::New => ItemCondition::New,
            ItemConditionDb::Good => ItemCondition::Good,
            ItemConditionDb::Fair => ItemCondition::Fair,
            ItemConditionDb::Damaged => ItemCondition::Damaged,
            ItemConditionDb::UnderRepair => ItemCondition::UnderRepair,
        }
    }
}

impl From<ItemCondition> for ItemConditionDb {
    fn from(condition: ItemCondition) -> Self {
        match condition {
            ItemCondition::New => ItemConditionDb::New,
            ItemCondition::Good => ItemConditionDb::Good,
            ItemCondition::Fair => ItemConditionDb::Fair,
            ItemCondition::Damaged => ItemConditionDb::Damaged,
            ItemCondition::UnderRepair => ItemConditionDb::UnderRepair,
        }
    }
}

/// Database enum for item status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "item_status", rename_all = "lowercase")]
pub enum ItemStatusDb {
    Available,
    Issued,
    Maintenance,
}

impl From<ItemStatusDb> for ItemStatus {
    fn from(status: ItemStatusDb) -> Self {
        match status {
            ItemStatusDb::Available => ItemStatus::Available,
            ItemStatusDb::Issued => ItemStatus::Issued,
            ItemStatusDb::Maintenance => ItemStatus::Maintenance,
        }
    }
}

impl From<ItemStatus> for ItemStatusDb {
    fn from(status: ItemStatus) -> Self {
        match status {
            ItemStatus::Available => ItemStatusDb::Available,
            ItemStatus::Issued => ItemStatusDb::Issued,
            ItemStatus::Maintenance => ItemStatusDb::Maintenance,
        }
    }
}

/// Database row mapping for the items table.
#[derive(Debug, Clone, FromRow)]
pub struct ItemEntity {
    pub id: Uuid,
    pub manual_id: String,
    pub name: String,
    pub category_id: Uuid,
    pub department_id: Uuid,
    pub condition: ItemConditionDb,
    pub status: ItemStatusDb,
    pub is_consumable: bool,
    pub current_stock: Option<i32>,
    pub min_stock_level: Option<i32>,
    pub source_department_id: Option<Uuid>,
    pub description: Option<String>,
    pub specifications: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ItemEntity> for Item {
    fn from(entity: ItemEntity) -> Self {
        Self {
            id: entity.id,
            manual_id: entity.manual_id,
            name: entity.name,
            category_id: entity.category_id,
            department_id: entity.department_id,
            condition: entity.condition.into(),
            status: entity.status.into(),
            is_consumable: entity.is_consumable,
            current_stock: entity.current_stock,
            min_stock_level: entity.min_stock_level,
            source_department_id: entity.source_department_id,
            description: entity.description,
            specifications: entity.specifications,
            image_url: entity.image_url,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Database row mapping for the item_department_access table.
#[derive(Debug, Clone, FromRow)]
pub struct ItemAccessEntity {
    pub item_id: Uuid,
    pub department_id: Uuid,
    pub can_transfer: bool,
    pub granted_by: Uuid,
    pub created_at: DateTime<Utc>,
}
