//! Category entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::Category;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the categories table.
#[derive(Debug, Clone, FromRow)]
pub struct CategoryEntity {
    pub id: Uuid,
    pub name: String,
    pub max_borrow_duration_days: i32,
    pub requires_approval: bool,
    pub visible_to_students: bool,
    pub visible_to_staff: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CategoryEntity> for Category {
    fn from(entity: CategoryEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            max_borrow_duration_days: entity.max_borrow_duration_days,
            requires_approval: entity.requires_approval,
            visible_to_students: entity.visible_to_students,
            visible_to_staff: entity.visible_to_staff,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
