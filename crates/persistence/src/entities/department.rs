//! Department entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::Department;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the departments table.
#[derive(Debug, Clone, FromRow)]
pub struct DepartmentEntity {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub incharge_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DepartmentEntity> for Department {
    fn from(entity: DepartmentEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            code: entity.code,
            incharge_id: entity.incharge_id,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
