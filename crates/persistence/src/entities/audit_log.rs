//! Audit log entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::AuditLog;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the audit_logs table.
#[derive(Debug, Clone, FromRow)]
pub struct AuditLogEntity {
    pub id: Uuid,
    pub actor_id: Option<Uuid>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub changes: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl From<AuditLogEntity> for AuditLog {
    fn from(entity: AuditLogEntity) -> Self {
        Self {
            id: entity.id,
            actor_id: entity.actor_id,
            action: entity.action,
            entity_type: entity.entity_type,
            entity_id: entity.entity_id,
            changes: entity.changes,
            created_at: entity.created_at,
        }
    }
}
