//! Audit log repository for database operations.

use domain::models::CreateAuditLogInput;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::AuditLogEntity;
use crate::metrics::QueryTimer;

const AUDIT_COLUMNS: &str = "id, actor_id, action, entity_type, entity_id, changes, created_at";

/// Repository for the append-only audit trail.
#[derive(Clone)]
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    /// Creates a new AuditLogRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append an audit entry.
    pub async fn insert(&self, input: CreateAuditLogInput) -> Result<AuditLogEntity, sqlx::Error> {
        let timer = QueryTimer::new("insert_audit_log");
        let result = sqlx::query_as::<_, AuditLogEntity>(&format!(
            r#"
            INSERT INTO audit_logs (actor_id, action, entity_type, entity_id, changes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {AUDIT_COLUMNS}
            "#
        ))
        .bind(input.actor_id)
        .bind(input.action.as_str())
        .bind(&input.entity_type)
        .bind(&input.entity_id)
        .bind(&input.changes)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List audit entries with optional filters, newest first.
    pub async fn list(
        &self,
        entity_type: Option<&str>,
        actor_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AuditLogEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_audit_logs");
        let result = sqlx::query_as::<_, AuditLogEntity>(&format!(
            r#"
            SELECT {AUDIT_COLUMNS}
            FROM audit_logs
            WHERE ($1::TEXT IS NULL OR entity_type = $1)
              AND ($2::UUID IS NULL OR actor_id = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(entity_type)
        .bind(actor_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count audit entries for pagination.
    pub async fn count(
        &self,
        entity_type: Option<&str>,
        actor_id: Option<Uuid>,
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_audit_logs");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM audit_logs
            WHERE ($1::TEXT IS NULL OR entity_type = $1)
              AND ($2::UUID IS NULL OR actor_id = $2)
            "#,
        )
        .bind(entity_type)
        .bind(actor_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}
