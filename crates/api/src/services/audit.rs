//! Fire-and-forget audit trail writer.
//!
//! Audit inserts must never fail the request that produced them, so they
//! run on a detached task and only log on error.

use domain::models::CreateAuditLogInput;
use persistence::repositories::AuditLogRepository;
use sqlx::PgPool;

/// Records an audit entry without blocking the calling request.
pub fn record(pool: &PgPool, input: CreateAuditLogInput) {
    let repo = AuditLogRepository::new(pool.clone());
    let action = input.action.as_str();
    tokio::spawn(async move {
        if let Err(e) = repo.insert(input).await {
            tracing::error!(action = %action, error = %e, "Failed to write audit log");
        }
    });
}
