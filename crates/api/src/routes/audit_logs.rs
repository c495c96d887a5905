//! Audit trail endpoints.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::routes::Paginated;
use domain::models::AuditLog;
use persistence::repositories::AuditLogRepository;
use shared::pagination::{PageInfo, PageQuery};

#[derive(Debug, Deserialize)]
pub struct ListAuditLogsQuery {
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub actor_id: Option<Uuid>,
    #[serde(flatten)]
    pub page: PageQuery,
}

pub async fn list_audit_logs(
    auth: UserAuth,
    State(state): State<AppState>,
    Query(query): Query<ListAuditLogsQuery>,
) -> Result<Json<Paginated<AuditLog>>, ApiError> {
    auth.require_admin()?;

    let logs = AuditLogRepository::new(state.pool.clone());
    let (limit, offset) = query.page.limit_offset();
    let entities = logs
        .list(query.entity_type.as_deref(), query.actor_id, limit, offset)
        .await?;
    let total = logs
        .count(query.entity_type.as_deref(), query.actor_id)
        .await?;

    Ok(Json(Paginated::new(
        entities.into_iter().map(Into::into).collect(),
        PageInfo::new(&query.page, total),
    )))
}
