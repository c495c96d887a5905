//! Loan record endpoints: listing open and past loans, and closing one at
//! return time.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::middleware::metrics::record_item_returned;
use crate::routes::Paginated;
use crate::services::{access, audit};
use domain::models::issue_record::{ReturnItemRequest, ReturnItemResponse};
use domain::models::IssueRecord;
use domain::services::audit::audit_helpers;
use domain::services::late_return_ban;
use persistence::entities::ItemStatusDb;
use persistence::repositories::{
    IssueRecordRepository, SettingRepository, UserRepository,
};
use shared::pagination::{PageInfo, PageQuery};

#[derive(Debug, Deserialize)]
pub struct ListRecordsQuery {
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub department_id: Option<Uuid>,
    /// When true, only loans that have not been returned yet.
    #[serde(default)]
    pub open: bool,
    #[serde(flatten)]
    pub page: PageQuery,
}

pub async fn list_records(
    auth: UserAuth,
    State(state): State<AppState>,
    Query(query): Query<ListRecordsQuery>,
) -> Result<Json<Paginated<IssueRecord>>, ApiError> {
    let user_filter = if auth.is_staff_level() {
        query.user_id
    } else {
        Some(auth.user_id)
    };

    let records = IssueRecordRepository::new(state.pool.clone());
    let (limit, offset) = query.page.limit_offset();
    let entities = records
        .list(user_filter, query.department_id, query.open, limit, offset)
        .await?;
    let total = records
        .count(user_filter, query.department_id, query.open)
        .await?;

    Ok(Json(Paginated::new(
        entities.into_iter().map(Into::into).collect(),
        PageInfo::new(&query.page, total),
    )))
}

pub async fn get_record(
    auth: UserAuth,
    State(state): State<AppState>,
    Path(record_id): Path<Uuid>,
) -> Result<Json<IssueRecord>, ApiError> {
    let records = IssueRecordRepository::new(state.pool.clone());
    let entity = records
        .find_by_id(record_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Record not found".into()))?;

    if !auth.is_staff_level() && entity.user_id != auth.user_id {
        return Err(ApiError::Forbidden(
            "You may only view your own loans".into(),
        ));
    }

    Ok(Json(entity.into()))
}

pub async fn return_item(
    auth: UserAuth,
    State(state): State<AppState>,
    Path(record_id): Path<Uuid>,
    Json(req): Json<ReturnItemRequest>,
) -> Result<Json<ReturnItemResponse>, ApiError> {
    let records = IssueRecordRepository::new(state.pool.clone());
    let record = records
        .find_by_id(record_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Record not found".into()))?;
    access::ensure_department_manager(&state.pool, &auth, record.department_id).await?;

    if record.actual_return_date.is_some() {
        return Err(ApiError::InvalidState(
            "This loan has already been returned".into(),
        ));
    }

    let now = Utc::now();
    let days_overdue = (now.date_naive() - record.expected_return_date.date_naive())
        .num_days()
        .max(0);

    let settings = SettingRepository::new(state.pool.clone());
    let policy = settings.load_policy().await?;
    let ban = late_return_ban(record.expected_return_date, now, &policy);

    let item_status = if req.return_condition.needs_maintenance() {
        ItemStatusDb::Maintenance
    } else {
        ItemStatusDb::Available
    };

    let closed = records
        .close_return(
            record_id,
            req.return_condition.into(),
            req.damage_remarks.as_deref(),
            item_status,
            ban.as_ref().map(|b| (record.user_id, b.banned_until)),
        )
        .await?
        .ok_or_else(|| {
            ApiError::InvalidState("This loan has already been returned".into())
        })?;

    record_item_returned(days_overdue > 0);
    audit::record(
        &state.pool,
        audit_helpers::item_returned(
            auth.user_id,
            record_id,
            req.return_condition.as_str(),
            days_overdue,
        ),
    );

    if let Some(outcome) = &ban {
        audit::record(
            &state.pool,
            audit_helpers::user_banned(
                record_id,
                record.user_id,
                &outcome.banned_until.to_rfc3339(),
            ),
        );

        let users = UserRepository::new(state.pool.clone());
        if let Some(borrower) = users.find_by_id(record.user_id).await? {
            if let Err(e) = state
                .email
                .send_ban_notice(
                    &borrower.email,
                    &borrower.display_name,
                    Some(outcome.banned_until),
                )
                .await
            {
                tracing::warn!(record_id = %record_id, error = %e, "Ban notice email failed");
            }
        }
    }

    Ok(Json(ReturnItemResponse {
        record_id,
        returned_at: closed.actual_return_date.unwrap_or(now),
        days_overdue,
        ban_applied_until: ban.map(|b| b.banned_until),
    }))
}
