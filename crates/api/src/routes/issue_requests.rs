//! Borrow request lifecycle endpoints: submit, approve, reject, cancel and
//! the handover that opens a loan.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Duration, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::middleware::metrics::record_item_issued;
use crate::routes::Paginated;
use crate::services::{access, audit};
use domain::models::issue_request::{
    ApproveIssueRequest, IssueItemRequest, RejectIssueRequest, SubmitIssueRequest,
};
use domain::models::{Category, IssueRecord, IssueRequest, IssueRequestStatus, User, UserRole};
use domain::services::audit::audit_helpers;
use domain::services::check_borrow_eligibility;
use persistence::entities::ItemStatusDb;
use persistence::repositories::issue_record::NewIssueRecord;
use persistence::repositories::{
    CategoryRepository, DepartmentRepository, IssueRecordRepository, IssueRequestRepository,
    ItemRepository, SettingRepository, UserRepository,
};
use shared::pagination::{PageInfo, PageQuery};
use shared::validation;

/// Loads the borrower and verifies they may borrow right now.
///
/// An expired ban passes the check; the stale flag is cleared lazily so the
/// account record catches up with the calendar.
async fn eligible_borrower(
    users: &UserRepository,
    user_id: Uuid,
) -> Result<User, ApiError> {
    let entity = users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    let mut user: User = entity.into();

    let now = Utc::now();
    if user.is_banned {
        if let Some(until) = user.banned_until {
            if until <= now && users.clear_expired_ban(user_id).await? {
                user.is_banned = false;
                user.banned_until = None;
            }
        }
    }

    check_borrow_eligibility(&user, now)?;
    Ok(user)
}

fn category_visible_to(role: UserRole, category: &Category) -> bool {
    match role {
        UserRole::Admin | UserRole::Incharge | UserRole::Procurement => true,
        UserRole::Faculty | UserRole::Staff => category.visible_to_staff,
        UserRole::Student | UserRole::User => category.visible_to_students,
    }
}

pub async fn submit_request(
    auth: UserAuth,
    State(state): State<AppState>,
    Json(req): Json<SubmitIssueRequest>,
) -> Result<(StatusCode, Json<IssueRequest>), ApiError> {
    validation::validate_non_empty(&req.purpose)
        .map_err(|_| ApiError::Validation("Purpose must not be empty".into()))?;

    let users = UserRepository::new(state.pool.clone());
    let borrower = eligible_borrower(&users, auth.user_id).await?;

    let items = ItemRepository::new(state.pool.clone());
    let item = items
        .find_by_id(req.item_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Item not found".into()))?;
    if item.is_consumable {
        return Err(ApiError::ItemUnavailable(
            "Consumables cannot be borrowed".into(),
        ));
    }
    if item.status != ItemStatusDb::Available {
        return Err(ApiError::ItemUnavailable(
            "Item is not available for borrowing".into(),
        ));
    }

    let categories = CategoryRepository::new(state.pool.clone());
    let category: Category = categories
        .find_by_id(item.category_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".into()))?
        .into();

    if !category_visible_to(auth.role, &category) {
        return Err(ApiError::Forbidden(
            "This equipment is not available to your role".into(),
        ));
    }

    if req.requested_days < 1 {
        return Err(ApiError::Validation(
            "Requested duration must be at least one day".into(),
        ));
    }
    if req.requested_days > category.max_borrow_duration_days {
        return Err(ApiError::DurationExceeded(format!(
            "This category allows at most {} days",
            category.max_borrow_duration_days
        )));
    }

    let settings = SettingRepository::new(state.pool.clone());
    let policy = settings.load_policy().await?;
    let records = IssueRecordRepository::new(state.pool.clone());
    let open = records.count_open_for_user(auth.user_id).await?;
    if open >= policy.max_items_per_user {
        return Err(ApiError::Forbidden(format!(
            "You already hold {} items, the maximum allowed",
            open
        )));
    }

    let requests = IssueRequestRepository::new(state.pool.clone());
    let entity = requests
        .create(auth.user_id, req.item_id, req.purpose.trim(), req.requested_days)
        .await
        .map_err(|e| match &e {
            // Partial unique index on active (user, item) pairs.
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                ApiError::DuplicateRequest(
                    "You already have an active request for this item".into(),
                )
            }
            _ => e.into(),
        })?;

    // Self-service categories skip the review queue.
    let entity = if category.requires_approval {
        entity
    } else {
        requests
            .approve(entity.id, auth.user_id, None)
            .await?
            .unwrap_or(entity)
    };

    audit::record(
        &state.pool,
        audit_helpers::request_submitted(auth.user_id, entity.id, req.item_id),
    );

    // The owning department's in-charge reviews the queue.
    let departments = DepartmentRepository::new(state.pool.clone());
    let incharge_id = departments
        .find_by_id(item.department_id)
        .await?
        .and_then(|d| d.incharge_id);
    if let Some(incharge_id) = incharge_id {
        if let Some(incharge) = users.find_by_id(incharge_id).await? {
            if let Err(e) = state
                .email
                .send_request_submitted(
                    &incharge.email,
                    &incharge.display_name,
                    &borrower.display_name,
                    &item.name,
                    req.purpose.trim(),
                )
                .await
            {
                tracing::warn!(request_id = %entity.id, error = %e, "Submission email failed");
            }
        }
    }

    Ok((StatusCode::CREATED, Json(entity.into())))
}

#[derive(Debug, Deserialize)]
pub struct ListRequestsQuery {
    #[serde(default)]
    pub status: Option<IssueRequestStatus>,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub department_id: Option<Uuid>,
    #[serde(flatten)]
    pub page: PageQuery,
}

pub async fn list_requests(
    auth: UserAuth,
    State(state): State<AppState>,
    Query(query): Query<ListRequestsQuery>,
) -> Result<Json<Paginated<IssueRequest>>, ApiError> {
    // Borrowers only see their own requests.
    let user_filter = if auth.is_staff_level() {
        query.user_id
    } else {
        Some(auth.user_id)
    };

    let requests = IssueRequestRepository::new(state.pool.clone());
    let (limit, offset) = query.page.limit_offset();
    let status = query.status.map(Into::into);
    let entities = requests
        .list(status, user_filter, query.department_id, limit, offset)
        .await?;
    let total = requests
        .count(status, user_filter, query.department_id)
        .await?;

    Ok(Json(Paginated::new(
        entities.into_iter().map(Into::into).collect(),
        PageInfo::new(&query.page, total),
    )))
}

pub async fn get_request(
    auth: UserAuth,
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
) -> Result<Json<IssueRequest>, ApiError> {
    let requests = IssueRequestRepository::new(state.pool.clone());
    let entity = requests
        .find_by_id(request_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Request not found".into()))?;

    if !auth.is_staff_level() && entity.user_id != auth.user_id {
        return Err(ApiError::Forbidden(
            "You may only view your own requests".into(),
        ));
    }

    Ok(Json(entity.into()))
}

pub async fn approve_request(
    auth: UserAuth,
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
    Json(req): Json<ApproveIssueRequest>,
) -> Result<Json<IssueRequest>, ApiError> {
    let requests = IssueRequestRepository::new(state.pool.clone());
    let existing = requests
        .find_by_id(request_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Request not found".into()))?;

    let items = ItemRepository::new(state.pool.clone());
    let item = items
        .find_by_id(existing.item_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Item not found".into()))?;
    access::ensure_department_manager(&state.pool, &auth, item.department_id).await?;

    let entity = requests
        .approve(
            request_id,
            auth.user_id,
            req.collection_instructions.as_deref(),
        )
        .await?
        .ok_or_else(|| ApiError::InvalidState("Request is no longer pending".into()))?;

    audit::record(
        &state.pool,
        audit_helpers::request_approved(auth.user_id, request_id),
    );

    let users = UserRepository::new(state.pool.clone());
    if let Some(borrower) = users.find_by_id(entity.user_id).await? {
        if let Err(e) = state
            .email
            .send_request_approved(
                &borrower.email,
                &borrower.display_name,
                &item.name,
                entity.remarks.as_deref(),
            )
            .await
        {
            tracing::warn!(request_id = %request_id, error = %e, "Approval email failed");
        }
    }

    Ok(Json(entity.into()))
}

pub async fn reject_request(
    auth: UserAuth,
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
    Json(req): Json<RejectIssueRequest>,
) -> Result<Json<IssueRequest>, ApiError> {
    validation::validate_non_empty(&req.reason)
        .map_err(|_| ApiError::Validation("A rejection reason is required".into()))?;

    let requests = IssueRequestRepository::new(state.pool.clone());
    let existing = requests
        .find_by_id(request_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Request not found".into()))?;

    let items = ItemRepository::new(state.pool.clone());
    let item = items
        .find_by_id(existing.item_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Item not found".into()))?;
    access::ensure_department_manager(&state.pool, &auth, item.department_id).await?;

    let entity = requests
        .reject(request_id, auth.user_id, req.reason.trim())
        .await?
        .ok_or_else(|| ApiError::InvalidState("Request is no longer pending".into()))?;

    audit::record(
        &state.pool,
        audit_helpers::request_rejected(auth.user_id, request_id, req.reason.trim()),
    );

    let users = UserRepository::new(state.pool.clone());
    if let Some(borrower) = users.find_by_id(entity.user_id).await? {
        if let Err(e) = state
            .email
            .send_request_rejected(
                &borrower.email,
                &borrower.display_name,
                &item.name,
                req.reason.trim(),
            )
            .await
        {
            tracing::warn!(request_id = %request_id, error = %e, "Rejection email failed");
        }
    }

    Ok(Json(entity.into()))
}

pub async fn cancel_request(
    auth: UserAuth,
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
) -> Result<Json<IssueRequest>, ApiError> {
    let requests = IssueRequestRepository::new(state.pool.clone());
    let Some(entity) = requests.cancel(request_id, auth.user_id).await? else {
        return match requests.find_by_id(request_id).await? {
            Some(other) if other.user_id != auth.user_id => Err(ApiError::Forbidden(
                "You may only cancel your own requests".into(),
            )),
            Some(_) => Err(ApiError::InvalidState(
                "Only pending requests can be cancelled".into(),
            )),
            None => Err(ApiError::NotFound("Request not found".into())),
        };
    };

    audit::record(
        &state.pool,
        audit_helpers::request_cancelled(auth.user_id, request_id),
    );

    Ok(Json(entity.into()))
}

pub async fn issue_item(
    auth: UserAuth,
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
    Json(req): Json<IssueItemRequest>,
) -> Result<(StatusCode, Json<IssueRecord>), ApiError> {
    let requests = IssueRequestRepository::new(state.pool.clone());
    let request = requests
        .find_by_id(request_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Request not found".into()))?;

    let items = ItemRepository::new(state.pool.clone());
    let item = items
        .find_by_id(request.item_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Item not found".into()))?;
    access::ensure_department_manager(&state.pool, &auth, item.department_id).await?;

    let request: IssueRequest = request.into();
    if request.status != IssueRequestStatus::Approved {
        return Err(ApiError::InvalidState(
            "Only approved requests can be issued".into(),
        ));
    }

    // A ban acquired between approval and handover blocks the handover.
    let users = UserRepository::new(state.pool.clone());
    let borrower = eligible_borrower(&users, request.user_id).await?;

    if !req.is_returnable && req.project_name.as_deref().map_or(true, str::is_empty) {
        return Err(ApiError::Validation(
            "Permanent issues require a project name".into(),
        ));
    }
    // Permanent issues record the requester as the responsible party.
    let project_incharge = (!req.is_returnable).then(|| borrower.display_name.clone());

    let approval_date = request.approval_date.unwrap_or_else(Utc::now);
    let expected_return_date = approval_date + Duration::days(i64::from(request.requested_days));

    let records = IssueRecordRepository::new(state.pool.clone());
    let record = records
        .issue(NewIssueRecord {
            request_id,
            item_id: request.item_id,
            user_id: request.user_id,
            department_id: item.department_id,
            issued_by: auth.user_id,
            expected_return_date,
            is_returnable: req.is_returnable,
            project_name: req.project_name.as_deref(),
            project_incharge: project_incharge.as_deref(),
        })
        .await
        .map_err(|e| match &e {
            // Unique request_id: this request was already issued.
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                ApiError::Conflict("This request has already been issued".into())
            }
            _ => e.into(),
        })?
        .ok_or_else(|| {
            ApiError::ItemUnavailable("Item is not available for handover".into())
        })?;

    record_item_issued();
    audit::record(
        &state.pool,
        audit_helpers::item_issued(auth.user_id, record.id, request.item_id),
    );

    if let Err(e) = state
        .email
        .send_item_issued(
            &borrower.email,
            &borrower.display_name,
            &item.name,
            &item.manual_id,
            expected_return_date,
        )
        .await
    {
        tracing::warn!(record_id = %record.id, error = %e, "Issue email failed");
    }

    Ok((StatusCode::CREATED, Json(record.into())))
}
