//! Issue request repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{IssueRequestEntity, IssueRequestStatusDb};
use crate::metrics::QueryTimer;

const REQUEST_COLUMNS: &str = "id, user_id, item_id, purpose, requested_days, status, \
                               approved_by, approval_date, rejection_reason, remarks, \
                               created_at, updated_at";

/// Repository for borrow-request database operations.
///
/// Every transition out of `pending` is guarded by the current status in the
/// WHERE clause; a lost race surfaces as `None` and the caller reports a
/// conflict instead of double-applying the transition.
#[derive(Clone)]
pub struct IssueRequestRepository {
    pool: PgPool,
}

impl IssueRequestRepository {
    /// Creates a new IssueRequestRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Submit a borrow request. The partial unique index on active
    /// (user, item) pairs turns a duplicate submit into a unique violation.
    pub async fn create(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        purpose: &str,
        requested_days: i32,
    ) -> Result<IssueRequestEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_issue_request");
        let result = sqlx::query_as::<_, IssueRequestEntity>(&format!(
            r#"
            INSERT INTO issue_requests (user_id, item_id, purpose, requested_days)
            VALUES ($1, $2, $3, $4)
            RETURNING {REQUEST_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(item_id)
        .bind(purpose)
        .bind(requested_days)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a request by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<IssueRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_issue_request_by_id");
        let result = sqlx::query_as::<_, IssueRequestEntity>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM issue_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List requests with optional filters, newest first.
    pub async fn list(
        &self,
        status: Option<IssueRequestStatusDb>,
        user_id: Option<Uuid>,
        department_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<IssueRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_issue_requests");
        let result = sqlx::query_as::<_, IssueRequestEntity>(&format!(
            r#"
            SELECT r.id, r.user_id, r.item_id, r.purpose, r.requested_days, r.status,
                   r.approved_by, r.approval_date, r.rejection_reason, r.remarks,
                   r.created_at, r.updated_at
            FROM issue_requests r
            JOIN items i ON r.item_id = i.id
            WHERE ($1::issue_request_status IS NULL OR r.status = $1)
              AND ($2::UUID IS NULL OR r.user_id = $2)
              AND ($3::UUID IS NULL OR i.department_id = $3)
            ORDER BY r.created_at DESC
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(status)
        .bind(user_id)
        .bind(department_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count requests for pagination.
    pub async fn count(
        &self,
        status: Option<IssueRequestStatusDb>,
        user_id: Option<Uuid>,
        department_id: Option<Uuid>,
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_issue_requests");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM issue_requests r
            JOIN items i ON r.item_id = i.id
            WHERE ($1::issue_request_status IS NULL OR r.status = $1)
              AND ($2::UUID IS NULL OR r.user_id = $2)
              AND ($3::UUID IS NULL OR i.department_id = $3)
            "#,
        )
        .bind(status)
        .bind(user_id)
        .bind(department_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// The live (pending or approved) request a user holds on an item.
    pub async fn find_active_for_user_item(
        &self,
        user_id: Uuid,
        item_id: Uuid,
    ) -> Result<Option<IssueRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_active_issue_request");
        let result = sqlx::query_as::<_, IssueRequestEntity>(&format!(
            r#"
            SELECT {REQUEST_COLUMNS}
            FROM issue_requests
            WHERE user_id = $1 AND item_id = $2 AND status IN ('pending', 'approved')
            "#
        ))
        .bind(user_id)
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Approve a pending request. Returns None when it is no longer pending.
    pub async fn approve(
        &self,
        id: Uuid,
        approved_by: Uuid,
        remarks: Option<&str>,
    ) -> Result<Option<IssueRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("approve_issue_request");
        let result = sqlx::query_as::<_, IssueRequestEntity>(&format!(
            r#"
            UPDATE issue_requests
            SET status = 'approved', approved_by = $2, approval_date = NOW(),
                remarks = $3, updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING {REQUEST_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(approved_by)
        .bind(remarks)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Reject a pending request. Returns None when it is no longer pending.
    pub async fn reject(
        &self,
        id: Uuid,
        rejected_by: Uuid,
        reason: &str,
    ) -> Result<Option<IssueRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("reject_issue_request");
        let result = sqlx::query_as::<_, IssueRequestEntity>(&format!(
            r#"
            UPDATE issue_requests
            SET status = 'rejected', approved_by = $2, rejection_reason = $3, updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING {REQUEST_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(rejected_by)
        .bind(reason)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Cancel a pending request, only by the user who opened it.
    pub async fn cancel(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<IssueRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("cancel_issue_request");
        let result = sqlx::query_as::<_, IssueRequestEntity>(&format!(
            r#"
            UPDATE issue_requests
            SET status = 'cancelled', updated_at = NOW()
            WHERE id = $1 AND user_id = $2 AND status = 'pending'
            RETURNING {REQUEST_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }
}
