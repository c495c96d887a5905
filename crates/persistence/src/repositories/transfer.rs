//! Transfer repository for database operations.
//!
//! Completing a transfer moves custody (or splits consumable stock) and
//! writes the durable transfer record in one transaction.

use domain::services::manual_id::format_manual_id;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{TransferRecordEntity, TransferRequestEntity, TransferRequestStatusDb};
use crate::metrics::QueryTimer;
use crate::repositories::item::reserve_manual_id_seq;

const TRANSFER_REQUEST_COLUMNS: &str =
    "id, item_id, from_department_id, to_department_id, requested_by, quantity, purpose, \
     status, rejection_reason, reviewed_by, reviewed_at, created_at, updated_at";

const TRANSFER_RECORD_COLUMNS: &str =
    "id, request_id, item_id, from_department_id, to_department_id, transferred_by, \
     quantity, notes, created_at";

/// Repository for transfer-related database operations.
#[derive(Clone)]
pub struct TransferRepository {
    pool: PgPool,
}

impl TransferRepository {
    /// Creates a new TransferRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a transfer request.
    pub async fn create(
        &self,
        item_id: Uuid,
        from_department_id: Uuid,
        to_department_id: Uuid,
        requested_by: Uuid,
        quantity: i32,
        purpose: &str,
    ) -> Result<TransferRequestEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_transfer_request");
        let result = sqlx::query_as::<_, TransferRequestEntity>(&format!(
            r#"
            INSERT INTO transfer_requests (item_id, from_department_id, to_department_id,
                                           requested_by, quantity, purpose)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {TRANSFER_REQUEST_COLUMNS}
            "#
        ))
        .bind(item_id)
        .bind(from_department_id)
        .bind(to_department_id)
        .bind(requested_by)
        .bind(quantity)
        .bind(purpose)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a transfer request by ID.
    pub async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<TransferRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_transfer_request_by_id");
        let result = sqlx::query_as::<_, TransferRequestEntity>(&format!(
            "SELECT {TRANSFER_REQUEST_COLUMNS} FROM transfer_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List transfer requests with optional filters, newest first.
    pub async fn list(
        &self,
        status: Option<TransferRequestStatusDb>,
        department_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TransferRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_transfer_requests");
        let result = sqlx::query_as::<_, TransferRequestEntity>(&format!(
            r#"
            SELECT {TRANSFER_REQUEST_COLUMNS}
            FROM transfer_requests
            WHERE ($1::transfer_request_status IS NULL OR status = $1)
              AND ($2::UUID IS NULL OR from_department_id = $2 OR to_department_id = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(status)
        .bind(department_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count transfer requests for pagination.
    pub async fn count(
        &self,
        status: Option<TransferRequestStatusDb>,
        department_id: Option<Uuid>,
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_transfer_requests");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM transfer_requests
            WHERE ($1::transfer_request_status IS NULL OR status = $1)
              AND ($2::UUID IS NULL OR from_department_id = $2 OR to_department_id = $2)
            "#,
        )
        .bind(status)
        .bind(department_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Approve a pending transfer request. Returns None when it is no longer
    /// pending.
    pub async fn approve(
        &self,
        id: Uuid,
        reviewed_by: Uuid,
    ) -> Result<Option<TransferRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("approve_transfer_request");
        let result = sqlx::query_as::<_, TransferRequestEntity>(&format!(
            r#"
            UPDATE transfer_requests
            SET status = 'approved', reviewed_by = $2, reviewed_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING {TRANSFER_REQUEST_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(reviewed_by)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Reject a pending transfer request. Returns None when it is no longer
    /// pending.
    pub async fn reject(
        &self,
        id: Uuid,
        reviewed_by: Uuid,
        reason: &str,
    ) -> Result<Option<TransferRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("reject_transfer_request");
        let result = sqlx::query_as::<_, TransferRequestEntity>(&format!(
            r#"
            UPDATE transfer_requests
            SET status = 'rejected', reviewed_by = $2, reviewed_at = NOW(),
                rejection_reason = $3, updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING {TRANSFER_REQUEST_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(reviewed_by)
        .bind(reason)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Complete an approved transfer.
    ///
    /// For consumables the source stock is decremented (floored at zero) and
    /// the destination either gains stock on a matching item or receives a
    /// newly created one with its own manual identifier. Non-consumables are
    /// reassigned to the destination wholesale. The status guard on the
    /// request makes the operation idempotent: a second completion sees no
    /// `approved` row and returns `None`.
    pub async fn complete(
        &self,
        id: Uuid,
        completed_by: Uuid,
        notes: Option<&str>,
    ) -> Result<Option<TransferRecordEntity>, sqlx::Error> {
        let timer = QueryTimer::new("complete_transfer");
        let mut tx = self.pool.begin().await?;

        let request = sqlx::query_as::<_, TransferRequestEntity>(&format!(
            r#"
            UPDATE transfer_requests
            SET status = 'completed', updated_at = NOW()
            WHERE id = $1 AND status = 'approved'
            RETURNING {TRANSFER_REQUEST_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(request) = request else {
            tx.rollback().await?;
            timer.record();
            return Ok(None);
        };

        let (is_consumable, item_name, category_id): (bool, String, Uuid) =
            sqlx::query_as("SELECT is_consumable, name, category_id FROM items WHERE id = $1 FOR UPDATE")
                .bind(request.item_id)
                .fetch_one(&mut *tx)
                .await?;

        if is_consumable {
            sqlx::query(
                "UPDATE items SET current_stock = GREATEST(current_stock - $2, 0), \
                 updated_at = NOW() WHERE id = $1",
            )
            .bind(request.item_id)
            .bind(request.quantity)
            .execute(&mut *tx)
            .await?;

            let sibling: Option<Uuid> = sqlx::query_scalar(
                r#"
                SELECT id FROM items
                WHERE department_id = $1 AND name = $2 AND category_id = $3
                  AND is_consumable = TRUE
                FOR UPDATE
                "#,
            )
            .bind(request.to_department_id)
            .bind(&item_name)
            .bind(category_id)
            .fetch_optional(&mut *tx)
            .await?;

            match sibling {
                Some(sibling_id) => {
                    sqlx::query(
                        "UPDATE items SET current_stock = COALESCE(current_stock, 0) + $2, \
                         updated_at = NOW() WHERE id = $1",
                    )
                    .bind(sibling_id)
                    .bind(request.quantity)
                    .execute(&mut *tx)
                    .await?;
                }
                None => {
                    let dest_code: String =
                        sqlx::query_scalar("SELECT code FROM departments WHERE id = $1")
                            .bind(request.to_department_id)
                            .fetch_one(&mut *tx)
                            .await?;
                    let sequence = reserve_manual_id_seq(&mut tx, &dest_code).await?;
                    let manual_id = format_manual_id(&dest_code, sequence);

                    sqlx::query(
                        r#"
                        INSERT INTO items (manual_id, name, category_id, department_id,
                                           condition, is_consumable, current_stock,
                                           min_stock_level, source_department_id,
                                           description, specifications, image_url)
                        SELECT $1, name, category_id, $2, condition, TRUE, $3,
                               min_stock_level, $4, description, specifications, image_url
                        FROM items WHERE id = $5
                        "#,
                    )
                    .bind(&manual_id)
                    .bind(request.to_department_id)
                    .bind(request.quantity)
                    .bind(request.from_department_id)
                    .bind(request.item_id)
                    .execute(&mut *tx)
                    .await?;
                }
            }
        } else {
            sqlx::query(
                r#"
                UPDATE items
                SET department_id = $2, source_department_id = $3, status = 'available',
                    updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(request.item_id)
            .bind(request.to_department_id)
            .bind(request.from_department_id)
            .execute(&mut *tx)
            .await?;
        }

        let record = sqlx::query_as::<_, TransferRecordEntity>(&format!(
            r#"
            INSERT INTO transfer_records (request_id, item_id, from_department_id,
                                          to_department_id, transferred_by, quantity, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {TRANSFER_RECORD_COLUMNS}
            "#
        ))
        .bind(request.id)
        .bind(request.item_id)
        .bind(request.from_department_id)
        .bind(request.to_department_id)
        .bind(completed_by)
        .bind(request.quantity)
        .bind(notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(Some(record))
    }

    /// List completed transfer records, newest first.
    pub async fn list_records(
        &self,
        department_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TransferRecordEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_transfer_records");
        let result = sqlx::query_as::<_, TransferRecordEntity>(&format!(
            r#"
            SELECT {TRANSFER_RECORD_COLUMNS}
            FROM transfer_records
            WHERE ($1::UUID IS NULL OR from_department_id = $1 OR to_department_id = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(department_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
