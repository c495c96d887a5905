//! Issue record repository for database operations.
//!
//! The issue and return flows each touch multiple tables and run inside a
//! single transaction: either every side effect lands or none do.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{IssueRecordEntity, ItemConditionDb, ItemStatusDb, OpenLoanEntity};
use crate::metrics::QueryTimer;

const RECORD_COLUMNS: &str = "id, request_id, item_id, user_id, department_id, issued_by, \
                              issue_date, expected_return_date, actual_return_date, \
                              is_returnable, project_name, project_incharge, return_condition, \
                              damage_remarks, reminder_3days_sent, reminder_1day_sent, \
                              overdue_sent, created_at, updated_at";

/// Parameters for opening an issue record.
#[derive(Debug, Clone)]
pub struct NewIssueRecord<'a> {
    pub request_id: Uuid,
    pub item_id: Uuid,
    pub user_id: Uuid,
    pub department_id: Uuid,
    pub issued_by: Uuid,
    pub expected_return_date: DateTime<Utc>,
    pub is_returnable: bool,
    pub project_name: Option<&'a str>,
    pub project_incharge: Option<&'a str>,
}

/// Which one-shot reminder flag to flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderFlag {
    ThreeDays,
    OneDay,
    Overdue,
}

/// Repository for issue-record database operations.
#[derive(Clone)]
pub struct IssueRecordRepository {
    pool: PgPool,
}

impl IssueRecordRepository {
    /// Creates a new IssueRecordRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Hand an item out against an approved request.
    ///
    /// Inserts the record and flips the item to `issued` in one transaction.
    /// Returns `None` when the item is not `available` (the whole transaction
    /// rolls back). A repeat issue for the same request hits the unique
    /// constraint on `request_id` and surfaces as a database error the caller
    /// maps to a conflict.
    pub async fn issue(
        &self,
        record: NewIssueRecord<'_>,
    ) -> Result<Option<IssueRecordEntity>, sqlx::Error> {
        let timer = QueryTimer::new("issue_item");
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, IssueRecordEntity>(&format!(
            r#"
            INSERT INTO issue_records (request_id, item_id, user_id, department_id, issued_by,
                                       expected_return_date, is_returnable, project_name,
                                       project_incharge)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {RECORD_COLUMNS}
            "#
        ))
        .bind(record.request_id)
        .bind(record.item_id)
        .bind(record.user_id)
        .bind(record.department_id)
        .bind(record.issued_by)
        .bind(record.expected_return_date)
        .bind(record.is_returnable)
        .bind(record.project_name)
        .bind(record.project_incharge)
        .fetch_one(&mut *tx)
        .await?;

        let updated = sqlx::query(
            "UPDATE items SET status = 'issued', updated_at = NOW() \
             WHERE id = $1 AND status = 'available'",
        )
        .bind(record.item_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            timer.record();
            return Ok(None);
        }

        tx.commit().await?;
        timer.record();
        Ok(Some(inserted))
    }

    /// Close an open record, update the item, and apply a ban when the
    /// late-return policy demands one. All three writes commit together.
    ///
    /// Returns `None` when the record is already closed (or absent).
    pub async fn close_return(
        &self,
        record_id: Uuid,
        condition: ItemConditionDb,
        damage_remarks: Option<&str>,
        item_status: ItemStatusDb,
        ban: Option<(Uuid, DateTime<Utc>)>,
    ) -> Result<Option<IssueRecordEntity>, sqlx::Error> {
        let timer = QueryTimer::new("close_return");
        let mut tx = self.pool.begin().await?;

        let closed = sqlx::query_as::<_, IssueRecordEntity>(&format!(
            r#"
            UPDATE issue_records
            SET actual_return_date = NOW(), return_condition = $2, damage_remarks = $3,
                updated_at = NOW()
            WHERE id = $1 AND actual_return_date IS NULL
            RETURNING {RECORD_COLUMNS}
            "#
        ))
        .bind(record_id)
        .bind(condition)
        .bind(damage_remarks)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(closed) = closed else {
            tx.rollback().await?;
            timer.record();
            return Ok(None);
        };

        sqlx::query(
            "UPDATE items SET condition = $2, status = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(closed.item_id)
        .bind(condition)
        .bind(item_status)
        .execute(&mut *tx)
        .await?;

        if let Some((user_id, banned_until)) = ban {
            sqlx::query(
                "UPDATE users SET is_banned = TRUE, banned_until = $2, updated_at = NOW() \
                 WHERE id = $1",
            )
            .bind(user_id)
            .bind(banned_until)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        timer.record();
        Ok(Some(closed))
    }

    /// Find a record by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<IssueRecordEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_issue_record_by_id");
        let result = sqlx::query_as::<_, IssueRecordEntity>(&format!(
            "SELECT {RECORD_COLUMNS} FROM issue_records WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// The open record on an item, if any.
    pub async fn find_open_by_item(
        &self,
        item_id: Uuid,
    ) -> Result<Option<IssueRecordEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_open_record_by_item");
        let result = sqlx::query_as::<_, IssueRecordEntity>(&format!(
            "SELECT {RECORD_COLUMNS} FROM issue_records \
             WHERE item_id = $1 AND actual_return_date IS NULL"
        ))
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// How many loans a user currently holds open.
    pub async fn count_open_for_user(&self, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_open_records_for_user");
        let result = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM issue_records \
             WHERE user_id = $1 AND actual_return_date IS NULL",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List records with optional filters, newest first.
    pub async fn list(
        &self,
        user_id: Option<Uuid>,
        department_id: Option<Uuid>,
        open_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<IssueRecordEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_issue_records");
        let result = sqlx::query_as::<_, IssueRecordEntity>(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM issue_records
            WHERE ($1::UUID IS NULL OR user_id = $1)
              AND ($2::UUID IS NULL OR department_id = $2)
              AND (NOT $3 OR actual_return_date IS NULL)
            ORDER BY issue_date DESC
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(user_id)
        .bind(department_id)
        .bind(open_only)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count records for pagination.
    pub async fn count(
        &self,
        user_id: Option<Uuid>,
        department_id: Option<Uuid>,
        open_only: bool,
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_issue_records");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM issue_records
            WHERE ($1::UUID IS NULL OR user_id = $1)
              AND ($2::UUID IS NULL OR department_id = $2)
              AND (NOT $3 OR actual_return_date IS NULL)
            "#,
        )
        .bind(user_id)
        .bind(department_id)
        .bind(open_only)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Open returnable loans joined with borrower and item details, for the
    /// reminder engine.
    pub async fn list_open_with_context(&self) -> Result<Vec<OpenLoanEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_open_loans_with_context");
        let result = sqlx::query_as::<_, OpenLoanEntity>(
            r#"
            SELECT r.id, r.user_id, r.item_id, r.expected_return_date,
                   r.reminder_3days_sent, r.reminder_1day_sent, r.overdue_sent,
                   u.email AS borrower_email, u.display_name AS borrower_name,
                   i.name AS item_name, i.manual_id AS item_manual_id
            FROM issue_records r
            JOIN users u ON r.user_id = u.id
            JOIN items i ON r.item_id = i.id
            WHERE r.actual_return_date IS NULL AND r.is_returnable = TRUE
            ORDER BY r.expected_return_date
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Open a transaction that claims a one-shot reminder flag.
    ///
    /// The guarded update locks the record row and flips the flag inside
    /// the returned transaction. The caller commits after the email send
    /// succeeds, or rolls back on failure so the next sweep retries.
    /// Returns `None` when the flag is already set (another run sent it).
    pub async fn begin_reminder_claim(
        &self,
        record_id: Uuid,
        flag: ReminderFlag,
    ) -> Result<Option<sqlx::Transaction<'static, sqlx::Postgres>>, sqlx::Error> {
        let timer = QueryTimer::new("begin_reminder_claim");
        let query = match flag {
            ReminderFlag::ThreeDays => {
                "UPDATE issue_records SET reminder_3days_sent = TRUE, updated_at = NOW() \
                 WHERE id = $1 AND reminder_3days_sent = FALSE"
            }
            ReminderFlag::OneDay => {
                "UPDATE issue_records SET reminder_1day_sent = TRUE, updated_at = NOW() \
                 WHERE id = $1 AND reminder_1day_sent = FALSE"
            }
            ReminderFlag::Overdue => {
                "UPDATE issue_records SET overdue_sent = TRUE, updated_at = NOW() \
                 WHERE id = $1 AND overdue_sent = FALSE"
            }
        };

        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(query).bind(record_id).execute(&mut *tx).await;
        timer.record();

        if result?.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }
        Ok(Some(tx))
    }
}
