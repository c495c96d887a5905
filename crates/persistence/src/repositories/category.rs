//! Category repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::CategoryEntity;
use crate::metrics::QueryTimer;

const CATEGORY_COLUMNS: &str = "id, name, max_borrow_duration_days, requires_approval, \
                                visible_to_students, visible_to_staff, created_at, updated_at";

/// Repository for category-related database operations.
#[derive(Clone)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a category.
    pub async fn create(
        &self,
        name: &str,
        max_borrow_duration_days: i32,
        requires_approval: bool,
        visible_to_students: bool,
        visible_to_staff: bool,
    ) -> Result<CategoryEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_category");
        let result = sqlx::query_as::<_, CategoryEntity>(&format!(
            r#"
            INSERT INTO categories (name, max_borrow_duration_days, requires_approval,
                                    visible_to_students, visible_to_staff)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(max_borrow_duration_days)
        .bind(requires_approval)
        .bind(visible_to_students)
        .bind(visible_to_staff)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a category by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<CategoryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_category_by_id");
        let result = sqlx::query_as::<_, CategoryEntity>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List all categories, alphabetically.
    pub async fn list(&self) -> Result<Vec<CategoryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_categories");
        let result = sqlx::query_as::<_, CategoryEntity>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Update the mutable fields of a category. `None` keeps the current value.
    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        max_borrow_duration_days: Option<i32>,
        requires_approval: Option<bool>,
        visible_to_students: Option<bool>,
        visible_to_staff: Option<bool>,
    ) -> Result<Option<CategoryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_category");
        let result = sqlx::query_as::<_, CategoryEntity>(&format!(
            r#"
            UPDATE categories
            SET name = COALESCE($2, name),
                max_borrow_duration_days = COALESCE($3, max_borrow_duration_days),
                requires_approval = COALESCE($4, requires_approval),
                visible_to_students = COALESCE($5, visible_to_students),
                visible_to_staff = COALESCE($6, visible_to_staff),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(name)
        .bind(max_borrow_duration_days)
        .bind(requires_approval)
        .bind(visible_to_students)
        .bind(visible_to_staff)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete a category. Fails with a foreign-key error while items
    /// still reference it.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_category");
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        result.map(|r| r.rows_affected() > 0)
    }
}
