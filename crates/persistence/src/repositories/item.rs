//! Item repository for database operations.

use domain::services::manual_id::format_manual_id;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::entities::{ItemAccessEntity, ItemConditionDb, ItemEntity, ItemStatusDb};
use crate::metrics::QueryTimer;

const ITEM_COLUMNS: &str = "id, manual_id, name, category_id, department_id, condition, status, \
                            is_consumable, current_stock, min_stock_level, source_department_id, \
                            description, specifications, image_url, created_at, updated_at";

/// Parameters for inserting a new item.
#[derive(Debug, Clone)]
pub struct NewItem<'a> {
    pub name: &'a str,
    pub category_id: Uuid,
    pub department_id: Uuid,
    pub condition: ItemConditionDb,
    pub is_consumable: bool,
    pub current_stock: Option<i32>,
    pub min_stock_level: Option<i32>,
    pub description: Option<&'a str>,
    pub specifications: Option<&'a str>,
    pub image_url: Option<&'a str>,
}

/// Repository for item-related database operations.
#[derive(Clone)]
pub struct ItemRepository {
    pool: PgPool,
}

impl ItemRepository {
    /// Creates a new ItemRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an item, reserving its manual identifier in the same
    /// transaction so concurrent creates under one department cannot
    /// collide.
    pub async fn create(
        &self,
        department_code: &str,
        item: NewItem<'_>,
    ) -> Result<ItemEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_item");
        let mut tx = self.pool.begin().await?;

        let sequence = reserve_manual_id_seq(&mut tx, department_code).await?;
        let manual_id = format_manual_id(department_code, sequence);

        let result = sqlx::query_as::<_, ItemEntity>(&format!(
            r#"
            INSERT INTO items (manual_id, name, category_id, department_id, condition,
                               is_consumable, current_stock, min_stock_level,
                               description, specifications, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(&manual_id)
        .bind(item.name)
        .bind(item.category_id)
        .bind(item.department_id)
        .bind(item.condition)
        .bind(item.is_consumable)
        .bind(item.current_stock)
        .bind(item.min_stock_level)
        .bind(item.description)
        .bind(item.specifications)
        .bind(item.image_url)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(result)
    }

    /// Find an item by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ItemEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_item_by_id");
        let result = sqlx::query_as::<_, ItemEntity>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find an item by its manual identifier.
    pub async fn find_by_manual_id(
        &self,
        manual_id: &str,
    ) -> Result<Option<ItemEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_item_by_manual_id");
        let result = sqlx::query_as::<_, ItemEntity>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE manual_id = $1"
        ))
        .bind(manual_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List items with optional department and category filters.
    pub async fn list(
        &self,
        department_id: Option<Uuid>,
        category_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ItemEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_items");
        let result = sqlx::query_as::<_, ItemEntity>(&format!(
            r#"
            SELECT {ITEM_COLUMNS}
            FROM items
            WHERE ($1::UUID IS NULL OR department_id = $1)
              AND ($2::UUID IS NULL OR category_id = $2)
            ORDER BY manual_id
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(department_id)
        .bind(category_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count items for pagination.
    pub async fn count(
        &self,
        department_id: Option<Uuid>,
        category_id: Option<Uuid>,
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_items");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM items
            WHERE ($1::UUID IS NULL OR department_id = $1)
              AND ($2::UUID IS NULL OR category_id = $2)
            "#,
        )
        .bind(department_id)
        .bind(category_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Update the mutable fields of an item. `None` keeps the current value.
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        condition: Option<ItemConditionDb>,
        current_stock: Option<i32>,
        min_stock_level: Option<i32>,
        description: Option<&str>,
        specifications: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<Option<ItemEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_item");
        let result = sqlx::query_as::<_, ItemEntity>(&format!(
            r#"
            UPDATE items
            SET name = COALESCE($2, name),
                condition = COALESCE($3, condition),
                current_stock = COALESCE($4, current_stock),
                min_stock_level = COALESCE($5, min_stock_level),
                description = COALESCE($6, description),
                specifications = COALESCE($7, specifications),
                image_url = COALESCE($8, image_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(name)
        .bind(condition)
        .bind(current_stock)
        .bind(min_stock_level)
        .bind(description)
        .bind(specifications)
        .bind(image_url)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Set an item's status unconditionally (maintenance flows).
    pub async fn set_status(
        &self,
        id: Uuid,
        status: ItemStatusDb,
    ) -> Result<Option<ItemEntity>, sqlx::Error> {
        let timer = QueryTimer::new("set_item_status");
        let result = sqlx::query_as::<_, ItemEntity>(&format!(
            r#"
            UPDATE items
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Consumables at or below their minimum stock level.
    pub async fn list_low_stock(
        &self,
        department_id: Option<Uuid>,
    ) -> Result<Vec<ItemEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_low_stock_items");
        let result = sqlx::query_as::<_, ItemEntity>(&format!(
            r#"
            SELECT {ITEM_COLUMNS}
            FROM items
            WHERE is_consumable = TRUE
              AND current_stock IS NOT NULL
              AND min_stock_level IS NOT NULL
              AND current_stock <= min_stock_level
              AND ($1::UUID IS NULL OR department_id = $1)
            ORDER BY manual_id
            "#
        ))
        .bind(department_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Grant a department visibility and optionally transfer rights on an item.
    pub async fn grant_access(
        &self,
        item_id: Uuid,
        department_id: Uuid,
        can_transfer: bool,
        granted_by: Uuid,
    ) -> Result<ItemAccessEntity, sqlx::Error> {
        let timer = QueryTimer::new("grant_item_access");
        let result = sqlx::query_as::<_, ItemAccessEntity>(
            r#"
            INSERT INTO item_department_access (item_id, department_id, can_transfer, granted_by)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (item_id, department_id)
            DO UPDATE SET can_transfer = $3, granted_by = $4
            RETURNING item_id, department_id, can_transfer, granted_by, created_at
            "#,
        )
        .bind(item_id)
        .bind(department_id)
        .bind(can_transfer)
        .bind(granted_by)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Revoke a department's access to an item.
    pub async fn revoke_access(
        &self,
        item_id: Uuid,
        department_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("revoke_item_access");
        let result = sqlx::query(
            "DELETE FROM item_department_access WHERE item_id = $1 AND department_id = $2",
        )
        .bind(item_id)
        .bind(department_id)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|r| r.rows_affected() > 0)
    }

    /// Look up an access grant.
    pub async fn find_access(
        &self,
        item_id: Uuid,
        department_id: Uuid,
    ) -> Result<Option<ItemAccessEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_item_access");
        let result = sqlx::query_as::<_, ItemAccessEntity>(
            r#"
            SELECT item_id, department_id, can_transfer, granted_by, created_at
            FROM item_department_access
            WHERE item_id = $1 AND department_id = $2
            "#,
        )
        .bind(item_id)
        .bind(department_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List the access grants on an item.
    pub async fn list_access(&self, item_id: Uuid) -> Result<Vec<ItemAccessEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_item_access");
        let result = sqlx::query_as::<_, ItemAccessEntity>(
            r#"
            SELECT item_id, department_id, can_transfer, granted_by, created_at
            FROM item_department_access
            WHERE item_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete an item. Fails with a foreign-key error while issue records
    /// reference it.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_item");
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        result.map(|r| r.rows_affected() > 0)
    }
}

/// Atomically reserve the next manual-ID sequence number for a department
/// code. The upsert increments under row lock, so two concurrent reservations
/// always observe distinct numbers.
pub(crate) async fn reserve_manual_id_seq(
    tx: &mut Transaction<'_, Postgres>,
    department_code: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO manual_id_sequences (department_code, next_seq)
        VALUES ($1, 2)
        ON CONFLICT (department_code)
        DO UPDATE SET next_seq = manual_id_sequences.next_seq + 1
        RETURNING next_seq - 1
        "#,
    )
    .bind(department_code)
    .fetch_one(&mut **tx)
    .await
}
