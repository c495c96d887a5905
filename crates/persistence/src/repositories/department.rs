//! Department repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::DepartmentEntity;
use crate::metrics::QueryTimer;

const DEPARTMENT_COLUMNS: &str = "id, name, code, incharge_id, created_at, updated_at";

/// Repository for department-related database operations.
#[derive(Clone)]
pub struct DepartmentRepository {
    pool: PgPool,
}

impl DepartmentRepository {
    /// Creates a new DepartmentRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a department.
    pub async fn create(&self, name: &str, code: &str) -> Result<DepartmentEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_department");
        let result = sqlx::query_as::<_, DepartmentEntity>(&format!(
            r#"
            INSERT INTO departments (name, code)
            VALUES ($1, UPPER($2))
            RETURNING {DEPARTMENT_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(code)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a department by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<DepartmentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_department_by_id");
        let result = sqlx::query_as::<_, DepartmentEntity>(&format!(
            "SELECT {DEPARTMENT_COLUMNS} FROM departments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a department by its code.
    pub async fn find_by_code(&self, code: &str) -> Result<Option<DepartmentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_department_by_code");
        let result = sqlx::query_as::<_, DepartmentEntity>(&format!(
            "SELECT {DEPARTMENT_COLUMNS} FROM departments WHERE code = UPPER($1)"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List all departments, alphabetically.
    pub async fn list(&self) -> Result<Vec<DepartmentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_departments");
        let result = sqlx::query_as::<_, DepartmentEntity>(&format!(
            "SELECT {DEPARTMENT_COLUMNS} FROM departments ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Update a department's name. The code is immutable once items exist
    /// under it, so it is not updatable here.
    pub async fn update_name(
        &self,
        id: Uuid,
        name: &str,
    ) -> Result<Option<DepartmentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_department_name");
        let result = sqlx::query_as::<_, DepartmentEntity>(&format!(
            r#"
            UPDATE departments
            SET name = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {DEPARTMENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Assign (or clear) the incharge of a department.
    pub async fn assign_incharge(
        &self,
        id: Uuid,
        incharge_id: Option<Uuid>,
    ) -> Result<Option<DepartmentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("assign_department_incharge");
        let result = sqlx::query_as::<_, DepartmentEntity>(&format!(
            r#"
            UPDATE departments
            SET incharge_id = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {DEPARTMENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(incharge_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Departments a user is incharge of.
    pub async fn managed_by(&self, user_id: Uuid) -> Result<Vec<DepartmentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("departments_managed_by");
        let result = sqlx::query_as::<_, DepartmentEntity>(&format!(
            "SELECT {DEPARTMENT_COLUMNS} FROM departments WHERE incharge_id = $1 ORDER BY name"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Whether a user is the incharge of a specific department.
    pub async fn is_incharge_of(
        &self,
        user_id: Uuid,
        department_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("is_incharge_of");
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM departments WHERE id = $1 AND incharge_id = $2)",
        )
        .bind(department_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete a department. Fails with a foreign-key error while items
    /// still belong to it.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_department");
        let result = sqlx::query("DELETE FROM departments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        result.map(|r| r.rows_affected() > 0)
    }
}
