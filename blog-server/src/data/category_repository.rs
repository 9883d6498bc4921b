use crate::domain::category::{Category, UpdateCategoryRequest};
use crate::domain::DomainError;
use async_trait::async_trait;
use sqlx::{PgPool, Row};

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create(&self, name: &str, color: &str) -> Result<Category, DomainError>;
    async fn list(&self) -> Result<Vec<Category>, DomainError>;
    async fn update(&self, id: i64, req: UpdateCategoryRequest) -> Result<Category, DomainError>;
    async fn delete(&self, id: i64) -> Result<(), DomainError>;
}

pub struct PostgresCategoryRepository {
    pool: PgPool,
}

impl PostgresCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_category_row(row: &sqlx::postgres::PgRow) -> Result<Category, DomainError> {
    Ok(Category {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        color: row.try_get("color")?,
    })
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn create(&self, name: &str, color: &str) -> Result<Category, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO categories (name, color)
            VALUES ($1, $2)
            RETURNING id, name, color
            "#,
        )
        .bind(name)
        .bind(color)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create category: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        map_category_row(&row)
    }

    async fn list(&self) -> Result<Vec<Category>, DomainError> {
        let rows = sqlx::query("SELECT id, name, color FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        rows.iter().map(map_category_row).collect()
    }

    async fn update(&self, id: i64, req: UpdateCategoryRequest) -> Result<Category, DomainError> {
        let row = sqlx::query(
            r#"
            UPDATE categories
            SET
                name = COALESCE($1, name),
                color = COALESCE($2, color)
            WHERE id = $3
            RETURNING id, name, color
            "#,
        )
        .bind(req.name)
        .bind(req.color)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        match row {
            Some(row) => map_category_row(&row),
            None => Err(DomainError::CategoryNotFound),
        }
    }

    async fn delete(&self, id: i64) -> Result<(), DomainError> {
        // Referencing posts are detached by the FK's ON DELETE SET NULL.
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            Err(DomainError::CategoryNotFound)
        } else {
            Ok(())
        }
    }
}
