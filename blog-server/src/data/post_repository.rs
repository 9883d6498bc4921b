use crate::domain::category::CategoryRef;
use crate::domain::post::{NewPost, Post, PostPatch, PostWithCategory};
use crate::domain::DomainError;
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

/// Filters applied to the post listing. Limit and offset are already
/// validated by the service.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub limit: i64,
    pub offset: i64,
    pub category_id: Option<i64>,
    pub search: Option<String>,
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, post: NewPost) -> Result<PostWithCategory, DomainError>;
    async fn find_by_id(&self, id: i64) -> Result<PostWithCategory, DomainError>;
    async fn update(&self, id: i64, patch: PostPatch) -> Result<PostWithCategory, DomainError>;
    async fn delete(&self, id: i64) -> Result<(), DomainError>;
    /// Returns the requested page plus the total count with the same
    /// filters applied.
    async fn list(&self, filter: PostFilter) -> Result<(Vec<PostWithCategory>, i64), DomainError>;
    async fn slug_exists(&self, slug: &str) -> Result<bool, DomainError>;
}

pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const POST_COLUMNS: &str = "p.id, p.title, p.content, p.excerpt, p.slug, p.category_id, \
     p.tags, p.featured_image, p.created_at, p.updated_at, \
     c.id AS category_ref_id, c.name AS category_name, c.color AS category_color";

fn map_post_row(row: &PgRow) -> Result<PostWithCategory, DomainError> {
    let post = Post {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        excerpt: row.try_get("excerpt")?,
        slug: row.try_get("slug")?,
        category_id: row.try_get("category_id")?,
        tags: row.try_get("tags")?,
        featured_image: row.try_get("featured_image")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    };

    let category = match row.try_get::<Option<i64>, _>("category_ref_id")? {
        Some(id) => Some(CategoryRef {
            id,
            name: row.try_get("category_name")?,
            color: row.try_get("category_color")?,
        }),
        None => None,
    };

    Ok(PostWithCategory { post, category })
}

/// Escapes LIKE wildcards so user input is matched literally.
fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &PostFilter) {
    if let Some(category_id) = filter.category_id {
        builder.push(" AND p.category_id = ").push_bind(category_id);
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", escape_like(search));
        builder
            .push(" AND (p.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.content ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, post: NewPost) -> Result<PostWithCategory, DomainError> {
        let sql = format!(
            r#"
            WITH p AS (
                INSERT INTO posts (title, content, excerpt, slug, category_id, tags, featured_image)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING *
            )
            SELECT {POST_COLUMNS}
            FROM p
            LEFT JOIN categories c ON c.id = p.category_id
            "#
        );

        let row = sqlx::query(&sql)
            .bind(&post.title)
            .bind(&post.content)
            .bind(&post.excerpt)
            .bind(&post.slug)
            .bind(post.category_id)
            .bind(&post.tags)
            .bind(&post.featured_image)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create post: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;

        map_post_row(&row)
    }

    async fn find_by_id(&self, id: i64) -> Result<PostWithCategory, DomainError> {
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts p
            LEFT JOIN categories c ON c.id = p.category_id
            WHERE p.id = $1
            "#
        );

        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        match row {
            Some(row) => map_post_row(&row),
            None => Err(DomainError::PostNotFound),
        }
    }

    async fn update(&self, id: i64, patch: PostPatch) -> Result<PostWithCategory, DomainError> {
        let sql = format!(
            r#"
            WITH p AS (
                UPDATE posts
                SET
                    title = COALESCE($1, title),
                    content = COALESCE($2, content),
                    excerpt = COALESCE($3, excerpt),
                    slug = COALESCE($4, slug),
                    category_id = COALESCE($5, category_id),
                    tags = COALESCE($6, tags),
                    featured_image = COALESCE($7, featured_image),
                    updated_at = NOW()
                WHERE id = $8
                RETURNING *
            )
            SELECT {POST_COLUMNS}
            FROM p
            LEFT JOIN categories c ON c.id = p.category_id
            "#
        );

        let row = sqlx::query(&sql)
            .bind(patch.title)
            .bind(patch.content)
            .bind(patch.excerpt)
            .bind(patch.slug)
            .bind(patch.category_id)
            .bind(patch.tags)
            .bind(patch.featured_image)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        match row {
            Some(row) => map_post_row(&row),
            None => Err(DomainError::PostNotFound),
        }
    }

    async fn delete(&self, id: i64) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            Err(DomainError::PostNotFound)
        } else {
            Ok(())
        }
    }

    async fn list(&self, filter: PostFilter) -> Result<(Vec<PostWithCategory>, i64), DomainError> {
        // Total count with the same filters, for pagination metadata.
        let mut count_query =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM posts p WHERE TRUE");
        push_filters(&mut count_query, &filter);

        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {POST_COLUMNS} FROM posts p \
             LEFT JOIN categories c ON c.id = p.category_id WHERE TRUE"
        ));
        push_filters(&mut query, &filter);
        query
            .push(" ORDER BY p.created_at DESC LIMIT ")
            .push_bind(filter.limit)
            .push(" OFFSET ")
            .push_bind(filter.offset);

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        let posts = rows
            .iter()
            .map(map_post_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((posts, total))
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, DomainError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM posts WHERE slug = $1)")
                .bind(slug)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        Ok(exists)
    }
}
