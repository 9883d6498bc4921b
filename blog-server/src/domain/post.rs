use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::category::CategoryRef;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub slug: String,
    pub category_id: Option<i64>,
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Missing title/content deserialize to empty strings so validation can
/// answer with the usual `{"error": ...}` body instead of a decode failure.
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub excerpt: Option<String>,
    pub category_id: Option<i64>,
    pub tags: Option<Vec<String>>,
    pub featured_image: Option<String>,
}

/// Partial update: absent fields keep the stored value, present fields
/// overwrite it.
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub category_id: Option<i64>,
    pub tags: Option<Vec<String>>,
    pub featured_image: Option<String>,
}

/// Fully derived row ready for insertion: slug and excerpt already computed.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub slug: String,
    pub category_id: Option<i64>,
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
}

/// Column changes applied by the repository; `slug` is set by the service
/// whenever the title changes.
#[derive(Debug, Default, Clone)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub slug: Option<String>,
    pub category_id: Option<i64>,
    pub tags: Option<Vec<String>>,
    pub featured_image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub slug: String,
    pub category_id: Option<i64>,
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
    pub category: Option<CategoryRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A post row joined with its category, as returned by list/detail queries.
#[derive(Debug, Clone)]
pub struct PostWithCategory {
    pub post: Post,
    pub category: Option<CategoryRef>,
}

impl From<PostWithCategory> for PostResponse {
    fn from(row: PostWithCategory) -> Self {
        let PostWithCategory { post, category } = row;
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            excerpt: post.excerpt,
            slug: post.slug,
            category_id: post.category_id,
            tags: post.tags,
            featured_image: post.featured_image,
            category,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}
