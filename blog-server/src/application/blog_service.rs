use crate::data::post_repository::{PostFilter, PostRepository};
use crate::domain::post::{
    CreatePostRequest, NewPost, PostPatch, PostResponse, UpdatePostRequest,
};
use crate::domain::{slug, DomainError};
use serde::Serialize;
use std::sync::Arc;

pub const MAX_PAGE_SIZE: i64 = 100;

/// Attempts before giving up on finding a free slug. With 24 bits of suffix
/// this only matters under pathological data.
const MAX_SLUG_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_posts: i64,
}

/// Validated listing parameters as they arrive from the query string.
#[derive(Debug, Clone, Default)]
pub struct ListPostsParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub category: Option<i64>,
    pub search: Option<String>,
}

pub struct BlogService {
    post_repo: Arc<dyn PostRepository + Send + Sync>,
}

impl BlogService {
    pub fn new(post_repo: Arc<dyn PostRepository + Send + Sync>) -> Self {
        Self { post_repo }
    }

    pub async fn list_posts(
        &self,
        params: ListPostsParams,
    ) -> Result<(Vec<PostResponse>, Pagination), DomainError> {
        let page = params.page.unwrap_or(1);
        let limit = params.limit.unwrap_or(10);

        if page < 1 {
            return Err(DomainError::ValidationError(
                "Page must be at least 1".to_string(),
            ));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(DomainError::ValidationError(format!(
                "Limit must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        // Absurdly large pages would overflow the offset multiplication.
        let offset = (page - 1).checked_mul(limit).ok_or_else(|| {
            DomainError::ValidationError("Page is out of range".to_string())
        })?;

        let filter = PostFilter {
            limit,
            offset,
            category_id: params.category,
            search: params.search.filter(|s| !s.is_empty()),
        };

        let (posts, total) = self.post_repo.list(filter).await?;

        let pagination = Pagination {
            current_page: page,
            total_pages: (total + limit - 1) / limit,
            total_posts: total,
        };

        Ok((posts.into_iter().map(PostResponse::from).collect(), pagination))
    }

    pub async fn get_post(&self, id: i64) -> Result<PostResponse, DomainError> {
        let post = self.post_repo.find_by_id(id).await?;
        Ok(PostResponse::from(post))
    }

    pub async fn create_post(
        &self,
        req: CreatePostRequest,
    ) -> Result<PostResponse, DomainError> {
        if req.title.trim().is_empty() || req.content.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "Title and content are required".to_string(),
            ));
        }

        let excerpt = match req.excerpt.filter(|e| !e.is_empty()) {
            Some(excerpt) => excerpt,
            None => slug::derive_excerpt(&req.content),
        };

        let new_post = NewPost {
            slug: self.unique_slug(&req.title).await?,
            title: req.title,
            content: req.content,
            excerpt,
            category_id: req.category_id,
            tags: req.tags.unwrap_or_default(),
            featured_image: req.featured_image,
        };

        let post = self.post_repo.create(new_post).await?;

        tracing::info!("Post created: id={}, slug={}", post.post.id, post.post.slug);

        Ok(PostResponse::from(post))
    }

    pub async fn update_post(
        &self,
        id: i64,
        req: UpdatePostRequest,
    ) -> Result<PostResponse, DomainError> {
        if let Some(title) = &req.title {
            if title.trim().is_empty() {
                return Err(DomainError::ValidationError(
                    "Title cannot be empty".to_string(),
                ));
            }
        }
        if let Some(content) = &req.content {
            if content.trim().is_empty() {
                return Err(DomainError::ValidationError(
                    "Content cannot be empty".to_string(),
                ));
            }
        }

        // A new title gets a fresh slug, random suffix included.
        let new_slug = match &req.title {
            Some(title) => Some(self.unique_slug(title).await?),
            None => None,
        };

        let patch = PostPatch {
            title: req.title,
            content: req.content,
            excerpt: req.excerpt,
            slug: new_slug,
            category_id: req.category_id,
            tags: req.tags,
            featured_image: req.featured_image,
        };

        let post = self.post_repo.update(id, patch).await?;

        tracing::info!("Post updated: id={}", id);

        Ok(PostResponse::from(post))
    }

    pub async fn delete_post(&self, id: i64) -> Result<(), DomainError> {
        self.post_repo.delete(id).await?;

        tracing::info!("Post deleted: id={}", id);

        Ok(())
    }

    /// Generates a slug and retries with a fresh suffix while it collides
    /// with an existing row. The UNIQUE constraint on posts.slug backstops
    /// the race between check and insert.
    async fn unique_slug(&self, title: &str) -> Result<String, DomainError> {
        for _ in 0..MAX_SLUG_ATTEMPTS {
            let candidate = slug::generate(title);
            if !self.post_repo.slug_exists(&candidate).await? {
                return Ok(candidate);
            }
        }

        Err(DomainError::InternalError(
            "Could not generate a unique slug".to_string(),
        ))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::post::{Post, PostWithCategory};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Mutex;

    /// In-memory stand-in for the Postgres repository, mirroring its
    /// filtering and patch semantics.
    #[derive(Default)]
    pub(crate) struct InMemoryPostRepository {
        posts: Mutex<Vec<Post>>,
        next_id: AtomicI64,
    }

    impl InMemoryPostRepository {
        pub(crate) fn new() -> Self {
            Self {
                posts: Mutex::new(Vec::new()),
                next_id: AtomicI64::new(1),
            }
        }

        pub(crate) fn stored(&self) -> Vec<Post> {
            self.posts.lock().unwrap().clone()
        }

        /// Mirrors the FK's ON DELETE SET NULL when a category row goes away.
        pub(crate) fn detach_category(&self, category_id: i64) {
            let mut posts = self.posts.lock().unwrap();
            for post in posts.iter_mut() {
                if post.category_id == Some(category_id) {
                    post.category_id = None;
                }
            }
        }
    }

    #[async_trait]
    impl PostRepository for InMemoryPostRepository {
        async fn create(&self, new: NewPost) -> Result<PostWithCategory, DomainError> {
            let now = Utc::now();
            let post = Post {
                id: self.next_id.fetch_add(1, Ordering::SeqCst),
                title: new.title,
                content: new.content,
                excerpt: new.excerpt,
                slug: new.slug,
                category_id: new.category_id,
                tags: new.tags,
                featured_image: new.featured_image,
                created_at: now,
                updated_at: now,
            };
            self.posts.lock().unwrap().push(post.clone());
            Ok(PostWithCategory {
                post,
                category: None,
            })
        }

        async fn find_by_id(&self, id: i64) -> Result<PostWithCategory, DomainError> {
            self.posts
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.id == id)
                .cloned()
                .map(|post| PostWithCategory {
                    post,
                    category: None,
                })
                .ok_or(DomainError::PostNotFound)
        }

        async fn update(&self, id: i64, patch: PostPatch) -> Result<PostWithCategory, DomainError> {
            let mut posts = self.posts.lock().unwrap();
            let post = posts
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or(DomainError::PostNotFound)?;

            if let Some(title) = patch.title {
                post.title = title;
            }
            if let Some(content) = patch.content {
                post.content = content;
            }
            if let Some(excerpt) = patch.excerpt {
                post.excerpt = excerpt;
            }
            if let Some(slug) = patch.slug {
                post.slug = slug;
            }
            if let Some(category_id) = patch.category_id {
                post.category_id = Some(category_id);
            }
            if let Some(tags) = patch.tags {
                post.tags = tags;
            }
            if let Some(featured_image) = patch.featured_image {
                post.featured_image = Some(featured_image);
            }
            post.updated_at = Utc::now();

            Ok(PostWithCategory {
                post: post.clone(),
                category: None,
            })
        }

        async fn delete(&self, id: i64) -> Result<(), DomainError> {
            let mut posts = self.posts.lock().unwrap();
            let before = posts.len();
            posts.retain(|p| p.id != id);
            if posts.len() == before {
                Err(DomainError::PostNotFound)
            } else {
                Ok(())
            }
        }

        async fn list(
            &self,
            filter: PostFilter,
        ) -> Result<(Vec<PostWithCategory>, i64), DomainError> {
            let posts = self.posts.lock().unwrap();
            let mut matched: Vec<&Post> = posts
                .iter()
                .filter(|p| match filter.category_id {
                    Some(id) => p.category_id == Some(id),
                    None => true,
                })
                .filter(|p| match &filter.search {
                    Some(needle) => {
                        let needle = needle.to_lowercase();
                        p.title.to_lowercase().contains(&needle)
                            || p.content.to_lowercase().contains(&needle)
                    }
                    None => true,
                })
                .collect();
            matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));

            let total = matched.len() as i64;
            let page = matched
                .into_iter()
                .skip(filter.offset as usize)
                .take(filter.limit as usize)
                .cloned()
                .map(|post| PostWithCategory {
                    post,
                    category: None,
                })
                .collect();

            Ok((page, total))
        }

        async fn slug_exists(&self, slug: &str) -> Result<bool, DomainError> {
            Ok(self.posts.lock().unwrap().iter().any(|p| p.slug == slug))
        }
    }

    fn service() -> (BlogService, Arc<InMemoryPostRepository>) {
        let repo = Arc::new(InMemoryPostRepository::new());
        (BlogService::new(repo.clone()), repo)
    }

    fn create_req(title: &str, content: &str) -> CreatePostRequest {
        CreatePostRequest {
            title: title.to_string(),
            content: content.to_string(),
            excerpt: None,
            category_id: None,
            tags: None,
            featured_image: None,
        }
    }

    fn slug_matches(slug: &str, base: &str) -> bool {
        slug.strip_prefix(base)
            .and_then(|rest| rest.strip_prefix('-'))
            .map(|suffix| {
                suffix.len() == 6
                    && suffix
                        .chars()
                        .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
            })
            .unwrap_or(false)
    }

    #[tokio::test]
    async fn create_derives_slug_from_title() {
        let (service, _) = service();
        let post = service
            .create_post(create_req("Hello World!", "body"))
            .await
            .unwrap();

        assert!(
            slug_matches(&post.slug, "hello-world"),
            "unexpected slug: {}",
            post.slug
        );
    }

    #[tokio::test]
    async fn create_without_title_is_rejected_and_not_persisted() {
        let (service, repo) = service();
        let err = service.create_post(create_req("", "body")).await.unwrap_err();

        assert!(matches!(err, DomainError::ValidationError(_)));
        assert!(repo.stored().is_empty());
    }

    #[tokio::test]
    async fn create_without_content_is_rejected() {
        let (service, repo) = service();
        let err = service
            .create_post(create_req("title", "   "))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::ValidationError(_)));
        assert!(repo.stored().is_empty());
    }

    #[tokio::test]
    async fn create_derives_excerpt_from_long_content() {
        let (service, _) = service();
        let content = "a".repeat(500);
        let post = service
            .create_post(create_req("title", &content))
            .await
            .unwrap();

        assert_eq!(post.excerpt, format!("{}...", "a".repeat(200)));
    }

    #[tokio::test]
    async fn create_keeps_supplied_excerpt() {
        let (service, _) = service();
        let mut req = create_req("title", &"a".repeat(500));
        req.excerpt = Some("my summary".to_string());

        let post = service.create_post(req).await.unwrap();
        assert_eq!(post.excerpt, "my summary");
    }

    #[tokio::test]
    async fn update_title_regenerates_slug() {
        let (service, _) = service();
        let post = service
            .create_post(create_req("First Title", "body"))
            .await
            .unwrap();
        let old_slug = post.slug.clone();

        let updated = service
            .update_post(
                post.id,
                UpdatePostRequest {
                    title: Some("Second Title".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_ne!(updated.slug, old_slug);
        assert!(slug_matches(&updated.slug, "second-title"));
    }

    #[tokio::test]
    async fn update_without_title_keeps_slug() {
        let (service, _) = service();
        let post = service
            .create_post(create_req("Stable Title", "body"))
            .await
            .unwrap();

        let updated = service
            .update_post(
                post.id,
                UpdatePostRequest {
                    content: Some("new body".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.slug, post.slug);
        assert_eq!(updated.content, "new body");
        assert_eq!(updated.title, "Stable Title");
    }

    #[tokio::test]
    async fn update_rejects_empty_title() {
        let (service, _) = service();
        let post = service
            .create_post(create_req("Title", "body"))
            .await
            .unwrap();

        let err = service
            .update_post(
                post.id,
                UpdatePostRequest {
                    title: Some("".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::ValidationError(_)));
    }

    #[tokio::test]
    async fn update_missing_post_is_not_found() {
        let (service, _) = service();
        let err = service
            .update_post(999, UpdatePostRequest::default())
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::PostNotFound));
    }

    #[tokio::test]
    async fn list_caps_page_size_and_reports_totals() {
        let (service, _) = service();
        for i in 0..25 {
            service
                .create_post(create_req(&format!("Post {}", i), "body"))
                .await
                .unwrap();
        }

        let (posts, pagination) = service
            .list_posts(ListPostsParams {
                page: Some(2),
                limit: Some(10),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(posts.len() <= 10);
        assert_eq!(
            pagination,
            Pagination {
                current_page: 2,
                total_pages: 3,
                total_posts: 25,
            }
        );
    }

    #[tokio::test]
    async fn list_rejects_zero_page_and_limit() {
        let (service, _) = service();

        let err = service
            .list_posts(ListPostsParams {
                page: Some(0),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));

        let err = service
            .list_posts(ListPostsParams {
                limit: Some(0),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));

        let err = service
            .list_posts(ListPostsParams {
                limit: Some(-5),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
    }

    #[tokio::test]
    async fn list_rejects_page_that_would_overflow_offset() {
        let (service, _) = service();

        let err = service
            .list_posts(ListPostsParams {
                page: Some(i64::MAX),
                limit: Some(10),
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::ValidationError(_)));
    }

    #[tokio::test]
    async fn search_is_case_insensitive_over_title_and_content() {
        let (service, _) = service();
        service
            .create_post(create_req("Daily notes", "I love React"))
            .await
            .unwrap();
        service
            .create_post(create_req("React tips", "some body"))
            .await
            .unwrap();
        service
            .create_post(create_req("Unrelated", "nothing here"))
            .await
            .unwrap();

        let (posts, pagination) = service
            .list_posts(ListPostsParams {
                search: Some("react".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(posts.len(), 2);
        assert_eq!(pagination.total_posts, 2);
    }

    #[tokio::test]
    async fn get_missing_post_is_not_found() {
        let (service, _) = service();
        let err = service.get_post(42).await.unwrap_err();
        assert!(matches!(err, DomainError::PostNotFound));
    }
}
