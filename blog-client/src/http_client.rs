use crate::error::BlogClientError;
use crate::models::{
    CategoryResponse, CreateCategoryRequest, CreatePostRequest, ErrorResponse, HealthResponse,
    ListPostsQuery, MessageResponse, PostResponse, PostsResponse, UpdateCategoryRequest,
    UpdatePostRequest,
};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn error_from_response(response: Response) -> BlogClientError {
        let status = response.status();
        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.error,
            Err(_) => status.to_string(),
        };

        match status {
            StatusCode::NOT_FOUND => BlogClientError::NotFound,
            StatusCode::BAD_REQUEST => BlogClientError::InvalidRequest(message),
            _ => BlogClientError::TransportError(format!("HTTP {}: {}", status, message)),
        }
    }

    async fn expect_json<T: serde::de::DeserializeOwned>(
        response: Response,
    ) -> Result<T, BlogClientError> {
        if response.status().is_success() {
            Ok(response.json::<T>().await?)
        } else {
            Err(Self::error_from_response(response).await)
        }
    }

    // ============== Posts ==============

    pub async fn list_posts(&self, query: ListPostsQuery) -> Result<PostsResponse, BlogClientError> {
        let url = self.url("/api/posts");
        let params = list_query_params(&query);

        tracing::debug!("GET {} with {:?}", url, params);

        let response = self.client.get(&url).query(&params).send().await?;
        Self::expect_json(response).await
    }

    pub async fn get_post(&self, id: i64) -> Result<PostResponse, BlogClientError> {
        let url = self.url(&format!("/api/posts/{}", id));
        let response = self.client.get(&url).send().await?;
        Self::expect_json(response).await
    }

    pub async fn create_post(
        &self,
        req: CreatePostRequest,
    ) -> Result<PostResponse, BlogClientError> {
        let url = self.url("/api/posts");
        let response = self.client.post(&url).json(&req).send().await?;
        Self::expect_json(response).await
    }

    pub async fn update_post(
        &self,
        id: i64,
        req: UpdatePostRequest,
    ) -> Result<PostResponse, BlogClientError> {
        let url = self.url(&format!("/api/posts/{}", id));
        let response = self.client.put(&url).json(&req).send().await?;
        Self::expect_json(response).await
    }

    pub async fn delete_post(&self, id: i64) -> Result<MessageResponse, BlogClientError> {
        let url = self.url(&format!("/api/posts/{}", id));
        let response = self.client.delete(&url).send().await?;
        Self::expect_json(response).await
    }

    // ============== Categories ==============

    pub async fn list_categories(&self) -> Result<Vec<CategoryResponse>, BlogClientError> {
        let url = self.url("/api/categories");
        let response = self.client.get(&url).send().await?;
        Self::expect_json(response).await
    }

    pub async fn create_category(
        &self,
        req: CreateCategoryRequest,
    ) -> Result<CategoryResponse, BlogClientError> {
        let url = self.url("/api/categories");
        let response = self.client.post(&url).json(&req).send().await?;
        Self::expect_json(response).await
    }

    pub async fn update_category(
        &self,
        id: i64,
        req: UpdateCategoryRequest,
    ) -> Result<CategoryResponse, BlogClientError> {
        let url = self.url(&format!("/api/categories/{}", id));
        let response = self.client.put(&url).json(&req).send().await?;
        Self::expect_json(response).await
    }

    pub async fn delete_category(&self, id: i64) -> Result<MessageResponse, BlogClientError> {
        let url = self.url(&format!("/api/categories/{}", id));
        let response = self.client.delete(&url).send().await?;
        Self::expect_json(response).await
    }

    // ============== Service ==============

    pub async fn health(&self) -> Result<HealthResponse, BlogClientError> {
        let url = self.url("/api/health");
        let response = self.client.get(&url).send().await?;
        Self::expect_json(response).await
    }
}

fn list_query_params(query: &ListPostsQuery) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();

    if let Some(page) = query.page {
        params.push(("page", page.to_string()));
    }
    if let Some(limit) = query.limit {
        params.push(("limit", limit.to_string()));
    }
    if let Some(category) = query.category {
        params.push(("category", category.to_string()));
    }
    if let Some(search) = &query.search {
        params.push(("search", search.clone()));
    }

    params
}
