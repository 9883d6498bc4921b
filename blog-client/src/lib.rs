//! Typed async client for the blog HTTP API.

pub mod error;
pub mod http_client;
pub mod models;

pub use error::BlogClientError;
pub use http_client::HttpClient as BlogClient;
pub use models::{
    CategoryResponse, CreateCategoryRequest, CreatePostRequest, HealthResponse, ListPostsQuery,
    Pagination, PostResponse, PostsResponse, UpdateCategoryRequest, UpdatePostRequest,
};
