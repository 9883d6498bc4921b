use crate::application::blog_service::{ListPostsParams, Pagination};
use crate::application::{BlogService, CategoryService};
use crate::domain::category::{CreateCategoryRequest, UpdateCategoryRequest};
use crate::domain::post::{CreatePostRequest, PostResponse, UpdatePostRequest};
use crate::domain::DomainError;
use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;

// Параметры запроса для списка постов
#[derive(serde::Deserialize)]
pub struct PostListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub category: Option<i64>,
    pub search: Option<String>,
}

// Ответ со списком постов и метаданными пагинации
#[derive(serde::Serialize)]
struct PostsResponse {
    posts: Vec<PostResponse>,
    pagination: Pagination,
}

// Преобразование DomainError в HttpResponse
fn error_to_response(err: DomainError) -> HttpResponse {
    let status_code = err.to_status_code();
    let message = err.to_string();

    match status_code {
        400 => HttpResponse::BadRequest().json(serde_json::json!({ "error": message })),
        404 => HttpResponse::NotFound().json(serde_json::json!({ "error": message })),
        _ => {
            // Raw database detail stays in the logs, not in the response.
            tracing::error!("Request failed: {}", message);
            HttpResponse::InternalServerError()
                .json(serde_json::json!({ "error": "Internal server error" }))
        }
    }
}

// ============== Post Handlers ==============

pub async fn list_posts(
    blog_service: web::Data<Arc<BlogService>>,
    query: web::Query<PostListQuery>,
) -> impl Responder {
    let query = query.into_inner();

    tracing::info!(
        "Listing posts: page={:?}, limit={:?}, category={:?}, search={:?}",
        query.page,
        query.limit,
        query.category,
        query.search
    );

    let params = ListPostsParams {
        page: query.page,
        limit: query.limit,
        category: query.category,
        search: query.search,
    };

    match blog_service.list_posts(params).await {
        Ok((posts, pagination)) => HttpResponse::Ok().json(PostsResponse { posts, pagination }),
        Err(err) => error_to_response(err),
    }
}

pub async fn get_post(
    blog_service: web::Data<Arc<BlogService>>,
    path: web::Path<i64>,
) -> impl Responder {
    let post_id = path.into_inner();

    tracing::info!("Getting post with id={}", post_id);

    match blog_service.get_post(post_id).await {
        Ok(post) => HttpResponse::Ok().json(post),
        Err(err) => error_to_response(err),
    }
}

pub async fn create_post(
    blog_service: web::Data<Arc<BlogService>>,
    post_data: web::Json<CreatePostRequest>,
) -> impl Responder {
    tracing::info!("Creating post");

    match blog_service.create_post(post_data.into_inner()).await {
        Ok(post) => HttpResponse::Created().json(post),
        Err(err) => error_to_response(err),
    }
}

pub async fn update_post(
    blog_service: web::Data<Arc<BlogService>>,
    path: web::Path<i64>,
    post_data: web::Json<UpdatePostRequest>,
) -> impl Responder {
    let post_id = path.into_inner();

    tracing::info!("Updating post id={}", post_id);

    match blog_service.update_post(post_id, post_data.into_inner()).await {
        Ok(post) => HttpResponse::Ok().json(post),
        Err(err) => error_to_response(err),
    }
}

pub async fn delete_post(
    blog_service: web::Data<Arc<BlogService>>,
    path: web::Path<i64>,
) -> impl Responder {
    let post_id = path.into_inner();

    tracing::info!("Deleting post id={}", post_id);

    match blog_service.delete_post(post_id).await {
        Ok(()) => {
            HttpResponse::Ok().json(serde_json::json!({ "message": "Post deleted successfully" }))
        }
        Err(err) => error_to_response(err),
    }
}

// ============== Category Handlers ==============

pub async fn list_categories(category_service: web::Data<Arc<CategoryService>>) -> impl Responder {
    match category_service.list_categories().await {
        Ok(categories) => HttpResponse::Ok().json(categories),
        Err(err) => error_to_response(err),
    }
}

pub async fn create_category(
    category_service: web::Data<Arc<CategoryService>>,
    category_data: web::Json<CreateCategoryRequest>,
) -> impl Responder {
    match category_service
        .create_category(category_data.into_inner())
        .await
    {
        Ok(category) => HttpResponse::Created().json(category),
        Err(err) => error_to_response(err),
    }
}

pub async fn update_category(
    category_service: web::Data<Arc<CategoryService>>,
    path: web::Path<i64>,
    category_data: web::Json<UpdateCategoryRequest>,
) -> impl Responder {
    let category_id = path.into_inner();

    match category_service
        .update_category(category_id, category_data.into_inner())
        .await
    {
        Ok(category) => HttpResponse::Ok().json(category),
        Err(err) => error_to_response(err),
    }
}

pub async fn delete_category(
    category_service: web::Data<Arc<CategoryService>>,
    path: web::Path<i64>,
) -> impl Responder {
    let category_id = path.into_inner();

    match category_service.delete_category(category_id).await {
        Ok(()) => HttpResponse::Ok()
            .json(serde_json::json!({ "message": "Category deleted successfully" })),
        Err(err) => error_to_response(err),
    }
}

// ============== Service Handlers ==============

pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "Server is running!",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

pub async fn not_found() -> impl Responder {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "Route not found" }))
}
