use dotenvy::dotenv;
use std::sync::Arc;

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;

use application::{BlogService, CategoryService};
use data::category_repository::PostgresCategoryRepository;
use data::post_repository::PostgresPostRepository;
use infrastructure::{
    database::{create_pool, run_migrations},
    logging::init_logging,
};
use presentation::configure_api;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    init_logging();

    // Get configuration from environment
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let http_port = std::env::var("HTTP_PORT").unwrap_or_else(|_| "5000".to_string());
    let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(5);

    // Получаем разрешенные CORS домены из .env
    let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:5173,http://127.0.0.1:5173".to_string());

    let http_addr = format!("0.0.0.0:{}", http_port);

    tracing::info!("Starting blog server...");
    tracing::info!("HTTP server will listen on {}", http_addr);
    tracing::info!("CORS allowed origins: {}", cors_allowed_origins);

    // Initialize database connection pool
    tracing::info!("Connecting to database...");
    let pool = create_pool(&database_url, max_connections).await?;

    // Run database migrations
    tracing::info!("Running database migrations...");
    run_migrations(&pool).await?;
    tracing::info!("Migrations completed successfully");

    // Repositories
    let post_repo = Arc::new(PostgresPostRepository::new(pool.clone()));
    let category_repo = Arc::new(PostgresCategoryRepository::new(pool.clone()));

    // Application services
    let blog_service = Arc::new(BlogService::new(post_repo));
    let category_service = Arc::new(CategoryService::new(category_repo));

    tracing::info!("Services initialized successfully");

    run_http_server(http_addr, blog_service, category_service, cors_allowed_origins).await?;

    tracing::info!("Shutting down...");
    pool.close().await;

    Ok(())
}

/// Configure CORS for the HTTP server with allowed origins from .env
fn configure_cors(allowed_origins: &str) -> actix_cors::Cors {
    use actix_cors::Cors;
    use actix_web::http::header;

    let origins: Vec<&str> = allowed_origins.split(',').map(|s| s.trim()).collect();

    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
        .max_age(3600);

    // Добавляем каждый разрешенный домен
    for origin in origins {
        if !origin.is_empty() {
            cors = cors.allowed_origin(origin);
            tracing::debug!("Added allowed CORS origin: {}", origin);
        }
    }

    cors
}

async fn run_http_server(
    addr: String,
    blog_service: Arc<BlogService>,
    category_service: Arc<CategoryService>,
    cors_allowed_origins: String,
) -> anyhow::Result<()> {
    use actix_web::{middleware::Logger, App, HttpServer};

    tracing::info!("Configuring HTTP server...");

    let server = HttpServer::new(move || {
        let blog_service = blog_service.clone();
        let category_service = category_service.clone();

        App::new()
            .wrap(Logger::default())
            .wrap(configure_cors(&cors_allowed_origins))
            .configure(|cfg| configure_api(cfg, blog_service, category_service))
    })
    .bind(&addr)?
    .run();

    tracing::info!("HTTP server running on {}", addr);

    server.await?;

    Ok(())
}
