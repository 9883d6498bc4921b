pub mod http_handlers;

use crate::application::{BlogService, CategoryService};
use actix_web::web;
use std::sync::Arc;

/// Route table under /api, shared between the server binary and tests.
pub fn configure_api(
    cfg: &mut web::ServiceConfig,
    blog_service: Arc<BlogService>,
    category_service: Arc<CategoryService>,
) {
    cfg.app_data(web::Data::new(blog_service))
        .app_data(web::Data::new(category_service))
        .service(
            web::scope("/api")
                .route("/health", web::get().to(http_handlers::health))
                .service(
                    web::scope("/posts")
                        .route("", web::get().to(http_handlers::list_posts))
                        .route("", web::post().to(http_handlers::create_post))
                        .route("/{id}", web::get().to(http_handlers::get_post))
                        .route("/{id}", web::put().to(http_handlers::update_post))
                        .route("/{id}", web::delete().to(http_handlers::delete_post)),
                )
                .service(
                    web::scope("/categories")
                        .route("", web::get().to(http_handlers::list_categories))
                        .route("", web::post().to(http_handlers::create_category))
                        .route("/{id}", web::put().to(http_handlers::update_category))
                        .route("/{id}", web::delete().to(http_handlers::delete_category)),
                ),
        )
        .default_service(web::route().to(http_handlers::not_found));
}
