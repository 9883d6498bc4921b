pub mod blog_service;
pub mod category_service;

pub use blog_service::BlogService;
pub use category_service::CategoryService;
