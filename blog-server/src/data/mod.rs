pub mod category_repository;
pub mod post_repository;
