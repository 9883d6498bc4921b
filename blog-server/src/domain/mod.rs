pub mod category;
pub mod error;
pub mod post;
pub mod slug;

pub use category::Category;
pub use error::DomainError;
pub use post::Post;
