use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Post not found")]
    PostNotFound,

    #[error("Category not found")]
    CategoryNotFound,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl DomainError {
    pub fn to_status_code(&self) -> u16 {
        match self {
            Self::PostNotFound | Self::CategoryNotFound => 404,
            Self::ValidationError(_) => 400,
            Self::DatabaseError(_) | Self::InternalError(_) => 500,
        }
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::PostNotFound,
            _ => Self::DatabaseError(err.to_string()),
        }
    }
}
