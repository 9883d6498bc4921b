use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlogClientError {
    // HTTP ошибки
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    // Бизнес-логика ошибки
    #[error("Resource not found")]
    NotFound,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // Транспортные ошибки
    #[error("Transport error: {0}")]
    TransportError(String),
}

impl BlogClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, BlogClientError::NotFound)
    }

    pub fn is_invalid_request(&self) -> bool {
        matches!(self, BlogClientError::InvalidRequest(_))
    }
}
