#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Unauthorized(String),
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
    #[error("Invalid projection: {0}")]
    InvalidProjection(String),
    #[error("Invalid options: {0}")]
    InvalidOptions(String),
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Hashing(#[from] bcrypt::BcryptError),
}

impl AppError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }
    pub fn invalid_filter(msg: impl Into<String>) -> Self {
        Self::InvalidFilter(msg.into())
    }
    pub fn invalid_projection(msg: impl Into<String>) -> Self {
        Self::InvalidProjection(msg.into())
    }
    pub fn invalid_options(msg: impl Into<String>) -> Self {
        Self::InvalidOptions(msg.into())
    }
    pub fn invalid_document(msg: impl Into<String>) -> Self {
        Self::InvalidDocument(msg.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "unauthorized",
            Self::InvalidFilter(_) => "invalid_filter",
            Self::InvalidProjection(_) => "invalid_projection",
            Self::InvalidOptions(_) => "invalid_options",
            Self::InvalidDocument(_) => "invalid_document",
            Self::Database(_) => "database_error",
            Self::Serialization(_) => "serialization_error",
            Self::Hashing(_) => "hashing_error",
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
