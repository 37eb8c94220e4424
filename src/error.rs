use thiserror::Error;

/// Application-level error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Series store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// External service errors
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Message(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Check if error is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::NotFound(_) | AppError::Store(StoreError::NotFound(_))
        )
    }

    /// Check if the backing store refused or never received the write
    pub fn is_store_failure(&self) -> bool {
        matches!(self, AppError::Store(_))
    }
}

/// Series store error types
#[derive(Error, Debug)]
pub enum StoreError {
    /// No observation or competitor under the given key
    #[error("Record not found: {0}")]
    NotFound(String),

    /// The store answered but refused the write
    #[error("Write rejected: {0}")]
    Rejected(String),

    /// The store could not be reached
    #[error("Transport error: {0}")]
    Transport(String),

    /// The store answered with a body we could not decode
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StoreError::InvalidPayload(err.to_string())
        } else if let Some(status) = err.status() {
            if status == reqwest::StatusCode::NOT_FOUND {
                StoreError::NotFound(err.to_string())
            } else {
                StoreError::Rejected(err.to_string())
            }
        } else {
            StoreError::Transport(err.to_string())
        }
    }
}
