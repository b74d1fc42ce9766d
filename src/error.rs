use thiserror::Error;

/// Main error type for the itinerary engine
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Library error: {0}")]
    Library(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Edit rejected: {0}")]
    EditRejected(String),

    #[error("Completion service error: {0}")]
    Completion(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Rate limit exceeded: retry after {retry_after}s")]
    RateLimit { retry_after: u64 },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EngineError::Completion(_) | EngineError::RateLimit { .. } | EngineError::Render(_)
        )
    }

    /// Get the error code for structured responses
    pub fn error_code(&self) -> &'static str {
        match self {
            EngineError::Config(_) => "CONFIG_ERROR",
            EngineError::InvalidRequest(_) => "INVALID_REQUEST",
            EngineError::Library(_) => "LIBRARY_ERROR",
            EngineError::Serialization(_) => "SERIALIZATION_ERROR",
            EngineError::Validation(_) => "VALIDATION_ERROR",
            EngineError::EditRejected(_) => "EDIT_REJECTED",
            EngineError::Completion(_) => "COMPLETION_ERROR",
            EngineError::Render(_) => "RENDER_ERROR",
            EngineError::RateLimit { .. } => "RATE_LIMIT_ERROR",
        }
    }

    /// Convert to a structured error payload
    pub fn to_error_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
                "retryable": self.is_retryable()
            }
        })
    }
}
