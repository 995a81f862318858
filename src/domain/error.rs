use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Normalization error: {0}")]
    Normalization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Remote service error: {0}")]
    RemoteService(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Transform error: {0}")]
    Transform(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl DomainError {
    /// Stable tag for reports and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::Decode(_) => "decode",
            DomainError::Normalization(_) => "normalization",
            DomainError::NotFound(_) => "not_found",
            DomainError::Format(_) => "format",
            DomainError::Authentication(_) => "authentication",
            DomainError::RemoteService(_) => "remote_service",
            DomainError::Model(_) => "model",
            DomainError::Transform(_) => "transform",
            DomainError::Config(_) => "config",
            DomainError::InvalidInput(_) => "invalid_input",
            DomainError::Database(_) => "database",
        }
    }
}

impl From<rusqlite::Error> for DomainError {
    fn from(e: rusqlite::Error) -> Self {
        DomainError::Database(e.to_string())
    }
}
