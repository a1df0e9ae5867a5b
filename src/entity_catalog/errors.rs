use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum EntityModelError {
    #[error("Failed to read entity model file: {error}")]
    ConfigReadError { error: String },
    #[error("Failed to parse entity model: {error}")]
    ConfigParseError { error: String },
    #[error("Invalid entity model: {message}")]
    InvalidConfig { message: String },
}

impl EntityModelError {
    /// Create an InvalidConfig error naming the offending entity
    pub fn invalid_entity(entity: impl Into<String>, message: impl Into<String>) -> Self {
        EntityModelError::InvalidConfig {
            message: format!("{}\n  Context: entity '{}'", message.into(), entity.into()),
        }
    }
}
