use thiserror::Error;

/// Main error type for Apiscope operations
#[derive(Error, Debug)]
pub enum ApiscopeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Code model index is not ready yet")]
    ModelNotReady,

    #[error("Code model error: {0}")]
    Model(String),

    #[error("Unknown framework: {0}")]
    UnknownFramework(String),

    #[error("No endpoint found for: {0}")]
    EndpointNotFound(String),

    #[error("Invalid method reference: {0}")]
    InvalidMethodRef(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ApiscopeError>;
