use thiserror::Error;

/// Main error type for aispec
#[derive(Error, Debug)]
pub enum AispecError {
    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Inference endpoint errors (transport, status, malformed body)
    #[error("Inference API error: {0}")]
    Inference(String),

    /// Credential retrieval failed
    #[error("Credential error: {0}")]
    Credential(String),

    /// Parse errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Directory walk errors
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Ignore file errors
    #[error("Ignore pattern error: {0}")]
    Ignore(#[from] ignore::Error),

    /// Key-value store upload errors
    #[error("Upload error: {0}")]
    Upload(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Convenient Result type using AispecError
pub type Result<T> = std::result::Result<T, AispecError>;
