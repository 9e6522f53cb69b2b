use thiserror::Error;

/// Result type for extractor operations
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Errors raised while setting up or feeding the extractor.
///
/// Annotation parsing itself never fails; these only surface from
/// configuration checks or are folded into per-file warnings.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Input bytes are not valid UTF-8
    #[error("File is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

impl ExtractError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
