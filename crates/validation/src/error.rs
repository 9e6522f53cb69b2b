use thiserror::Error;

pub type Result<T> = std::result::Result<T, ValidationError>;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown rule: {0}")]
    UnknownRule(String),
}

impl ValidationError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
