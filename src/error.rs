use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpenAIError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid argument: {0}")]
    ArgumentError(String),

    #[error("Request error: {0}")]
    RequestError(String),

    #[error("OpenAI API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Response error: {0}")]
    ResponseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Failed to read {}: {source}", path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl OpenAIError {
    pub fn argument(msg: impl Into<String>) -> Self {
        OpenAIError::ArgumentError(msg.into())
    }

    /// HTTP status reported by the service, if this error came from one.
    pub fn status(&self) -> Option<u16> {
        match self {
            OpenAIError::ApiError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for OpenAIError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            OpenAIError::ResponseError(e.to_string())
        } else {
            OpenAIError::RequestError(e.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, OpenAIError>;
