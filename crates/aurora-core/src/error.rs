//! Error types for Aurora

use thiserror::Error;

/// Result type alias using Aurora's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Aurora error types with helpful messages and suggestions
#[derive(Error, Debug)]
pub enum Error {
    // Network errors (E100-E199)
    #[error("Network error: {0}. Check your internet connection.")]
    NetworkError(#[from] reqwest::Error),

    #[error("LLM API error: {0}")]
    LLMError(String),

    #[error("Rate limited. Retry after {0} seconds.")]
    RateLimited(u64),

    #[error("Model '{0}' not found or not available for this API key.")]
    ModelNotFound(String),

    #[error("Stream error: {0}")]
    StreamError(String),

    // Image errors (E200-E299)
    #[error("No image data returned")]
    NoImageData,

    #[error("Image generation failed: {0}")]
    ImageGenerationError(String),

    #[error("Invalid data URI: {0}")]
    InvalidDataUri(String),

    // Config errors (E600-E699)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Input errors (E800-E899)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Generic errors
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::NetworkError(_) => "E100",
            Self::LLMError(_) => "E101",
            Self::RateLimited(_) => "E102",
            Self::ModelNotFound(_) => "E103",
            Self::StreamError(_) => "E104",
            Self::NoImageData => "E200",
            Self::ImageGenerationError(_) => "E201",
            Self::InvalidDataUri(_) => "E202",
            Self::ConfigError(_) => "E600",
            Self::InvalidInput(_) => "E800",
            Self::Other(_) | Self::Io(_) => "E9999",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::NetworkError(_) => Some("Check internet connection".to_string()),
            Self::LLMError(_) => Some("aurora doctor".to_string()),
            Self::ModelNotFound(_) => Some("aurora config set llm.default_model <model>".to_string()),
            Self::ConfigError(_) => Some("aurora config list".to_string()),
            _ => None,
        }
    }
}
