//! Error types for feature extraction

use thiserror::Error;

/// Errors that can occur while turning messages into feature vectors
#[derive(Error, Debug)]
pub enum Error {
    /// The message part tree could not be parsed
    #[error("Failed to parse message structure: {0}")]
    Structure(String),

    /// A part's payload could not be decoded per its declared encoding
    #[error("Failed to decode content: {0}")]
    Decode(String),

    /// `transform` was called before `fit`
    #[error("Pipeline has not been fitted")]
    NotFitted,

    /// Label array length differs from the message batch
    #[error("Got {labels} labels for {messages} messages")]
    LabelMismatch { messages: usize, labels: usize },

    /// Invalid configuration or vocabulary document
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type for feature extraction operations
pub type Result<T> = std::result::Result<T, Error>;
