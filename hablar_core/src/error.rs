//! Error types for the hablar_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for hablar_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog validation error
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),

    /// A progress record broke the completed <= total invariant
    #[error("Invalid progress record: {0}")]
    InvalidProgress(String),

    /// No lesson with this id
    #[error("Unknown lesson: {0}")]
    UnknownLesson(String),

    /// Lesson exists but its level gate is still closed
    #[error("Lesson {0} is locked")]
    LessonLocked(String),

    /// Blank answer submitted
    #[error("Answer is empty")]
    EmptyAnswer,

    /// Lesson run misuse (submitting past the end, finishing early)
    #[error("Session error: {0}")]
    Session(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
