//! Error types for the configuration module

/// Errors that can occur during configuration operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A generic error with a message
    #[error("Error: {0}")]
    Generic(String),

    /// A value in the configuration could not be parsed or serialized
    #[error("Parse error: {0}")]
    ParseError(String),
}
