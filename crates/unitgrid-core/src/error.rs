//! Error types for the unitgrid core

use thiserror::Error;

/// Result type alias using CoreError
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while parsing unit key material
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Public key was missing or empty
    #[error("public key is missing")]
    MissingKey,

    /// Public key was not valid base64
    #[error("public key is not valid base64: {0}")]
    KeyEncoding(String),

    /// Public key decoded to the wrong number of bytes
    #[error("public key must be {expected} bytes, got {actual}")]
    KeyLength { expected: usize, actual: usize },

    /// Key bytes are not a valid Ed25519 point
    #[error("public key is not a valid Ed25519 key: {0}")]
    InvalidKey(String),
}

impl From<base64::DecodeError> for CoreError {
    fn from(err: base64::DecodeError) -> Self {
        CoreError::KeyEncoding(err.to_string())
    }
}

impl From<ed25519_dalek::SignatureError> for CoreError {
    fn from(err: ed25519_dalek::SignatureError) -> Self {
        CoreError::InvalidKey(err.to_string())
    }
}
