//! Error types for image loading

use std::fmt;

/// Errors that can abort a load
#[derive(Debug)]
pub enum LoadError {
    /// DNS/connect/read failure or non-success HTTP status
    Network(reqwest::Error),
    /// Cache directory or file create/read/write failure
    Storage(std::io::Error),
    /// Malformed or unsupported image bytes
    Decode(image::ImageError),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(e) => write!(f, "network error: {}", e),
            Self::Storage(e) => write!(f, "storage error: {}", e),
            Self::Decode(e) => write!(f, "decode error: {}", e),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Network(e) => Some(e),
            Self::Storage(e) => Some(e),
            Self::Decode(e) => Some(e),
        }
    }
}

impl From<reqwest::Error> for LoadError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e)
    }
}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        Self::Storage(e)
    }
}

impl From<image::ImageError> for LoadError {
    fn from(e: image::ImageError) -> Self {
        Self::Decode(e)
    }
}

/// Result type for load operations
pub type Result<T> = std::result::Result<T, LoadError>;
