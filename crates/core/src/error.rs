//! Error types for the cats-eye-core library.
//!
//! This module provides granular error variants for different failure modes,
//! enabling precise error handling and user-friendly error messages.

use thiserror::Error;

/// Errors raised by a [`KeyValueStore`](crate::storage::KeyValueStore).
///
/// Storage is best-effort throughout the library: callers decide whether a
/// failure is worth surfacing to the user or can be dropped silently.
#[derive(Error, Debug)]
pub enum StorageError {
    /// No backing store is available (disabled or unreachable).
    #[error("Storage is unavailable")]
    Unavailable,

    /// Writing the value would exceed the store's byte quota.
    #[error("Storage quota exceeded: {needed} bytes needed, quota is {quota} bytes")]
    QuotaExceeded { needed: usize, quota: usize },

    /// The backing file could not be read or written.
    #[error("Storage IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing data could not be parsed.
    #[error("Storage is corrupt: {0}")]
    Corrupt(String),
}

/// Errors that can occur within the cats-eye-core library.
///
/// Each variant represents a specific failure mode with contextual information
/// to help diagnose and handle errors appropriately.
#[derive(Error, Debug)]
pub enum AppError {
    /// Untrusted data could not be converted into a geometry value.
    #[error("Cannot convert from object to {type_name}: {message}")]
    DataValidation {
        type_name: &'static str,
        message: String,
    },

    /// A computation needed a triangle with non-zero area.
    #[error("Triangle has zero area")]
    DegenerateGeometry,

    /// A surface could not be allocated at the requested size.
    #[error("Out of resources: {0}")]
    ResourceExhausted(String),

    /// The source file could not be decoded as an image.
    #[error("Image decoding failed: {0}")]
    ImageDecode(String),

    /// A rendered surface could not be encoded.
    #[error("Image encoding failed: {0}")]
    ImageEncode(String),

    /// Persistent storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors (invalid values).
    #[error("Configuration error: {0}")]
    Config(String),

    /// An operation needed a loaded image but none is set.
    #[error("No image is loaded")]
    NoImage,

    /// UI-related errors (rendering, window management).
    #[error("UI error: {0}")]
    Ui(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Creates a data validation error for the named type.
    pub fn data(type_name: &'static str, msg: impl Into<String>) -> Self {
        Self::DataValidation {
            type_name,
            message: msg.into(),
        }
    }

    /// Creates a resource exhaustion error with the given message.
    pub fn exhausted(msg: impl Into<String>) -> Self {
        Self::ResourceExhausted(msg.into())
    }

    /// Creates an image decoding error with the given message.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::ImageDecode(msg.into())
    }

    /// Creates an image encoding error with the given message.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::ImageEncode(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a UI error with the given message.
    pub fn ui(msg: impl Into<String>) -> Self {
        Self::Ui(msg.into())
    }

    /// Whether this error means the image was too large to render.
    pub fn is_resource_exhausted(&self) -> bool {
        matches!(self, Self::ResourceExhausted(_))
    }
}

/// A convenient alias for Result with [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_error_names_the_type() {
        let err = AppError::data("Point", "x and y must be numbers");
        assert_eq!(
            err.to_string(),
            "Cannot convert from object to Point: x and y must be numbers"
        );
    }

    #[test]
    fn config_error_message() {
        let err = AppError::config("CATS_EYE_STORE_QUOTA must be a byte count");
        assert!(matches!(err, AppError::Config(_)));
        assert_eq!(
            err.to_string(),
            "Configuration error: CATS_EYE_STORE_QUOTA must be a byte count"
        );
    }

    #[test]
    fn storage_errors_convert() {
        let err: AppError = StorageError::QuotaExceeded { needed: 10, quota: 5 }.into();
        assert!(matches!(err, AppError::Storage(StorageError::QuotaExceeded { .. })));
        assert!(!err.is_resource_exhausted());
    }
}
