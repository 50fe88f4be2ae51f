//! Unified error type for framestore.
//!
//! Every failure in the store and the HTTP layer funnels into [`Error`], which
//! carries enough context for handlers to derive an HTTP status code via
//! [`Error::http_status`].

/// Message for an upload request without an `image` field.
pub const MISSING_IMAGE: &str = "missing image";

/// Message for an `image` field that is not a `data:image/...;base64,` URI.
pub const INVALID_IMAGE_DATA: &str = "invalid image data";

/// Unified error type covering all failure modes in framestore.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Request data was missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// The requested file is not in the storage directory.
    #[error("File not found")]
    NotFound {
        /// The filename that was looked up.
        filename: String,
    },

    /// A filesystem operation on the storage directory failed.
    #[error("{source}")]
    Storage {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The request body exceeded the configured size ceiling.
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),
}

impl Error {
    /// Map this error to an HTTP status code.
    ///
    /// Validation failures answer 500 rather than 400 so existing clients that
    /// only branch on 404 vs. everything else keep working.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::Validation(_) => 500,
            Error::NotFound { .. } => 404,
            Error::Storage { .. } => 500,
            Error::PayloadTooLarge(_) => 413,
        }
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(filename: impl Into<String>) -> Self {
        Error::NotFound {
            filename: filename.into(),
        }
    }

    /// Convenience constructor for [`Error::Storage`].
    pub fn storage(source: std::io::Error) -> Self {
        Error::Storage { source }
    }

    /// Short machine-readable name for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation_error",
            Error::NotFound { .. } => "not_found",
            Error::Storage { .. } => "storage_error",
            Error::PayloadTooLarge(_) => "payload_too_large",
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
