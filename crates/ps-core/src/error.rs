//! Unified error type for pixshelf.
//!
//! The repository, the store engines and the thumbnail generator all return
//! [`Error`]. Each variant maps to one class of failure so that callers can
//! tell a missing image from a broken upload or a failing store.

/// Unified error type covering all failure modes in pixshelf.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No image record exists for the key.
    #[error("image not found: {key}")]
    NotFound {
        /// The logical key that was looked up.
        key: String,
    },

    /// An image record already exists for the key.
    #[error("image already exists: {key}")]
    AlreadyExists {
        /// The logical key that was being created.
        key: String,
    },

    /// The uploaded content could not be decoded as a supported image.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The thumbnail could not be encoded.
    #[error("Encode error: {0}")]
    Encode(String),

    /// The backing store failed to read, write or commit.
    #[error("Store error: {source}")]
    Store {
        /// The underlying store error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Request data failed validation (missing parameter, bad key, too large).
    #[error("Validation error: {0}")]
    Validation(String),

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an HTTP status code.
    ///
    /// Only missing images and invalid requests are client errors; everything
    /// else, including `AlreadyExists`, is reported as a server error.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::NotFound { .. } => 404,
            Error::Validation(_) => 400,
            Error::AlreadyExists { .. }
            | Error::Decode(_)
            | Error::Encode(_)
            | Error::Store { .. }
            | Error::Io { .. }
            | Error::Internal(_) => 500,
        }
    }

    /// Short machine-readable code used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotFound { .. } => "not_found",
            Error::AlreadyExists { .. } => "already_exists",
            Error::Decode(_) => "decode_error",
            Error::Encode(_) => "encode_error",
            Error::Store { .. } => "store_error",
            Error::Validation(_) => "validation_error",
            Error::Io { .. } => "io_error",
            Error::Internal(_) => "internal_error",
        }
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(key: impl Into<String>) -> Self {
        Error::NotFound { key: key.into() }
    }

    /// Convenience constructor for [`Error::AlreadyExists`].
    pub fn already_exists(key: impl Into<String>) -> Self {
        Error::AlreadyExists { key: key.into() }
    }

    /// Convenience constructor for [`Error::Store`].
    pub fn store(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Store {
            source: source.into(),
        }
    }

    /// Returns `true` for [`Error::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = Error::not_found("cat.png");
        assert_eq!(err.to_string(), "image not found: cat.png");
        assert_eq!(err.http_status(), 404);
        assert!(err.is_not_found());
    }

    #[test]
    fn already_exists_is_server_error() {
        let err = Error::already_exists("cat.png");
        assert_eq!(err.to_string(), "image already exists: cat.png");
        assert_eq!(err.http_status(), 500);
        assert_eq!(err.code(), "already_exists");
    }

    #[test]
    fn validation_display() {
        let err = Error::Validation("name is required".into());
        assert_eq!(err.to_string(), "Validation error: name is required");
        assert_eq!(err.http_status(), 400);
    }

    #[test]
    fn decode_and_encode_are_server_errors() {
        assert_eq!(Error::Decode("bad magic".into()).http_status(), 500);
        assert_eq!(Error::Encode("short write".into()).http_status(), 500);
    }

    #[test]
    fn store_display() {
        let err = Error::store("disk I/O error");
        assert!(err.to_string().contains("disk I/O error"));
        assert_eq!(err.http_status(), 500);
        assert!(!err.is_not_found());
    }

    #[test]
    fn io_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "truncated");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io { .. }));
        assert_eq!(err.code(), "io_error");
    }
}
