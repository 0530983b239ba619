//! Error types for collection service operations
//!
//! Extension points fail with [`Error`]. The [`Error::Recoverable`] variant
//! carries a [`ServiceError`] that is rendered into the response collection
//! verbatim; every other variant is treated as unexpected and normalised to a
//! generic internal error by [`capture`](crate::outcome::capture).
//!
//! # Example
//!
//! ```rust
//! use collection_service::error::{Error, ServiceError};
//! use http::StatusCode;
//!
//! let error = ServiceError::bad_request("Missing Key");
//! assert_eq!(error.status, StatusCode::BAD_REQUEST);
//! assert_eq!(error.code, "400");
//!
//! let error: Error = error.into();
//! assert!(error.is_recoverable());
//! ```

use std::fmt;

use http::StatusCode;
use thiserror::Error;

use crate::model::CollectionError;

/// Result type for collection service operations
pub type Result<T> = std::result::Result<T, Error>;

/// Deliberately raised, status-coded, user-facing error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    /// Status code the operation resolves to
    pub status: StatusCode,
    /// Short summary shown to the caller
    pub title: String,
    /// Application error code
    pub code: String,
    /// Detailed description
    pub message: String,
}

impl ServiceError {
    /// Create a new service error
    ///
    /// The code defaults to the numeric status and the message is empty.
    pub fn new(status: StatusCode, title: impl Into<String>) -> Self {
        Self {
            status,
            title: title.into(),
            code: status.as_str().to_string(),
            message: String::new(),
        }
    }

    /// Replace the error code
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Replace the error message
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Query matched nothing
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not Found").with_message("resource not found")
    }

    /// The submitted input is unacceptable
    pub fn bad_request(title: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, title)
    }

    /// The request body could not be decoded
    ///
    /// ```rust
    /// use collection_service::error::ServiceError;
    ///
    /// let error = ServiceError::parse_body("buffer underflow");
    /// assert_eq!(error.title, "Error parsing body");
    /// assert_eq!(error.message, "buffer underflow");
    /// ```
    pub fn parse_body(err: impl fmt::Display) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Error parsing body").with_message(err.to_string())
    }

    /// Render this error as the collection error object
    pub fn to_collection_error(&self) -> CollectionError {
        CollectionError::new(&self.title, &self.code, &self.message)
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status.as_u16(), self.title)?;
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ServiceError {}

/// Crate error type
#[derive(Debug, Error)]
pub enum Error {
    /// Recoverable error rendered into the response
    #[error("{0}")]
    Recoverable(#[from] ServiceError),

    /// Any other failure; never exposed to the caller
    #[error("Unexpected error: {0}")]
    Unexpected(#[from] anyhow::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error is rendered verbatim rather than as an internal error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable(_))
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}
