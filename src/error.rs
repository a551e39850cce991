//! Error types for request handling.

use std::io;

use hyper::{Method, StatusCode};
use thiserror::Error;

/// Errors that end a single request.
///
/// None of these are fatal to the server: each one is rendered as an error
/// response and the connection carries on.
#[derive(Debug, Error)]
pub enum ServeError {
    /// Requested resource does not exist.
    #[error("File not found")]
    NotFound,

    /// The process may not read the requested file or directory.
    #[error("Permission denied")]
    Forbidden,

    /// The request head could not be parsed.
    #[error("Bad request syntax ({0})")]
    BadRequest(String),

    /// Anything other than GET or HEAD.
    #[error("Unsupported method ('{0}')")]
    UnsupportedMethod(Method),

    /// The `Range` header starts past the end of the file.
    #[error("Requested range not satisfiable")]
    RangeNotSatisfiable { size: usize },

    /// Any other filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ServeError {
    /// Classify a filesystem error
    pub fn from_io(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => Self::NotFound,
            io::ErrorKind::PermissionDenied => Self::Forbidden,
            _ => Self::Io(err),
        }
    }

    /// Status code sent to the client
    pub const fn status(&self) -> StatusCode {
        match self {
            // Unreadable for reasons other than permissions: the client
            // still just sees a missing file.
            Self::NotFound | Self::Io(_) => StatusCode::NOT_FOUND,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::UnsupportedMethod(_) => StatusCode::NOT_IMPLEMENTED,
            Self::RangeNotSatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
        }
    }

    /// Message shown on the error page
    pub fn message(&self) -> String {
        match self {
            Self::Io(_) => "File not found".to_string(),
            other => other.to_string(),
        }
    }
}
