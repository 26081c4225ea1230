//! Conversion Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Collaborator failures are kept as
//! child frames of a [`ErrorKind::ConversionFailure`].

use derive_more::{Display, Error};
use webpdf_render::error::Error as RenderError;

/// A conversion error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for conversion operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The two failures a caller can observe.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input is not an absolute URL with a scheme and a host. Nothing was
    /// fetched or written.
    #[display("Invalid URL: {_0}")]
    InvalidInput(#[error(not(source))] String),
    /// Rendering, formatting or preparing the destination failed.
    #[display("Failed to convert {url} to PDF: {reason}")]
    ConversionFailure { url: String, reason: String },
}

impl ErrorKind {
    /// Wraps a collaborator error, keeping its message as the reason and its
    /// frame as the child of the new error tree.
    #[track_caller]
    pub fn render(url: impl Into<String>, err: RenderError) -> Error {
        let reason = (*err).to_string();
        err.raise(ErrorKind::ConversionFailure { url: url.into(), reason })
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
