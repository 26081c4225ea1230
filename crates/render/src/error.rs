//! Render Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;
use std::time::Duration;

/// A render error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for render operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("chrome/chromium not detected on your system")]
    ChromeNotFound,
    /// Chrome did not exit within the configured wall-clock timeout.
    #[display("Chrome did not finish within {}s", _0.as_secs())]
    ChromeTimeout(#[error(not(source))] Duration),
    /// Chrome exited with a non-zero exit code.
    #[display("Chrome exited with code {code}: {message}")]
    ChromeFailed { code: i32, message: String },
    /// No exit code; Chrome was killed by a signal or crashed.
    #[display("Chrome was terminated before it could finish")]
    ChromeKilled,
    /// The page could not be loaded (DNS, TLS, connection refused, ...).
    #[display("navigation failed: {_0}")]
    Navigation(#[error(not(source))] String),
    /// Chrome exited successfully but produced no markup.
    #[display("page produced an empty document")]
    EmptyDocument,
    /// Chrome exited successfully but the PDF was never written.
    #[display("no PDF written to {}", _0.display())]
    NoOutput(#[error(not(source))] PathBuf),
    #[display("I/O error: {_0}")]
    Io(IoError),
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    ///
    /// Nothing is: conversions are never retried, and a timeout or failed
    /// navigation is reported to the caller as-is.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
