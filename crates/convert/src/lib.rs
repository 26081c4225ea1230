//! URL to PDF conversion pipeline.
//!
//! [`Converter`] validates a URL, works out where the PDF should go, has a
//! [`PageRenderer`](webpdf_render::PageRenderer) capture the rendered page and
//! a [`DocumentFormatter`](webpdf_render::DocumentFormatter) print it.
//! Callers only ever see two failures, [`ErrorKind::InvalidInput`] and
//! [`ErrorKind::ConversionFailure`](error::ErrorKind::ConversionFailure).

mod convert;
pub mod error;
mod path;
mod split;
mod validate;

pub use crate::convert::Converter;
pub use crate::error::ErrorKind;
pub use crate::path::{DEFAULT_BASENAME, DEFAULT_OUTPUT_DIR, EXTENSION, resolve_path};
pub use crate::validate::{is_valid, parse};
