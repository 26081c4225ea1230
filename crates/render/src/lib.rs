//! Headless Chrome collaborators for turning web pages into PDFs.
//!
//! Two seams are exposed as traits so the conversion pipeline can be tested
//! without a browser:
//!
//! - [`PageRenderer`] loads a URL and returns the rendered (post-JavaScript) DOM.
//! - [`DocumentFormatter`] lays HTML out and writes it as a PDF.
//!
//! [`Chrome`] implements both by shelling out to a locally installed
//! Chrome/Chromium (`--dump-dom` and `--print-to-pdf` respectively). Every
//! invocation runs inside a scoped session that kills the browser on drop.
//! The `mock` feature provides in-memory stand-ins for other crates' tests.

mod chrome;
pub mod error;
#[cfg(feature = "mock")]
mod mock;
mod options;
mod print;
mod render;
mod session;

pub use crate::chrome::Chrome;
#[cfg(feature = "mock")]
pub use crate::mock::{Formatted, MockFormatter, MockRenderer};
pub use crate::options::ChromeOptions;
use crate::error::Result;
use std::path::Path;
pub use url::Url;

/// Loads a page and captures its fully rendered HTML.
pub trait PageRenderer {
    fn render(&self, url: &Url) -> Result<String>;
}

/// Lays out HTML and writes the resulting PDF to `save_to`.
///
/// `base` is the address the HTML was captured from; relative links and
/// resources in the document resolve against it.
pub trait DocumentFormatter {
    fn format(&self, html: &str, base: Option<&Url>, save_to: &Path) -> Result<()>;
}

impl<T: PageRenderer + ?Sized> PageRenderer for &T {
    fn render(&self, url: &Url) -> Result<String> {
        (**self).render(url)
    }
}

impl<T: DocumentFormatter + ?Sized> DocumentFormatter for &T {
    fn format(&self, html: &str, base: Option<&Url>, save_to: &Path) -> Result<()> {
        (**self).format(html, base, save_to)
    }
}
