//! In-memory collaborators for testing.

use crate::error::{ErrorKind, Result};
use crate::{DocumentFormatter, PageRenderer};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use url::Url;

type Failure = Box<dyn Fn() -> ErrorKind + Send + Sync>;

/// A [`PageRenderer`] that returns canned HTML (or a canned error) and counts
/// how often it was asked.
///
/// # Examples
///
/// ```
/// use webpdf_render::{MockRenderer, PageRenderer, Url};
///
/// let renderer = MockRenderer::html("<p>Hi</p>");
/// let url = Url::parse("https://example.com").unwrap();
/// assert_eq!(renderer.render(&url).unwrap(), "<p>Hi</p>");
/// assert_eq!(renderer.calls(), 1);
/// ```
pub struct MockRenderer {
    outcome: std::result::Result<String, Failure>,
    calls: AtomicUsize,
}

impl MockRenderer {
    pub fn html(html: impl Into<String>) -> Self {
        Self { outcome: Ok(html.into()), calls: AtomicUsize::new(0) }
    }

    /// Every call fails with the error kind produced by `failure`.
    pub fn failing(failure: impl Fn() -> ErrorKind + Send + Sync + 'static) -> Self {
        Self { outcome: Err(Box::new(failure)), calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PageRenderer for MockRenderer {
    fn render(&self, _url: &Url) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Ok(html) => Ok(html.clone()),
            Err(failure) => exn::bail!(failure()),
        }
    }
}

/// One recorded [`DocumentFormatter::format`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Formatted {
    pub html: String,
    pub base: Option<Url>,
    pub save_to: PathBuf,
}

/// A [`DocumentFormatter`] that records its input and writes the HTML bytes
/// verbatim to the destination, standing in for a real PDF.
#[derive(Default)]
pub struct MockFormatter {
    failure: Option<Failure>,
    calls: Mutex<Vec<Formatted>>,
}

impl MockFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call leaves an empty file at the destination and then fails,
    /// like a layout engine that dies halfway through.
    pub fn failing(failure: impl Fn() -> ErrorKind + Send + Sync + 'static) -> Self {
        Self { failure: Some(Box::new(failure)), calls: Mutex::default() }
    }

    pub fn calls(&self) -> Vec<Formatted> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

impl DocumentFormatter for MockFormatter {
    fn format(&self, html: &str, base: Option<&Url>, save_to: &Path) -> Result<()> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(Formatted { html: html.to_string(), base: base.cloned(), save_to: save_to.to_path_buf() });
        }
        if let Some(failure) = &self.failure {
            std::fs::write(save_to, b"").map_err(ErrorKind::from)?;
            exn::bail!(failure());
        }
        std::fs::write(save_to, html).map_err(ErrorKind::from)?;
        Ok(())
    }
}
