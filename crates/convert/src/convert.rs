use crate::error::{Error, ErrorKind, Result};
use crate::path::{DEFAULT_OUTPUT_DIR, resolve_path};
use crate::validate;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::instrument;
use webpdf_render::{DocumentFormatter, PageRenderer};

/// Sequences validation, path resolution, rendering and formatting into a
/// single URL to PDF conversion.
///
/// # Example
///
/// ```no_run
/// use webpdf_convert::Converter;
/// use webpdf_render::{Chrome, ChromeOptions};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let chrome = Chrome::discover(ChromeOptions::default())?;
/// let converter = Converter::new(chrome.clone(), chrome);
/// let path = converter.convert("https://example.com", None)?;
/// println!("{}", path.display());
/// # Ok(())
/// # }
/// ```
pub struct Converter<R, F> {
    renderer: R,
    formatter: F,
    output_dir: PathBuf,
}

impl<R: PageRenderer, F: DocumentFormatter> Converter<R, F> {
    pub fn new(renderer: R, formatter: F) -> Self {
        Self { renderer, formatter, output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR) }
    }

    /// Directory derived paths are placed in. Explicit output paths are used
    /// as given.
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Converts the page at `url` into a PDF and returns where it was written.
    ///
    /// Fails with [`ErrorKind::InvalidInput`] before touching the renderer
    /// when `url` is not absolute. Everything after validation that goes
    /// wrong surfaces as [`ErrorKind::ConversionFailure`]. A failed format may
    /// leave a partial file behind.
    #[instrument(skip_all, fields(url = %url))]
    pub fn convert(&self, url: &str, output: Option<&Path>) -> Result<PathBuf> {
        let parsed = validate::parse(url)?;
        let output = match output {
            Some(path) => path.to_path_buf(),
            None => resolve_path(url, &self.output_dir),
        };
        ensure_parent(url, &output)?;

        let html = self.renderer.render(&parsed).map_err(|err| ErrorKind::render(url, err))?;
        tracing::debug!(bytes = html.len(), "Page rendered");
        self.formatter.format(&html, Some(&parsed), &output).map_err(|err| ErrorKind::render(url, err))?;
        tracing::info!(path = %output.display(), "PDF written");
        Ok(output)
    }
}

/// Creates the destination's parent directory (and its ancestors) if missing.
fn ensure_parent(url: &str, output: &Path) -> Result<()> {
    let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    fs::create_dir_all(parent).map_err(|err| {
        Error::from(ErrorKind::ConversionFailure {
            url: url.to_string(),
            reason: format!("cannot create directory {}: {err}", parent.display()),
        })
    })
}
