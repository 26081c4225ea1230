use crate::error::{ErrorKind, Result};
use crate::session::Finished;
use crate::{Chrome, PageRenderer};
use tracing::instrument;
use url::Url;

/// Marker present in Chrome's built-in network error page.
const ERROR_PAGE_MARKER: &str = "id=\"main-frame-error\"";

impl PageRenderer for Chrome {
    /// Loads the page with `--dump-dom` and returns the serialized DOM once
    /// the virtual time budget has elapsed without pending network requests.
    #[instrument(skip_all, fields(url = %url))]
    fn render(&self, url: &Url) -> Result<String> {
        let session = self.launch(&[], ["--dump-dom", url.as_str()])?;
        let finished = session.wait(self.options().timeout())?;
        let html = dom(finished)?;
        tracing::debug!(bytes = html.len(), "Captured rendered DOM");
        Ok(html)
    }
}

/// Turns a finished `--dump-dom` run into markup, or the most specific error
/// the diagnostics allow.
fn dom(finished: Finished) -> Result<String> {
    check_status(&finished)?;
    let html = String::from_utf8_lossy(&finished.stdout).into_owned();
    if html.trim().is_empty() || html.contains(ERROR_PAGE_MARKER) {
        if let Some(code) = net_error(&finished.stderr) {
            exn::bail!(ErrorKind::Navigation(code.to_string()));
        }
        if html.contains(ERROR_PAGE_MARKER) {
            exn::bail!(ErrorKind::Navigation("page could not be loaded".to_string()));
        }
        exn::bail!(ErrorKind::EmptyDocument);
    }
    Ok(html)
}

/// Maps a non-successful exit status onto an error.
pub(crate) fn check_status(finished: &Finished) -> Result<()> {
    match finished.status.code() {
        Some(0) => Ok(()),
        Some(code) => {
            let message = match net_error(&finished.stderr) {
                Some(net) => net.to_string(),
                None => last_line(&finished.stderr).unwrap_or("no diagnostics").to_string(),
            };
            exn::bail!(ErrorKind::ChromeFailed { code, message })
        },
        None => exn::bail!(ErrorKind::ChromeKilled),
    }
}

/// First `net::ERR_*` token Chrome logged, if any.
fn net_error(stderr: &str) -> Option<&str> {
    let start = stderr.find("net::ERR_")?;
    let token = &stderr[start..];
    let end = token.find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == ':')).unwrap_or(token.len());
    Some(&token[..end])
}

fn last_line(stderr: &str) -> Option<&str> {
    stderr.lines().map(str::trim).rfind(|line| !line.is_empty())
}
