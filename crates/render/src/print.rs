use crate::error::{ErrorKind, Result};
use crate::render::check_status;
use crate::{Chrome, DocumentFormatter};
use std::fs;
use std::io::{ErrorKind as IoErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::instrument;
use url::Url;

impl DocumentFormatter for Chrome {
    /// Writes `html` to a temporary file and prints it with `--print-to-pdf`.
    ///
    /// Any file already at `save_to` is removed first, so a run that reports
    /// success never leaves a stale PDF behind.
    #[instrument(skip_all, fields(save_to = %save_to.display()))]
    fn format(&self, html: &str, base: Option<&Url>, save_to: &Path) -> Result<()> {
        let save_to = std::path::absolute(save_to).map_err(ErrorKind::from)?;
        let base = base.filter(|_| self.options().base_href);
        let input = persist_html(html, base)?;
        let source = Url::from_file_path(input.path())
            .map_err(|()| ErrorKind::Io(std::io::Error::other("temporary file path is not absolute")))?;
        remove_stale(&save_to)?;

        // Chrome needs to see both the HTML and the destination directory.
        let mut shared = Vec::with_capacity(2);
        shared.extend(input.path().parent());
        shared.extend(save_to.parent());
        let session = self.launch(
            &shared,
            [
                "--no-pdf-header-footer".to_string(),
                format!("--print-to-pdf={}", save_to.display()),
                source.to_string(),
            ],
        )?;
        let finished = session.wait(self.options().timeout())?;
        check_status(&finished)?;
        if !save_to.is_file() {
            exn::bail!(ErrorKind::NoOutput(save_to));
        }
        tracing::debug!(path = %save_to.display(), "PDF printed");
        Ok(())
    }
}

fn remove_stale(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "Removed existing file before printing");
            Ok(())
        },
        Err(err) if err.kind() == IoErrorKind::NotFound => Ok(()),
        Err(err) => exn::bail!(ErrorKind::Io(err)),
    }
}

/// Writes the document to a `.html` temporary file, injecting `<base href>`
/// when a base URL is given.
fn persist_html(html: &str, base: Option<&Url>) -> Result<NamedTempFile> {
    let mut tmp = tempfile::Builder::new().prefix("webpdf-").suffix(".html").tempfile().map_err(ErrorKind::from)?;
    match base {
        Some(base) => write_with_base(&mut tmp, html, base).map_err(ErrorKind::from)?,
        None => tmp.write_all(html.as_bytes()).map_err(ErrorKind::from)?,
    }
    tmp.flush().map_err(ErrorKind::from)?;
    Ok(tmp)
}

/// Injects `<base href="…">` directly after the opening `<head>` tag so it
/// precedes every URL-bearing element in the head. Documents that already
/// declare a base are left alone; documents without a head get it prepended.
fn write_with_base(w: &mut impl Write, html: &str, base: &Url) -> std::io::Result<()> {
    if find_tag(html, "<base").is_some() {
        tracing::debug!("Document already declares a base URL; not injecting");
        return w.write_all(html.as_bytes());
    }
    let tag = format!("<base href=\"{}\">", escape_attribute(base.as_str()));
    let position = find_tag(html, "<head").and_then(|start| html[start..].find('>').map(|end| start + end + 1));
    match position {
        Some(pos) => {
            w.write_all(&html.as_bytes()[..pos])?;
            w.write_all(tag.as_bytes())?;
            w.write_all(&html.as_bytes()[pos..])
        },
        None => {
            tracing::warn!("Opening head tag not found; prepending base URL");
            w.write_all(tag.as_bytes())?;
            w.write_all(html.as_bytes())
        },
    }
}

/// Case-insensitive search for an opening tag, requiring the name to end at
/// whitespace, `>` or `/` (so `<head` does not match `<header>`).
fn find_tag(html: &str, needle: &str) -> Option<usize> {
    let bytes = html.as_bytes();
    bytes.windows(needle.len()).enumerate().find_map(|(pos, window)| {
        let boundary = bytes.get(pos + needle.len()).is_none_or(|b| b.is_ascii_whitespace() || *b == b'>' || *b == b'/');
        (window.eq_ignore_ascii_case(needle.as_bytes()) && boundary).then_some(pos)
    })
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Read;

    fn inject(html: &str, base: &str) -> String {
        let mut out = Vec::new();
        write_with_base(&mut out, html, &Url::parse(base).unwrap()).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[rstest]
    #[case(
        "<html><head><title>T</title></head><body></body></html>",
        "<html><head><base href=\"https://example.com/a/\"><title>T</title></head><body></body></html>"
    )]
    #[case(
        "<HTML><HEAD lang=\"en\"><link rel=stylesheet href=s.css></HEAD></HTML>",
        "<HTML><HEAD lang=\"en\"><base href=\"https://example.com/a/\"><link rel=stylesheet href=s.css></HEAD></HTML>"
    )]
    #[case(
        "<html><body><header>x</header></body></html>",
        "<base href=\"https://example.com/a/\"><html><body><header>x</header></body></html>"
    )]
    #[case(
        "<html><head><base href=\"/other/\"></head></html>",
        "<html><head><base href=\"/other/\"></head></html>"
    )]
    fn test_base_injection(#[case] html: &str, #[case] expected: &str) {
        assert_eq!(inject(html, "https://example.com/a/"), expected);
    }

    #[test]
    fn test_base_href_is_escaped() {
        let out = inject("<head></head>", "https://example.com/?a=1&b=2");
        assert_eq!(out, "<head><base href=\"https://example.com/?a=1&amp;b=2\"></head>");
    }

    #[rstest]
    #[case("<head>", "<head", Some(0))]
    #[case("<header><head>", "<head", Some(8))]
    #[case("<basefont><base/>", "<base", Some(10))]
    #[case("<body>", "<head", None)]
    fn test_find_tag(#[case] html: &str, #[case] needle: &str, #[case] expected: Option<usize>) {
        assert_eq!(find_tag(html, needle), expected);
    }

    #[test]
    fn test_persist_html_without_base() {
        let tmp = persist_html("<p>plain</p>", None).unwrap();
        assert!(tmp.path().extension().is_some_and(|e| e == "html"));
        let mut content = String::new();
        std::fs::File::open(tmp.path()).unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "<p>plain</p>");
    }

    #[test]
    fn test_remove_stale_ignores_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.pdf");
        assert!(remove_stale(&path).is_ok());
        std::fs::write(&path, b"old").unwrap();
        remove_stale(&path).unwrap();
        assert!(!path.exists());
    }
}
