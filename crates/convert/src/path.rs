//! Output path derivation.
//!
//! A page's PDF is named after where it came from: the network location and
//! path of its URL as written, slugified into a single filesystem-safe token.
//! The URL is never normalized first, so `:443`, `..` segments and
//! percent-escapes all show up in the name.
//!
//! ```text
//! https://example.com/Some Page!   →  <dir>/example-com-some-page.pdf
//! https://user@host:8080/docs/     →  <dir>/user-host-8080-docs.pdf
//! https://                         →  <dir>/output.pdf
//! ```

use crate::split::split;
use rslug::slugify;
use std::path::{Path, PathBuf};

/// Directory PDFs are written to when no explicit destination is given.
pub const DEFAULT_OUTPUT_DIR: &str = "output";
/// Base name used when a URL slugifies to nothing.
pub const DEFAULT_BASENAME: &str = "output";
/// Extension appended to every derived file name.
pub const EXTENSION: &str = ".pdf";

/// Derives `<output_dir>/<slug(netloc + path)>.pdf` for `url`.
///
/// Pure: nothing is created on disk. Input without a `scheme://` prefix has no
/// network location, so only its path part is slugified; input that slugifies
/// to nothing resolves to [`DEFAULT_BASENAME`].
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use webpdf_convert::resolve_path;
///
/// let path = resolve_path("https://example.com/Some Page!", "out");
/// assert_eq!(path, Path::new("out/example-com-some-page.pdf"));
/// ```
pub fn resolve_path(url: &str, output_dir: impl AsRef<Path>) -> PathBuf {
    output_dir.as_ref().join(file_name(url))
}

fn file_name(url: &str) -> String {
    let mut name = slugify!(&location(url));
    if name.is_empty() {
        name = DEFAULT_BASENAME.to_string();
    }
    // Literal, case-sensitive suffix check. Slugs never contain dots, so in
    // practice the extension is always appended.
    if !name.ends_with(EXTENSION) {
        name.push_str(EXTENSION);
    }
    name
}

/// Raw network location followed by the raw path.
fn location(url: &str) -> String {
    let parts = split(url);
    format!("{}{}", parts.netloc.unwrap_or_default(), parts.path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://example.com/Some Page!", "out/example-com-some-page.pdf")]
    #[case("https://example.com", "out/example-com.pdf")]
    #[case("https://example.com/", "out/example-com.pdf")]
    #[case("https://Example.COM/Docs/Guide.html", "out/example-com-docs-guide-html.pdf")]
    #[case("https://user:pw@example.com:8080/a/b?q=1#frag", "out/user-pw-example-com-8080-a-b.pdf")]
    #[case("https://example.com:443/a", "out/example-com-443-a.pdf")]
    #[case("https://example.com/a/../b", "out/example-com-a-b.pdf")]
    #[case("https://example.com/caf%C3%A9", "out/example-com-caf-c3-a9.pdf")]
    #[case("https://example.com/café/crème", "out/example-com-cafe-creme.pdf")]
    #[case("https://example.com/a;p=1?q", "out/example-com-a.pdf")]
    #[case("https://example.com/---/", "out/example-com.pdf")]
    #[case("https://", "out/output.pdf")]
    #[case("not-a-url", "out/not-a-url.pdf")]
    #[case("", "out/output.pdf")]
    fn test_resolve_path(#[case] url: &str, #[case] expected: &str) {
        assert_eq!(resolve_path(url, "out"), Path::new(expected));
    }

    #[test]
    fn test_resolved_name_is_filesystem_safe() {
        let path = resolve_path("https://example.com/Ünïcödé/«quoted»/a b\tc/../%2F", "out");
        assert_eq!(path.parent(), Some(Path::new("out")));
        let name = path.file_name().unwrap().to_str().unwrap();
        let stem = name.strip_suffix(".pdf").unwrap();
        assert!(!stem.is_empty());
        assert!(stem.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'), "{stem}");
        assert!(!stem.starts_with('-') && !stem.ends_with('-'));
        assert!(!stem.contains("--"));
    }

    #[test]
    fn test_nested_output_dir() {
        let path = resolve_path("https://example.com/page", Path::new("a/b"));
        assert_eq!(path, Path::new("a/b/example-com-page.pdf"));
    }

    #[test]
    fn test_extension_appended_once() {
        assert_eq!(file_name("https://example.com/report.pdf"), "example-com-report-pdf.pdf");
        assert_eq!(file_name("https://example.com/REPORT.PDF"), "example-com-report-pdf.pdf");
    }
}
