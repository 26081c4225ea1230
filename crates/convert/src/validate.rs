//! URL validation.

use crate::error::{ErrorKind, Result};
use crate::split::split;
use exn::OptionExt;
use url::Url;

/// Returns `true` if `input` is an absolute URL with a non-empty scheme and a
/// non-empty network location.
///
/// The authority has to be spelled out as `scheme://host`; the WHATWG parser
/// would otherwise happily turn `http:example.com` into `http://example.com/`.
/// Never panics and never errors.
///
/// # Examples
///
/// ```
/// use webpdf_convert::is_valid;
///
/// assert!(is_valid("https://example.com/page"));
/// assert!(!is_valid("example.com/page"));
/// assert!(!is_valid("mailto:someone@example.com"));
/// ```
pub fn is_valid(input: &str) -> bool {
    parse(input).is_ok()
}

/// Parses `input`, rejecting anything [`is_valid`] would reject with
/// [`ErrorKind::InvalidInput`].
pub fn parse(input: &str) -> Result<Url> {
    let invalid = || ErrorKind::InvalidInput(input.to_string());
    let parts = split(input);
    if parts.scheme.is_none_or(str::is_empty) || parts.netloc.is_none_or(str::is_empty) {
        exn::bail!(invalid());
    }
    let url = Url::parse(input).ok().ok_or_raise(invalid)?;
    if url.scheme().is_empty() || url.host_str().is_none_or(str::is_empty) {
        exn::bail!(invalid());
    }
    Ok(url)
}
