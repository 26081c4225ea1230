//! Raw URL components, sliced out of the input exactly as written.
//!
//! Nothing is normalized: default ports, dot segments, case and
//! percent-escapes all survive, which keeps derived file names stable with
//! respect to what the user typed.

/// Borrowed pieces of a URL string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Parts<'a> {
    /// Everything before the first `:`, if it is a syntactically valid scheme.
    pub(crate) scheme: Option<&'a str>,
    /// Everything between `//` and the next `/`, `?` or `#`.
    pub(crate) netloc: Option<&'a str>,
    /// The path, without query, fragment or `;params` of its last segment.
    pub(crate) path: &'a str,
}

pub(crate) fn split(input: &str) -> Parts<'_> {
    let input = input.trim();
    let (scheme, rest) = match input.split_once(':') {
        Some((scheme, rest)) if is_scheme(scheme) => (Some(scheme), rest),
        _ => (None, input),
    };
    let (netloc, rest) = match rest.strip_prefix("//") {
        Some(rest) => {
            let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
            (Some(&rest[..end]), &rest[end..])
        },
        None => (None, rest),
    };
    let path = &rest[..rest.find(['?', '#']).unwrap_or(rest.len())];
    Parts { scheme, netloc, path: strip_params(path) }
}

/// ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )
fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// `;params` only ever attach to the last path segment.
fn strip_params(path: &str) -> &str {
    let last = path.rfind('/').map_or(0, |slash| slash + 1);
    match path[last..].find(';') {
        Some(pos) => &path[..last + pos],
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://example.com/a", Some("https"), Some("example.com"), "/a")]
    #[case("https://u:p@Example.COM:443/a/../b?q=1#f", Some("https"), Some("u:p@Example.COM:443"), "/a/../b")]
    #[case("https://example.com/caf%C3%A9", Some("https"), Some("example.com"), "/caf%C3%A9")]
    #[case("https://example.com/a;p=1/b;q=2", Some("https"), Some("example.com"), "/a;p=1/b")]
    #[case("https://", Some("https"), Some(""), "")]
    #[case("https:///x", Some("https"), Some(""), "/x")]
    #[case("https://example.com?q", Some("https"), Some("example.com"), "")]
    #[case("http:example.com", Some("http"), None, "example.com")]
    #[case("//example.com/page", None, Some("example.com"), "/page")]
    #[case("not-a-url", None, None, "not-a-url")]
    #[case("1http://example.com", None, None, "1http://example.com")]
    #[case("", None, None, "")]
    fn test_split(
        #[case] input: &str,
        #[case] scheme: Option<&str>,
        #[case] netloc: Option<&str>,
        #[case] path: &str,
    ) {
        assert_eq!(split(input), Parts { scheme, netloc, path });
    }
}
