//! Resolution of relative resource references.
//!
//! [URL Standard](https://url.spec.whatwg.org/)
//!
//! Images are referenced from markup by a possibly relative `src`. The layout
//! session carries the document's base URL and resolves every reference
//! before asking the image store for the asset.

use url::{ParseError, Url};

/// Longest resolved URL accepted; longer references are rejected.
pub const MAX_URL_LEN: usize = 2048;

/// Why a reference could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlError {
    /// The reference was empty or only whitespace.
    #[error("empty URL reference")]
    Empty,
    /// The base or the reference is not a valid URL.
    #[error("invalid URL: {0}")]
    Invalid(#[from] ParseError),
    /// The resolved URL exceeds [`MAX_URL_LEN`].
    #[error("resolved URL is {len} bytes, limit is {MAX_URL_LEN}")]
    TooLong {
        /// Length of the resolved URL in bytes.
        len: usize,
    },
}

/// Resolve a potentially relative `href` against `base`.
///
/// [§ 4.4 URL parsing](https://url.spec.whatwg.org/#url-parsing)
///
/// With a base, `href` is parsed relative to it, so absolute references,
/// protocol-relative (`//host/path`) and absolute-path references and dot
/// segments all follow the URL Standard. Without a base an absolute
/// reference is normalized and a relative one is kept as written.
///
/// # Errors
///
/// [`UrlError::Empty`] for an empty reference, [`UrlError::Invalid`] when
/// the base or the reference does not parse, [`UrlError::TooLong`] when the
/// result exceeds [`MAX_URL_LEN`].
pub fn resolve_url(href: &str, base: Option<&str>) -> Result<String, UrlError> {
    let href = href.trim();
    if href.is_empty() {
        return Err(UrlError::Empty);
    }

    let resolved = match base {
        Some(base) => String::from(Url::parse(base)?.join(href)?),
        None => match Url::parse(href) {
            Ok(url) => String::from(url),
            Err(ParseError::RelativeUrlWithoutBase) => href.to_string(),
            Err(err) => return Err(err.into()),
        },
    };

    if resolved.len() > MAX_URL_LEN {
        return Err(UrlError::TooLong {
            len: resolved.len(),
        });
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_reference_unchanged() {
        assert_eq!(
            resolve_url("https://cdn.example/a.png", Some("http://x/y")).unwrap(),
            "https://cdn.example/a.png"
        );
    }

    #[test]
    fn test_relative_reference_joins_directory() {
        assert_eq!(
            resolve_url("img/logo.png", Some("https://example.com/docs/index.html")).unwrap(),
            "https://example.com/docs/img/logo.png"
        );
        assert_eq!(
            resolve_url("../logo.png", Some("https://example.com/docs/index.html")).unwrap(),
            "https://example.com/logo.png"
        );
    }

    #[test]
    fn test_absolute_path_and_protocol_relative() {
        let base = Some("https://example.com/docs/index.html");
        assert_eq!(resolve_url("/a.png", base).unwrap(), "https://example.com/a.png");
        assert_eq!(resolve_url("//cdn/a.png", base).unwrap(), "https://cdn/a.png");
    }

    #[test]
    fn test_no_base_and_errors() {
        assert_eq!(resolve_url("a.png", None).unwrap(), "a.png");
        assert_eq!(resolve_url("  ", None), Err(UrlError::Empty));
        assert!(matches!(
            resolve_url("a.png", Some("not a base")),
            Err(UrlError::Invalid(_))
        ));
        let long = "a".repeat(MAX_URL_LEN + 1);
        assert!(matches!(resolve_url(&long, None), Err(UrlError::TooLong { .. })));
    }

    #[test]
    fn test_base_query_and_fragment_are_dropped() {
        assert_eq!(
            resolve_url("b.png", Some("http://h/a?x=1/b#frag")).unwrap(),
            "http://h/b.png"
        );
        assert_eq!(
            resolve_url("img/c.png?v=2", Some("http://h/dir/page?q=/x/y")).unwrap(),
            "http://h/dir/img/c.png?v=2"
        );
    }
}
