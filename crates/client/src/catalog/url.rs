//! Catalog URL construction.

use url::Url;

/// Error type for catalog base URL failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Parse the configured catalog base URL.
///
/// Whitespace is trimmed, the query and fragment dropped, and a trailing slash
/// added to the path so that [`Url::join`] keeps any path prefix.
pub fn parse_base(input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    parsed.set_fragment(None);
    parsed.set_query(None);

    if !parsed.path().ends_with('/') {
        let path = format!("{}/", parsed.path());
        parsed.set_path(&path);
    }

    Ok(parsed)
}

fn search_endpoint(base: &Url) -> Result<Url, UrlError> {
    base.join("search").map_err(|e| UrlError::InvalidUrl(e.to_string()))
}

/// Title search page: `{base}/search?utf8=✓&q=<title>&search_type=books`.
///
/// `title` is separator-joined; the separator is decoded back to spaces so the
/// query string carries the usual `+`-encoded form.
pub fn title_search(base: &Url, title: &str) -> Result<Url, UrlError> {
    let mut url = search_endpoint(base)?;
    url.query_pairs_mut()
        .append_pair("utf8", "✓")
        .append_pair("q", &title.replace('+', " "))
        .append_pair("search_type", "books");
    Ok(url)
}

/// ISBN search page: `{base}/search?utf8=✓&query=<isbn>`.
pub fn isbn_search(base: &Url, isbn: &str) -> Result<Url, UrlError> {
    let mut url = search_endpoint(base)?;
    url.query_pairs_mut().append_pair("utf8", "✓").append_pair("query", isbn);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_base_adds_trailing_slash() {
        let url = parse_base("https://www.goodreads.com").unwrap();
        assert_eq!(url.as_str(), "https://www.goodreads.com/");
    }

    #[test]
    fn test_parse_base_drops_fragment_and_query() {
        let url = parse_base("  http://127.0.0.1:8080/mirror?x=1#top  ").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/mirror/");
    }

    #[test]
    fn test_search_keeps_prefix_after_query_and_fragment() {
        let base = parse_base("http://127.0.0.1:8080/mirror?x=1#top").unwrap();
        let url = isbn_search(&base, "9780345376597").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/mirror/search?utf8=%E2%9C%93&query=9780345376597");
    }

    #[test]
    fn test_parse_base_rejects_scheme() {
        assert!(matches!(parse_base("file:///etc/passwd"), Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_parse_base_empty() {
        assert!(matches!(parse_base("   "), Err(UrlError::Empty)));
    }

    #[test]
    fn test_title_search_url() {
        let base = parse_base("https://www.goodreads.com").unwrap();
        let url = title_search(&base, "Pale+Blue+Dot").unwrap();

        assert_eq!(url.path(), "/search");
        assert_eq!(url.query(), Some("utf8=%E2%9C%93&q=Pale+Blue+Dot&search_type=books"));
    }

    #[test]
    fn test_title_search_encodes_reserved_chars() {
        let base = parse_base("https://www.goodreads.com").unwrap();
        let url = title_search(&base, "Q&A").unwrap();
        assert_eq!(url.query(), Some("utf8=%E2%9C%93&q=Q%26A&search_type=books"));
    }

    #[test]
    fn test_isbn_search_url_with_path_prefix() {
        let base = parse_base("http://localhost:9000/mirror").unwrap();
        let url = isbn_search(&base, "9780345376597").unwrap();

        assert_eq!(url.as_str(), "http://localhost:9000/mirror/search?utf8=%E2%9C%93&query=9780345376597");
    }
}
