//! Text and URL normalization applied to scraped values.

use std::sync::LazyLock;

use bookcover_core::types::QUERY_SEPARATOR;
use regex::Regex;

/// Size marker the catalog embeds in thumbnail URLs, e.g. `._SY75_.jpg`.
static SIZE_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_[^_]*_.").expect("invalid size marker regex"));

/// Remove the thumbnail size marker so the URL points at the full-size image.
///
/// `https://i.gr-assets.com/books/1434908555i/234225._SY75_.jpg` becomes
/// `https://i.gr-assets.com/books/1434908555i/234225.jpg`.
pub fn strip_size_marker(url: &str) -> String {
    SIZE_MARKER.replace_all(url, "").into_owned()
}

/// Collapse whitespace in a scraped author name and join the words with the query separator.
pub fn normalize_author(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(QUERY_SEPARATOR)
}

/// Case-insensitive comparison of two separator-joined names.
pub fn same_author(found: &str, wanted: &str) -> bool {
    found.to_lowercase() == wanted.to_lowercase()
}
