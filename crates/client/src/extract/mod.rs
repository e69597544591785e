//! Cover extraction from catalog result pages.
//!
//! Extraction is purely structural: documents are parsed with `scraper` and
//! queried with CSS selectors.
//!
//! ### ISBN result page
//! - First `.BookCover__image` element, its first `img`, the `src` attribute.
//! - URLs on this page are already full size and are returned as-is.
//!
//! ### Title search result page
//! - Rows are `tr[itemscope]`, visited in document order.
//! - Each row contributes the first `.bookCover` `src` and the first `.authorName` text.
//! - The first row whose author matches case-insensitively wins; later rows are never considered.
//! - The winning URL has its thumbnail size marker stripped.

pub mod normalize;

pub use normalize::strip_size_marker;

use std::sync::LazyLock;

use bookcover_core::Error;
use scraper::{ElementRef, Html, Selector};

use normalize::{normalize_author, same_author};

static BOOK_COVER: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".BookCover__image").expect("invalid selector"));
static IMG: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").expect("invalid selector"));
static RESULT_ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr[itemscope]").expect("invalid selector"));
static ROW_COVER: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".bookCover").expect("invalid selector"));
static ROW_AUTHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".authorName").expect("invalid selector"));

/// Extract the cover URL from an ISBN result page.
pub fn extract_by_isbn(html: &str, isbn: &str) -> Result<String, Error> {
    let document = Html::parse_document(html);

    document
        .select(&BOOK_COVER)
        .next()
        .and_then(|cover| cover.select(&IMG).next())
        .and_then(|img| img.value().attr("src"))
        .map(str::to_string)
        .ok_or_else(|| Error::NotFound(format!("image was not found for ISBN {isbn}")))
}

/// Extract the cover URL of the first search result written by `author`.
///
/// `title` and `author` are separator-joined, as produced by
/// [`bookcover_core::LookupKey::title_author`]; `title` only appears in the
/// not-found message.
pub fn extract_by_title_author(html: &str, title: &str, author: &str) -> Result<String, Error> {
    let document = Html::parse_document(html);

    let url = document
        .select(&RESULT_ROW)
        .find_map(|row| matching_cover(row, author))
        .ok_or_else(|| Error::NotFound(format!("image was not found [book_title={title}, author_name={author}]")))?;

    Ok(strip_size_marker(&url))
}

fn matching_cover(row: ElementRef<'_>, author: &str) -> Option<String> {
    let src = row.select(&ROW_COVER).next()?.value().attr("src")?;

    let found_author = row
        .select(&ROW_AUTHOR)
        .next()
        .map(|el| normalize_author(&el.text().collect::<String>()))
        .unwrap_or_default();

    same_author(&found_author, author).then(|| src.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_HTML: &str = r#"
        <html>
            <body>
                <table class="tableList">
                    <tr itemscope itemtype="http://schema.org/Book">
                        <td><img class="bookCover" src="https://i.gr-assets.com/books/111i/1._SY75_.jpg" /></td>
                        <td><a class="authorName"><span itemprop="name">Brian Herbert</span></a></td>
                    </tr>
                    <tr itemscope itemtype="http://schema.org/Book">
                        <td><img class="bookCover" src="https://i.gr-assets.com/books/222i/2._SY75_.jpg" /></td>
                        <td>
                            <a class="authorName">
                                <span itemprop="name">Frank
                                    Herbert</span>
                            </a>
                        </td>
                    </tr>
                    <tr itemscope itemtype="http://schema.org/Book">
                        <td><img class="bookCover" src="https://i.gr-assets.com/books/333i/3._SY75_.jpg" /></td>
                        <td><a class="authorName"><span itemprop="name">Frank Herbert</span></a></td>
                    </tr>
                </table>
            </body>
        </html>
    "#;

    #[test]
    fn test_extract_by_isbn() {
        let html = r#"
            <html>
                <body>
                    <div class="BookCover__image">
                        <div class="BookCover__image"><img src="https://example.com/cover.jpg" /></div>
                    </div>
                </body>
            </html>
        "#;

        let url = extract_by_isbn(html, "9780345376597").unwrap();
        assert_eq!(url, "https://example.com/cover.jpg");
    }

    #[test]
    fn test_extract_by_isbn_keeps_size_marker() {
        let html = r#"<div class="BookCover__image"><img src="https://example.com/1._SY475_.jpg"></div>"#;
        assert_eq!(extract_by_isbn(html, "9780345376597").unwrap(), "https://example.com/1._SY475_.jpg");
    }

    #[test]
    fn test_extract_by_isbn_not_found() {
        let html = "<html><body><div>No book cover here</div></body></html>";

        let err = extract_by_isbn(html, "1234567890123").unwrap_err();
        assert!(matches!(&err, Error::NotFound(_)));
        assert_eq!(err.message(), "image was not found for ISBN 1234567890123");
    }

    #[test]
    fn test_extract_by_isbn_first_cover_without_img() {
        let html = r#"
            <div class="BookCover__image"></div>
            <div class="BookCover__image"><img src="https://example.com/second.jpg"></div>
        "#;
        assert!(matches!(extract_by_isbn(html, "9780345376597"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_extract_by_title_author_first_matching_row() {
        let url = extract_by_title_author(SEARCH_HTML, "Dune", "frank+herbert").unwrap();
        assert_eq!(url, "https://i.gr-assets.com/books/222i/2.jpg");
    }

    #[test]
    fn test_extract_by_title_author_case_insensitive() {
        let url = extract_by_title_author(SEARCH_HTML, "Dune", "BRIAN+HERBERT").unwrap();
        assert_eq!(url, "https://i.gr-assets.com/books/111i/1.jpg");
    }

    #[test]
    fn test_extract_by_title_author_no_matching_author() {
        let err = extract_by_title_author(SEARCH_HTML, "Pale+Blue+Dot", "Carl+Sagan").unwrap_err();
        assert!(matches!(&err, Error::NotFound(_)));
        assert_eq!(err.message(), "image was not found [book_title=Pale+Blue+Dot, author_name=Carl+Sagan]");
    }

    #[test]
    fn test_extract_by_title_author_skips_rows_without_image() {
        let html = r#"
            <table>
                <tr itemscope>
                    <td><span class="authorName">Carl Sagan</span></td>
                </tr>
                <tr itemscope>
                    <td><img class="bookCover" src="https://example.com/1234._SX50_.jpg"></td>
                    <td><span class="authorName">Carl Sagan</span></td>
                </tr>
            </table>
        "#;

        let url = extract_by_title_author(html, "Cosmos", "Carl+Sagan").unwrap();
        assert_eq!(url, "https://example.com/1234.jpg");
    }

    #[test]
    fn test_extract_by_title_author_ignores_rows_outside_itemscope() {
        let html = r#"
            <table>
                <tr>
                    <td><img class="bookCover" src="https://example.com/wrong.jpg"></td>
                    <td><span class="authorName">Carl Sagan</span></td>
                </tr>
            </table>
        "#;

        assert!(matches!(extract_by_title_author(html, "Cosmos", "Carl+Sagan"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_extract_by_title_author_empty_document() {
        assert!(matches!(extract_by_title_author("", "Cosmos", "Carl+Sagan"), Err(Error::NotFound(_))));
    }
}
