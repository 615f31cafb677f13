/*!
 * Tests for book configuration, catalog lookup and unit resolution
 */

use readalong::book::{self, Book, BookCatalog, BookConfig, DEFAULT_BOOK_PATH};
use readalong::errors::BookError;

const BOOK_JSON: &str = r#"{
  "bookName": "English",
  "bookLevel": "4B",
  "bookCover": "cover.jpg",
  "units": [
    { "title": "Unit 1 Greetings", "filename": "u1" },
    { "title": "Unit 2 Weather", "filename": "u2" }
  ]
}"#;

const CATALOG_JSON: &str = r#"{
  "books": [
    { "key": "YL4B", "bookPath": "https://yl.mleo.site/4B" },
    { "key": "YL5A", "bookPath": "  https://yl.mleo.site/5A  " },
    { "key": "EMPTY", "bookPath": "   " },
    { "key": "NOPATH" }
  ]
}"#;

#[test]
fn test_bookConfig_fromJson_shouldReadAllFields() {
    let config = BookConfig::from_json(BOOK_JSON).expect("valid book.json");

    assert_eq!(config.display_name(), "English 4B");
    assert_eq!(config.units.len(), 2);
    assert_eq!(config.units[1].filename, "u2");
    assert_eq!(
        config.cover_url("https://yl.mleo.site/4B/").as_deref(),
        Some("https://yl.mleo.site/4B/cover.jpg")
    );
}

#[test]
fn test_bookConfig_fromJson_withMissingFields_shouldUseDefaults() {
    let config = BookConfig::from_json("{}").expect("empty object is valid");

    assert!(config.units.is_empty());
    assert_eq!(config.display_name(), "");
    assert!(config.cover_url("books/4B").is_none());
}

#[test]
fn test_bookConfig_fromJson_withInvalidJson_shouldFail() {
    let result = BookConfig::from_json("{ not json");
    assert!(matches!(result, Err(BookError::InvalidConfig(_))));
}

#[test]
fn test_book_new_shouldResolveUnitLocations() {
    let config = BookConfig::from_json(BOOK_JSON).expect("valid book.json");
    let book = Book::new("https://yl.mleo.site/4B", config);

    let unit = book.unit(0).expect("first unit");
    assert_eq!(unit.id(), 1);
    assert_eq!(unit.title, "Unit 1 Greetings");
    assert_eq!(unit.audio_url, "https://yl.mleo.site/4B/u1.mp3");
    assert_eq!(unit.transcript_url, "https://yl.mleo.site/4B/u1.lrc");

    assert!(matches!(
        book.unit(2),
        Err(BookError::UnitOutOfRange { index: 2, count: 2 })
    ));
}

#[test]
fn test_catalog_findPath_shouldTrimAndIgnoreBlankPaths() {
    let catalog = BookCatalog::from_json(CATALOG_JSON).expect("valid data.json");

    assert_eq!(catalog.find_path("YL4B").as_deref(), Some("https://yl.mleo.site/4B"));
    assert_eq!(catalog.find_path("YL5A").as_deref(), Some("https://yl.mleo.site/5A"));
    assert_eq!(catalog.find_path("EMPTY"), None);
    assert_eq!(catalog.find_path("NOPATH"), None);
    assert_eq!(catalog.find_path("MISSING"), None);
}

#[test]
fn test_resolveBookPath_shouldPreferExplicitThenCatalogThenDefault() {
    let catalog = BookCatalog::from_json(CATALOG_JSON).expect("valid data.json");

    assert_eq!(
        book::resolve_book_path(Some(" local/books/4B "), Some("YL5A"), &catalog, DEFAULT_BOOK_PATH),
        "local/books/4B"
    );
    assert_eq!(
        book::resolve_book_path(None, Some("YL5A"), &catalog, DEFAULT_BOOK_PATH),
        "https://yl.mleo.site/5A"
    );
    assert_eq!(
        book::resolve_book_path(Some("  "), Some("MISSING"), &catalog, "fallback/path"),
        "fallback/path"
    );
}

#[test]
fn test_resolveBookPath_withBlankKey_shouldUseDefaultKey() {
    let catalog = BookCatalog::from_json(CATALOG_JSON).expect("valid data.json");

    assert_eq!(
        book::resolve_book_path(None, Some(""), &catalog, "fallback/path"),
        "https://yl.mleo.site/4B"
    );
    assert_eq!(
        book::resolve_book_path(None, None, &catalog, "fallback/path"),
        "https://yl.mleo.site/4B"
    );
}

#[test]
fn test_joinLocation_shouldUseSingleSlash() {
    assert_eq!(book::join_location("books/4B/", "/u1.lrc"), "books/4B/u1.lrc");
    assert_eq!(book::join_location("https://host/4B", "book.json"), "https://host/4B/book.json");
}
