/*!
 * Fetching of book configuration and transcript text.
 *
 * Locations are either `http(s)://` URLs or local paths (`file://` URLs are
 * accepted too). There is no retry logic: a failed fetch is reported to the
 * caller as a `BookError::FetchFailed`.
 */

use std::path::PathBuf;
use async_trait::async_trait;
use log::debug;
use url::Url;

use crate::book::{self, Book, BookCatalog, BookConfig};
use crate::errors::BookError;

/// Name of the per-book configuration file
pub const BOOK_CONFIG_FILE: &str = "book.json";

/// Source of text resources
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Fetch the resource at `location` as UTF-8 text
    async fn fetch_text(&self, location: &str) -> Result<String, BookError>;
}

/// Fetcher for HTTP URLs and local files
#[derive(Debug, Clone, Default)]
pub struct DefaultFetcher {
    client: reqwest::Client,
}

/// Where a location points to
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceLocation {
    Remote(Url),
    Local(PathBuf),
}

impl ResourceLocation {
    pub fn parse(location: &str) -> Self {
        match Url::parse(location) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Self::Remote(url),
            Ok(url) if url.scheme() == "file" => match url.to_file_path() {
                Ok(path) => Self::Local(path),
                Err(()) => Self::Local(PathBuf::from(location)),
            },
            _ => Self::Local(PathBuf::from(location)),
        }
    }
}

impl DefaultFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceFetcher for DefaultFetcher {
    async fn fetch_text(&self, location: &str) -> Result<String, BookError> {
        let failed = |message: String| BookError::FetchFailed {
            location: location.to_string(),
            message,
        };

        match ResourceLocation::parse(location) {
            ResourceLocation::Remote(url) => {
                debug!("Fetching {}", url);
                let response = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| failed(e.to_string()))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(failed(format!("HTTP {}", status)));
                }

                response.text().await.map_err(|e| failed(e.to_string()))
            }
            ResourceLocation::Local(path) => {
                debug!("Reading {:?}", path);
                tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|e| failed(e.to_string()))
            }
        }
    }
}

/// Load `book.json` under `book_path` and resolve its units
pub async fn load_book<F: ResourceFetcher + ?Sized>(fetcher: &F, book_path: &str) -> Result<Book, BookError> {
    let location = book::join_location(book_path, BOOK_CONFIG_FILE);
    let content = fetcher.fetch_text(&location).await?;
    let config = BookConfig::from_json(&content)?;
    Ok(Book::new(book_path, config))
}

/// Load the book catalog (`data.json`)
pub async fn load_catalog<F: ResourceFetcher + ?Sized>(fetcher: &F, location: &str) -> Result<BookCatalog, BookError> {
    let content = fetcher.fetch_text(location).await?;
    BookCatalog::from_json(&content)
}

/// Determine the book path. The catalog is only consulted when no explicit
/// path is given.
pub async fn locate_book<F: ResourceFetcher + ?Sized>(
    fetcher: &F,
    explicit_path: Option<&str>,
    key: Option<&str>,
    catalog_location: &str,
    default_path: &str,
) -> Result<String, BookError> {
    if let Some(path) = explicit_path.map(str::trim).filter(|p| !p.is_empty()) {
        return Ok(path.to_string());
    }

    let catalog = load_catalog(fetcher, catalog_location).await?;
    Ok(book::resolve_book_path(None, key, &catalog, default_path))
}
