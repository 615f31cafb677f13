/*!
 * Book and unit configuration.
 *
 * A book lives under a base path (local directory or URL) holding `book.json`
 * and, per unit, `{filename}.mp3` plus `{filename}.lrc`. A catalog file
 * (`data.json`) maps short book keys to base paths.
 */

use serde::{Deserialize, Serialize};
use log::{debug, warn};

use crate::errors::BookError;

/// Book key used when none is given
pub const DEFAULT_BOOK_KEY: &str = "YL4B";

/// Book path used when the key is not in the catalog
pub const DEFAULT_BOOK_PATH: &str = "https://yl.mleo.site/4B";

/// Audio file extension for unit tracks
const AUDIO_EXTENSION: &str = "mp3";

/// Transcript file extension
const TRANSCRIPT_EXTENSION: &str = "lrc";

// @struct: Unit entry as written in book.json
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnitEntry {
    // @field: Display title
    pub title: String,

    // @field: File stem shared by the audio and transcript files
    pub filename: String,
}

/// Contents of `book.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookConfig {
    #[serde(default)]
    pub book_name: String,

    #[serde(default)]
    pub book_level: String,

    /// Cover image file, relative to the book path
    #[serde(default)]
    pub book_cover: Option<String>,

    #[serde(default)]
    pub units: Vec<UnitEntry>,
}

impl BookConfig {
    /// Parse `book.json` text
    pub fn from_json(content: &str) -> Result<Self, BookError> {
        serde_json::from_str(content)
            .map_err(|e| BookError::InvalidConfig(format!("book.json: {}", e)))
    }

    // @returns: "{bookName} {bookLevel}"
    pub fn display_name(&self) -> String {
        format!("{} {}", self.book_name, self.book_level).trim().to_string()
    }

    /// Full location of the cover image, if one is configured
    pub fn cover_url(&self, book_path: &str) -> Option<String> {
        self.book_cover
            .as_deref()
            .filter(|cover| !cover.trim().is_empty())
            .map(|cover| join_location(book_path, cover))
    }
}

/// One unit of a book, resolved against the book path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitDescriptor {
    /// Zero-based position within the book
    pub ordinal: usize,
    pub title: String,
    pub audio_url: String,
    pub transcript_url: String,
}

impl UnitDescriptor {
    /// Resolve a `book.json` entry under `book_path`
    pub fn from_entry(book_path: &str, ordinal: usize, entry: &UnitEntry) -> Self {
        UnitDescriptor {
            ordinal,
            title: entry.title.clone(),
            audio_url: join_location(book_path, &format!("{}.{}", entry.filename, AUDIO_EXTENSION)),
            transcript_url: join_location(
                book_path,
                &format!("{}.{}", entry.filename, TRANSCRIPT_EXTENSION),
            ),
        }
    }

    /// One-based id shown to users
    pub fn id(&self) -> usize {
        self.ordinal + 1
    }
}

/// A loaded book: its base path, configuration and resolved units
#[derive(Debug, Clone)]
pub struct Book {
    pub path: String,
    pub config: BookConfig,
    pub units: Vec<UnitDescriptor>,
}

impl Book {
    pub fn new(path: impl Into<String>, config: BookConfig) -> Self {
        let path = path.into();
        let units = config
            .units
            .iter()
            .enumerate()
            .map(|(ordinal, entry)| UnitDescriptor::from_entry(&path, ordinal, entry))
            .collect::<Vec<_>>();

        debug!("Book '{}' has {} units", config.display_name(), units.len());

        Book { path, config, units }
    }

    /// Unit at `index`
    pub fn unit(&self, index: usize) -> Result<&UnitDescriptor, BookError> {
        self.units.get(index).ok_or(BookError::UnitOutOfRange {
            index,
            count: self.units.len(),
        })
    }

    pub fn display_name(&self) -> String {
        self.config.display_name()
    }
}

// @struct: Catalog entry in data.json
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub key: String,

    #[serde(default)]
    pub book_path: Option<String>,
}

/// Contents of `data.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct BookCatalog {
    #[serde(default)]
    pub books: Vec<CatalogEntry>,
}

impl BookCatalog {
    pub fn from_json(content: &str) -> Result<Self, BookError> {
        serde_json::from_str(content)
            .map_err(|e| BookError::InvalidConfig(format!("data.json: {}", e)))
    }

    /// Trimmed, non-empty book path registered for `key`
    pub fn find_path(&self, key: &str) -> Option<String> {
        self.books
            .iter()
            .find(|book| book.key == key)
            .and_then(|book| book.book_path.as_deref())
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .map(str::to_string)
    }
}

/// Pick the book path: an explicit path wins, then the catalog entry for the
/// key (blank keys mean the default key), then `default_path`.
pub fn resolve_book_path(
    explicit_path: Option<&str>,
    key: Option<&str>,
    catalog: &BookCatalog,
    default_path: &str,
) -> String {
    if let Some(path) = explicit_path.map(str::trim).filter(|p| !p.is_empty()) {
        return path.to_string();
    }

    let key = key.map(str::trim).filter(|k| !k.is_empty()).unwrap_or(DEFAULT_BOOK_KEY);
    match catalog.find_path(key) {
        Some(path) => path,
        None => {
            warn!("Book key '{}' not found in catalog, using {}", key, default_path);
            default_path.to_string()
        }
    }
}

/// Join a base location and a relative file name with a single slash
pub fn join_location(base: &str, file: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), file.trim_start_matches('/'))
}
