use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;

use crate::book::{DEFAULT_BOOK_KEY, DEFAULT_BOOK_PATH};
use crate::session::{DEFAULT_AVAILABLE_SPEEDS, DEFAULT_PLAYBACK_RATE};
use crate::synchronizer::PlaybackMode;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Where to find the book
    #[serde(default)]
    pub book: BookSourceConfig,

    /// Playback defaults
    #[serde(default)]
    pub playback: PlaybackConfig,

    /// Preference storage
    #[serde(default)]
    pub storage: StorageConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Book selection settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BookSourceConfig {
    /// Key looked up in the catalog when no explicit path is set
    #[serde(default = "default_book_key")]
    pub book_key: String,

    /// Explicit book path (directory or URL); skips the catalog
    #[serde(default)]
    pub book_path: Option<String>,

    /// Location of the catalog (data.json)
    #[serde(default = "default_catalog_location")]
    pub catalog_location: String,

    /// Book path used when the key is not in the catalog
    #[serde(default = "default_book_path")]
    pub default_book_path: String,
}

impl Default for BookSourceConfig {
    fn default() -> Self {
        Self {
            book_key: default_book_key(),
            book_path: None,
            catalog_location: default_catalog_location(),
            default_book_path: default_book_path(),
        }
    }
}

/// Playback settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlaybackConfig {
    /// Mode used at startup
    #[serde(default)]
    pub default_mode: PlaybackMode,

    /// Rate used when no preference is stored
    #[serde(default = "default_rate")]
    pub default_rate: f64,

    /// Speeds offered when cycling the rate
    #[serde(default = "default_available_speeds")]
    pub available_speeds: Vec<f64>,

    /// Position update interval of the terminal player, in milliseconds
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            default_mode: PlaybackMode::default(),
            default_rate: default_rate(),
            available_speeds: default_available_speeds(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

/// Preference storage backend
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    // @backend: SQLite file
    #[default]
    Sqlite,
    // @backend: Forget everything on exit
    Memory,
}

impl StorageBackend {
    // @returns: Lowercase backend identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Sqlite => "sqlite".to_string(),
            Self::Memory => "memory".to_string(),
        }
    }
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            _ => Err(anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

/// Preference storage settings
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct StorageConfig {
    /// Backend to use
    #[serde(default)]
    pub backend: StorageBackend,

    /// Database file; the user's data directory when unset
    #[serde(default)]
    pub db_path: Option<String>,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_book_key() -> String {
    DEFAULT_BOOK_KEY.to_string()
}

fn default_catalog_location() -> String {
    "data.json".to_string()
}

fn default_book_path() -> String {
    DEFAULT_BOOK_PATH.to_string()
}

fn default_rate() -> f64 {
    DEFAULT_PLAYBACK_RATE
}

fn default_available_speeds() -> Vec<f64> {
    DEFAULT_AVAILABLE_SPEEDS.to_vec()
}

fn default_tick_interval_ms() -> u64 {
    250 // roughly the cadence of a media element's timeupdate event
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let has_explicit_path = self
            .book
            .book_path
            .as_deref()
            .is_some_and(|path| !path.trim().is_empty());

        if !has_explicit_path && self.book.catalog_location.trim().is_empty() {
            return Err(anyhow!("Either book_path or catalog_location must be set"));
        }

        if self.book.default_book_path.trim().is_empty() {
            return Err(anyhow!("default_book_path must not be empty"));
        }

        if !is_valid_speed(self.playback.default_rate) {
            return Err(anyhow!(
                "Invalid default playback rate: {}",
                self.playback.default_rate
            ));
        }

        if self.playback.available_speeds.is_empty() {
            return Err(anyhow!("available_speeds must contain at least one speed"));
        }

        if let Some(speed) = self
            .playback
            .available_speeds
            .iter()
            .find(|speed| !is_valid_speed(**speed))
        {
            return Err(anyhow!("Invalid playback speed in available_speeds: {}", speed));
        }

        if self.playback.tick_interval_ms == 0 || self.playback.tick_interval_ms > 10_000 {
            return Err(anyhow!(
                "tick_interval_ms must be between 1 and 10000, got {}",
                self.playback.tick_interval_ms
            ));
        }

        Ok(())
    }
}

fn is_valid_speed(speed: f64) -> bool {
    speed.is_finite() && speed > 0.0
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            book: BookSourceConfig::default(),
            playback: PlaybackConfig::default(),
            storage: StorageConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
