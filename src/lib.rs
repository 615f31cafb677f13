/*!
 * # readalong - point-and-read audio/transcript synchronizer
 *
 * A Rust library for reading along with textbook audio: a unit's audio track
 * is paired with a time-tagged bilingual transcript, the line being spoken is
 * highlighted as playback advances, and any line can be played on its own.
 *
 * ## Features
 *
 * - Parse `[MM:SS.mmm]text|translation` transcripts
 * - Track the active line from the playback position
 * - Single-line playback that stops at the next line
 * - Continuous playback through the whole unit
 * - Remember the last unit and preferred playback speed
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `transcript`: Transcript parsing and line lookup
 * - `synchronizer`: Position-to-line synchronization and single-line stops
 * - `collaborators`: Traits for the transport, renderer and preference store
 * - `session`: Unit navigation and remembered preferences
 * - `book`: Book catalog and unit descriptors
 * - `fetch`: Loading configuration and transcripts from files or HTTP
 * - `store`: In-memory and SQLite preference stores
 * - `transport`: Clock-driven transport for terminal playback
 * - `console`: Terminal renderer
 * - `app_config`: Configuration management
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod book;
pub mod collaborators;
pub mod console;
pub mod errors;
pub mod fetch;
pub mod mock;
pub mod session;
pub mod store;
pub mod synchronizer;
pub mod transcript;
pub mod transport;

// Re-export main types for easier usage
pub use app_config::Config;
pub use book::{Book, BookCatalog, BookConfig, UnitDescriptor};
pub use collaborators::{KeyValueStore, Renderer, Transport};
pub use errors::{BookError, StoreError, SyncError};
pub use session::{LoadTicket, ReadingSession};
pub use synchronizer::{PlaybackMode, PlaybackState, StopBoundary, Synchronizer};
pub use transcript::{parse, TimedLine, TranscriptSequence};
