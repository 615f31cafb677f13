/*!
 * Key/value persistence for user preferences.
 *
 * This module provides two `KeyValueStore` backends:
 * - `MemoryStore`: process-local map, used for tests and `--storage memory`
 * - `SqliteStore`: SQLite file under the user's data directory
 */

pub mod memory;
pub mod schema;
pub mod sqlite;

// Re-export main types
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
