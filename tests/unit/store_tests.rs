/*!
 * Tests for the preference stores
 */

use readalong::collaborators::KeyValueStore;
use readalong::session::{ReadingSession, PLAYBACK_RATE_KEY};
use readalong::store::schema::{self, SCHEMA_VERSION};
use readalong::store::{MemoryStore, SqliteStore};

use crate::common::create_temp_dir;

#[test]
fn test_sqliteStore_reopen_shouldKeepValues() {
    let temp_dir = create_temp_dir().unwrap();
    let db_path = temp_dir.path().join("prefs").join("readalong.db");

    {
        let store = SqliteStore::new(&db_path).expect("Failed to create store");
        store.set(PLAYBACK_RATE_KEY, "1.5").unwrap();
        store.set("books/4B/currentUnitIndex", "3").unwrap();
    }

    let store = SqliteStore::new(&db_path).expect("Failed to reopen store");
    assert_eq!(store.path(), db_path.as_path());
    assert_eq!(store.get(PLAYBACK_RATE_KEY).unwrap().as_deref(), Some("1.5"));
    assert_eq!(store.get("books/4B/currentUnitIndex").unwrap().as_deref(), Some("3"));
}

#[test]
fn test_sqliteStore_asSessionBackend_shouldRememberAcrossSessions() {
    let temp_dir = create_temp_dir().unwrap();
    let db_path = temp_dir.path().join("readalong.db");

    {
        let store = SqliteStore::new(&db_path).expect("Failed to create store");
        let mut session = ReadingSession::new("books/4B", Vec::new(), store);
        session.set_playback_rate(1.25).unwrap();
    }

    let store = SqliteStore::new(&db_path).expect("Failed to reopen store");
    let session = ReadingSession::new("books/4B", Vec::new(), store);
    assert_eq!(session.playback_rate(), 1.25);
}

#[test]
fn test_boxedStore_shouldDelegateToInner() {
    let store: Box<dyn KeyValueStore> = Box::new(MemoryStore::new());
    store.set("key", "value").unwrap();

    assert_eq!(store.get("key").unwrap().as_deref(), Some("value"));
    assert_eq!(store.get("other").unwrap(), None);
}

#[test]
fn test_defaultDatabasePath_shouldEndWithAppFile() {
    if let Ok(path) = SqliteStore::default_database_path() {
        assert!(path.ends_with("readalong/readalong.db"));
    }
}

#[test]
fn test_initializeSchema_runTwice_shouldRecordCurrentVersion() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    assert_eq!(schema::get_schema_version(&conn).unwrap(), 0);

    schema::initialize_schema(&conn).unwrap();
    schema::initialize_schema(&conn).unwrap();

    assert_eq!(schema::get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
}
