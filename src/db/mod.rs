use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use log::{error, info};
use once_cell::sync::Lazy;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OptionalExtension};

use crate::error::SomanaError;

pub mod schema;

use schema::{CREATE_SCHEMA_SQL, SCHEMA_VERSION};

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

struct DbState {
    path: Option<PathBuf>,
    pool: Option<DbPool>,
}

/// Process-wide handle: the first caller opens the pool, later callers reuse
/// it, and a failure clears it so the next caller tries again.
static DB_STATE: Lazy<Mutex<DbState>> = Lazy::new(|| {
    Mutex::new(DbState {
        path: None,
        pool: None,
    })
});

pub struct Database;

impl Database {
    const MAX_CONNECTIONS: u32 = 8;
    const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);
    const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

    fn lock_state() -> MutexGuard<'static, DbState> {
        DB_STATE
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Sets the database file. A pool open on a different file is dropped.
    pub fn configure(path: impl Into<PathBuf>) {
        let path = path.into();
        let mut state = Self::lock_state();
        if state.path.as_ref() != Some(&path) {
            state.pool = None;
        }
        state.path = Some(path);
    }

    pub fn is_open() -> bool {
        Self::lock_state().pool.is_some()
    }

    /// Drops the cached pool so the next caller reconnects
    pub fn reset() {
        Self::lock_state().pool = None;
    }

    pub fn get_connection() -> Result<DbConnection, SomanaError> {
        let pool = Self::pool()?;
        pool.get().map_err(|e| {
            error!("Failed to check out a database connection: {e}");
            if Self::is_broken(&pool) {
                Self::reset();
            }
            SomanaError::from(e)
        })
    }

    /// A pool holding no live connections cannot reach the database. A pool
    /// whose connections are all checked out is only busy.
    fn is_broken(pool: &DbPool) -> bool {
        pool.state().connections == 0
    }

    fn pool() -> Result<DbPool, SomanaError> {
        let mut state = Self::lock_state();

        if let Some(pool) = &state.pool {
            return Ok(pool.clone());
        }

        let path = state
            .path
            .clone()
            .ok_or_else(|| SomanaError::Error("Database path is not configured".to_string()))?;

        match Self::open_pool(&path) {
            Ok(pool) => {
                info!("Database opened at: {}", path.display());
                state.pool = Some(pool.clone());
                Ok(pool)
            }
            Err(e) => {
                error!("Failed to open database at {}: {}", path.display(), e);
                Err(e)
            }
        }
    }

    fn open_pool(path: &Path) -> Result<DbPool, SomanaError> {
        let manager = SqliteConnectionManager::file(path)
            .with_init(|conn| conn.busy_timeout(Self::BUSY_TIMEOUT));

        let pool = Pool::builder()
            .max_size(Self::MAX_CONNECTIONS)
            .connection_timeout(Self::CONNECTION_TIMEOUT)
            .build(manager)?;

        let conn = pool.get()?;
        Self::ensure_schema(&conn)?;

        Ok(pool)
    }

    /// Creates any missing tables and checks the stored schema version
    pub fn ensure_schema(conn: &Connection) -> Result<(), SomanaError> {
        conn.execute_batch(CREATE_SCHEMA_SQL)?;

        let stored_version: Option<String> = conn
            .query_row(
                "SELECT value FROM meta WHERE key = 'schema_version'",
                [],
                |row| row.get(0),
            )
            .optional()?;

        match stored_version.as_deref() {
            Some(SCHEMA_VERSION) => Ok(()),
            Some(other) => Err(SomanaError::Error(format!(
                "Schema version mismatch: found {other}, expected {SCHEMA_VERSION}"
            ))),
            None => Err(SomanaError::Error("Schema version missing".to_string())),
        }
    }

    /// An initialized in-memory database, for tests and one-off tools
    pub fn open_in_memory() -> Result<Connection, SomanaError> {
        let conn = Connection::open_in_memory()?;
        Self::ensure_schema(&conn)?;
        Ok(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Database::open_in_memory().unwrap();
        Database::ensure_schema(&conn).unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name IN ('articles', 'music', 'podcasts')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 3);
    }

    #[test]
    fn test_schema_version_mismatch() {
        let conn = Database::open_in_memory().unwrap();
        conn.execute(
            "UPDATE meta SET value = '99' WHERE key = 'schema_version'",
            [],
        )
        .unwrap();
        assert!(Database::ensure_schema(&conn).is_err());
    }

    #[test]
    #[serial]
    fn test_pool_is_opened_once_and_reused() {
        let temp = TempDir::new().unwrap();
        Database::configure(temp.path().join("somana.db"));
        assert!(!Database::is_open());

        let first = Database::get_connection().unwrap();
        first
            .execute(
                "INSERT INTO music (music_name, audio_link, author, created_at, updated_at)
                 VALUES ('Song', 'https://a/b.mp3', 'u1', '2024-01-01T00:00:00.000Z', '2024-01-01T00:00:00.000Z')",
                [],
            )
            .unwrap();
        drop(first);
        assert!(Database::is_open());

        let second = Database::get_connection().unwrap();
        let count: i64 = second
            .query_row("SELECT count(*) FROM music", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);

        drop(second);
        Database::reset();
    }

    #[test]
    #[serial]
    fn test_failed_open_is_retried() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("not-yet-created");
        Database::configure(dir.join("somana.db"));

        assert!(Database::get_connection().is_err());
        assert!(!Database::is_open());

        fs::create_dir_all(&dir).unwrap();
        assert!(Database::get_connection().is_ok());
        assert!(Database::is_open());

        Database::reset();
    }

    #[test]
    fn test_checkout_timeout_is_not_a_broken_pool() {
        let temp = TempDir::new().unwrap();
        let pool = Pool::builder()
            .max_size(1)
            .connection_timeout(Duration::from_millis(100))
            .build(SqliteConnectionManager::file(temp.path().join("busy.db")))
            .unwrap();

        let held = pool.get().unwrap();
        assert!(pool.get().is_err());
        assert!(!Database::is_broken(&pool));
        drop(held);
    }

    #[test]
    fn test_unreachable_database_is_a_broken_pool() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing-dir").join("somana.db");
        let pool = Pool::builder()
            .max_size(1)
            .connection_timeout(Duration::from_millis(100))
            .build_unchecked(SqliteConnectionManager::file(path));

        assert!(pool.get().is_err());
        assert!(Database::is_broken(&pool));
    }

    #[test]
    #[serial]
    fn test_unconfigured_path_is_an_error() {
        Database::reset();
        {
            let mut state = Database::lock_state();
            state.path = None;
        }
        assert!(Database::get_connection().is_err());
    }
}
