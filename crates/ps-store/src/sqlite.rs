//! SQLite-backed transactional store.
//!
//! All records live in a single `kv` table keyed by BLOB, so SQLite's
//! memcmp ordering matches [`MemoryStore`](crate::MemoryStore). Connections
//! come from an r2d2 pool; WAL mode lets readers keep their snapshot while a
//! writer holds the `BEGIN IMMEDIATE` lock.

use std::path::Path;

use ps_core::{Error, Result};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OptionalExtension;

use crate::{prefix_upper_bound, Entry, KvStore, ReadTxn, WriteTxn};

type KvPool = Pool<SqliteConnectionManager>;

type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS kv (
    key   BLOB PRIMARY KEY NOT NULL,
    value BLOB NOT NULL
) WITHOUT ROWID;
"#;

/// [`KvStore`] persisted in a SQLite database file.
#[derive(Clone)]
pub struct SqliteStore {
    pool: KvPool,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub fn open(path: &Path) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA busy_timeout = 5000;",
            )
        });

        let pool = Pool::builder()
            .max_size(4)
            .build(manager)
            .map_err(|e| Error::store(format!("Failed to create connection pool: {e}")))?;

        let conn = get_conn(&pool)?;
        conn.execute_batch(SCHEMA).map_err(Error::store)?;

        tracing::info!("Key-value store opened at {}", path.display());
        Ok(Self { pool })
    }

    fn begin(&self, statement: &str) -> Result<SqliteTxn> {
        let conn = get_conn(&self.pool)?;
        conn.execute_batch(statement).map_err(Error::store)?;
        Ok(SqliteTxn {
            conn,
            finished: false,
        })
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("connections", &self.pool.state().connections)
            .finish()
    }
}

impl KvStore for SqliteStore {
    fn begin_read(&self) -> Result<Box<dyn ReadTxn + '_>> {
        Ok(Box::new(self.begin("BEGIN DEFERRED")?))
    }

    fn begin_write(&self) -> Result<Box<dyn WriteTxn + '_>> {
        Ok(Box::new(self.begin("BEGIN IMMEDIATE")?))
    }
}

fn get_conn(pool: &KvPool) -> Result<PooledConnection> {
    pool.get()
        .map_err(|e| Error::store(format!("Failed to get connection from pool: {e}")))
}

/// An open SQLite transaction on a pooled connection.
///
/// Rolled back on drop unless committed.
struct SqliteTxn {
    conn: PooledConnection,
    finished: bool,
}

impl ReadTxn for SqliteTxn {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                rusqlite::params![key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()
            .map_err(Error::store)
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<Entry>> {
        let map_row = |row: &rusqlite::Row| -> rusqlite::Result<Entry> {
            Ok((row.get(0)?, row.get(1)?))
        };

        let rows = match prefix_upper_bound(prefix) {
            Some(upper) => {
                let mut stmt = self
                    .conn
                    .prepare_cached(
                        "SELECT key, value FROM kv WHERE key >= ?1 AND key < ?2 ORDER BY key",
                    )
                    .map_err(Error::store)?;
                let rows = stmt
                    .query_map(rusqlite::params![prefix, upper], map_row)
                    .map_err(Error::store)?
                    .collect::<rusqlite::Result<Vec<_>>>();
                rows
            }
            None => {
                let mut stmt = self
                    .conn
                    .prepare_cached("SELECT key, value FROM kv WHERE key >= ?1 ORDER BY key")
                    .map_err(Error::store)?;
                let rows = stmt
                    .query_map(rusqlite::params![prefix], map_row)
                    .map_err(Error::store)?
                    .collect::<rusqlite::Result<Vec<_>>>();
                rows
            }
        };

        rows.map_err(Error::store)
    }
}

impl WriteTxn for SqliteTxn {
    fn put(&mut self, key: &[u8], value: Vec<u8>) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                rusqlite::params![key, value],
            )
            .map_err(Error::store)?;
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM kv WHERE key = ?1", rusqlite::params![key])
            .map_err(Error::store)?;
        Ok(changed > 0)
    }

    fn commit(mut self: Box<Self>) -> Result<()> {
        self.conn.execute_batch("COMMIT").map_err(Error::store)?;
        self.finished = true;
        Ok(())
    }
}

impl Drop for SqliteTxn {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(e) = self.conn.execute_batch("ROLLBACK") {
            tracing::warn!("Failed to roll back transaction: {e}");
        }
    }
}
