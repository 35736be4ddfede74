//! Database: the injected persistence handle
//!
//! A pooled SQLite handle opened once at process start and passed to every
//! component that touches storage. Statements run on tokio's blocking pool so
//! a slow query never stalls other requests.
//!
//! # Example
//!
//! ```rust,no_run
//! use feedesk_auth::{AuthConfig, Database};
//!
//! #[tokio::main]
//! async fn main() -> feedesk_auth::Result<()> {
//!     let db = Database::open(&AuthConfig::new("/var/lib/feedesk/feedesk.db")).await?;
//!
//!     let users: i64 = db
//!         .run(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?))
//!         .await?;
//!     println!("{users} users");
//!
//!     db.close();
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, Transaction};
use tracing::{debug, info};

use crate::config::AuthConfig;
use crate::error::Result;
use crate::schema;

/// Pooled SQLite database
///
/// Cheap to clone: clones share the pool.
#[derive(Clone)]
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
    path: PathBuf,
}

impl Database {
    /// Open the database, build the pool and create all tables
    pub async fn open(config: &AuthConfig) -> Result<Self> {
        let path = config.database_path.clone();
        let pool_size = config.pool_size;
        let busy_timeout = Duration::from_millis(config.busy_timeout_ms);

        let db = tokio::task::spawn_blocking(move || -> Result<Self> {
            let manager = SqliteConnectionManager::file(&path).with_init(move |conn| {
                conn.busy_timeout(busy_timeout)?;
                conn.execute_batch(schema::CONNECTION_PRAGMAS)
            });
            let pool = Pool::builder().max_size(pool_size).build(manager)?;

            let db = Self { pool, path };
            db.init_all_tables()?;
            Ok(db)
        })
        .await??;

        info!(path = %db.path.display(), pool_size, "Database opened");
        Ok(db)
    }

    /// Create all tables (idempotent)
    fn init_all_tables(&self) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute_batch(schema::DATABASE_PRAGMAS)?;
        for table in schema::all_tables() {
            conn.execute_batch(table.ddl)?;
            debug!(table = table.name, "Table ready");
        }
        Ok(())
    }

    /// Run a closure against a pooled connection on the blocking pool
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            f(&mut *conn)
        })
        .await?
    }

    /// Run a closure inside a single transaction
    ///
    /// Commits when the closure returns `Ok`; any `Err` rolls everything back.
    pub async fn transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        self.run(move |conn| {
            let tx = conn.transaction()?;
            let out = f(&tx)?;
            tx.commit()?;
            Ok(out)
        })
        .await
    }

    /// Database file location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the handle; the pool closes once the last clone is gone
    pub fn close(self) {
        info!(path = %self.path.display(), "Database handle released");
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.path)
            .field("connections", &self.pool.state().connections)
            .finish()
    }
}

/// Current time as Unix seconds, the storage representation of timestamps
pub(crate) fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Convert stored Unix seconds back into a UTC timestamp
pub(crate) fn from_unix(secs: i64) -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::from_timestamp(secs, 0).unwrap_or_default()
}
