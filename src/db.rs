mod migration;
mod seed;

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

pub use migration::{MIGRATIONS, Migration, latest_version};
pub use seed::{SEED_VERSION, builtin_topics};

/// Database wrapper providing connection management and schema initialization.
///
/// Construct it once at startup and lend it to the services that need it.
/// Opening runs pending migrations and refreshes reference data, so a
/// `Database` value is always ready for queries.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens an in-memory SQLite database.
    ///
    /// Automatically initializes the schema and reference data on open.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::initialize(conn)
    }

    /// Opens a file-based SQLite database at the given path.
    ///
    /// Creates the database file if it does not exist.
    /// Automatically initializes the schema and reference data on open.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        Self::initialize(conn)
    }

    /// Enables foreign keys, applies pending migrations, then reseeds the
    /// reference tables if their version is behind.
    fn initialize(mut conn: Connection) -> Result<Self> {
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        let applied = migration::apply_pending_migrations(&mut conn)?;
        let reseeded = seed::reseed_if_outdated(&mut conn)?;

        tracing::debug!(applied, reseeded, "Database initialized");

        Ok(Self { conn })
    }

    /// Returns the reference data version stored in the database.
    pub fn seed_version(&self) -> Result<u32> {
        seed::stored_seed_version(&self.conn)
    }

    /// Returns a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
