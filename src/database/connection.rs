//! SQLite database connection management for SecurePass.
//!
//! Provides the [`Database`] struct that wraps a `rusqlite::Connection`
//! and automatically runs schema migrations on open. One `Database` is opened
//! at startup and shared as `Arc<Database>`; consumers never open their own.

use rusqlite::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use super::migrations;

/// Core database wrapper providing SQLite connection management.
///
/// The connection sits behind a `Mutex` so a single handle can be shared
/// between the credential store, the async facade and the RPC server.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Opens (or creates) a SQLite database at the given file path and runs migrations.
    ///
    /// # Errors
    /// Returns `rusqlite::Error` if the connection cannot be established or migrations fail.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path.as_ref())?;
        let db = Self::from_connection(conn)?;
        info!(path = %path.as_ref().display(), "credential database opened");
        Ok(db)
    }

    /// Opens an in-memory SQLite database and runs migrations.
    ///
    /// Useful for testing; the database is discarded when the `Database` is dropped.
    ///
    /// # Errors
    /// Returns `rusqlite::Error` if the connection cannot be established or migrations fail.
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        let db = Self::from_connection(Connection::open_in_memory()?)?;
        debug!("in-memory credential database opened");
        Ok(db)
    }

    fn from_connection(conn: Connection) -> Result<Self, rusqlite::Error> {
        migrations::run_all(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Locks and returns the underlying `rusqlite::Connection`.
    ///
    /// A panic in another holder does not leave the connection in a torn
    /// state (every write is a single statement), so a poisoned lock is recovered.
    pub fn connection(&self) -> MutexGuard<'_, Connection> {
        self.conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Closes the connection, flushing pending writes.
    ///
    /// # Errors
    /// Returns `rusqlite::Error` if SQLite refuses to close (e.g. unfinalized statements).
    pub fn close(self) -> Result<(), rusqlite::Error> {
        let conn = self
            .conn
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        conn.close().map_err(|(_, err)| err)?;
        info!("credential database closed");
        Ok(())
    }
}
