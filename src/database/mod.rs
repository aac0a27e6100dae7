//! SecurePass database layer.
//!
//! Provides SQLite connection management, schema migrations and the
//! timestamp conversion used by the `passwords` table.
//!
//! # Usage
//!
//! ```no_run
//! use securepass::database::Database;
//!
//! // Open a persistent database
//! let db = Database::open("password_database.db").expect("failed to open database");
//!
//! // Or use an in-memory database for testing
//! let db = Database::open_in_memory().expect("failed to open in-memory database");
//!
//! // Lock the underlying connection for queries
//! let conn = db.connection();
//! ```

pub mod connection;
pub mod migrations;
pub mod timestamp;

pub use connection::Database;
pub use timestamp::{MonotonicClock, StoredTimestamp};
