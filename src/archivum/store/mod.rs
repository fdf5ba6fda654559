//! # Storage Layer
//!
//! All persistent state lives in one SQLite file. Keeping it to a single file
//! is what makes whole-database snapshots possible: a save point is a plain
//! file copy and an undo is a rename over the live file.
//!
//! ## Storage Format
//!
//! ```text
//! data.db
//! ├── meta       # key/value integers (the version stamp lives here)
//! ├── archives   # one row per archive name
//! └── sources    # one row per uploaded file, unique per (archive, filename)
//! ```
//!
//! The journal mode is forced to `DELETE` so that committed state never sits
//! in a side file (`-wal`) that a copy would miss.
//!
//! ## Handles and Transactions
//!
//! [`SqliteStore`] owns the connection. Row-level helpers in [`sqlite`] take
//! a plain `&Connection`, so the same code runs against the store directly or
//! inside a [`rusqlite::Transaction`] opened by [`SqliteStore::transaction`].
//!
//! Nothing outside the coordinator keeps a `SqliteStore` around: an undo
//! replaces the file underneath it and reopens the handle.

pub mod sqlite;

pub use sqlite::SqliteStore;
