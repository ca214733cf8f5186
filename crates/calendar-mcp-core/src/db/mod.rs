//! Calendar store access
//!
//! Opens the Calendar.app SQLite database strictly read-only. Each call site
//! opens its own handle, runs one query and closes it again.

#[cfg(test)]
pub(crate) mod fixtures;
mod queries;

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Error, Result};

/// Calendar tables
pub const CALENDAR_ITEM_TABLE: &str = "CalendarItem";
pub const CALENDAR_TABLE: &str = "Calendar";

/// Read-only handle to the Calendar store
pub struct CalendarStore {
    conn: Connection,
    path: PathBuf,
}

impl CalendarStore {
    /// Open the store configured in `config`
    pub fn open(config: &Config) -> Result<Self> {
        Self::open_at(config.calendar_db_path())
    }

    /// Open the store at an explicit path.
    ///
    /// Fails with [`Error::StoreOpen`] when the file is missing, unreadable,
    /// or not a SQLite database.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Opening calendar store at {:?}", path);

        let store_open = |e: rusqlite::Error| Error::StoreOpen {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(store_open)?;

        // SQLite defers reading the header until the first statement
        conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| {
            row.get::<_, i64>(0)
        })
        .map_err(store_open)?;

        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Path this store was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Close the handle, reporting any error SQLite raises while closing
    pub fn close(self) -> Result<()> {
        debug!("Closing calendar store at {:?}", self.path);
        self.conn.close().map_err(|(_, e)| Error::Database(e))
    }
}

/// Open the store at `path`, run `f`, and close the store on every path.
///
/// A query error takes precedence over a close error.
pub fn with_store<T, F>(path: &Path, f: F) -> Result<T>
where
    F: FnOnce(&CalendarStore) -> Result<T>,
{
    let store = CalendarStore::open_at(path)?;
    let result = f(&store);

    if let Err(e) = store.close() {
        warn!("Failed to close calendar store at {:?}: {}", path, e);
        if result.is_ok() {
            return Err(e);
        }
    }

    result
}
