//! Shared SQLite handle for the host and its extensions.
//!
//! # Responsibility
//! - Open and configure the single database connection the host owns.
//! - Serialize access to it and run closures inside transactions.
//!
//! # Invariants
//! - Returned handles have `foreign_keys=ON`.
//! - A transaction closure that fails rolls back everything it did.

use parking_lot::Mutex;
use rusqlite::{Connection, Transaction};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

mod open;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },
    Sqlite(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { path, source } => {
                write!(f, "failed to open database `{}`: {source}", path.display())
            }
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } => Some(source),
            Self::Sqlite(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// The host's one database connection.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Opens (or creates) a database file.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        open::open_file(path.as_ref()).map(Self::from_connection)
    }

    pub fn open_in_memory() -> DbResult<Self> {
        open::open_memory().map(Self::from_connection)
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Runs `f` inside one transaction, committing only when it succeeds.
    pub fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        E: From<rusqlite::Error>,
        F: FnOnce(&Transaction<'_>) -> Result<T, E>,
    {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    /// Runs `f` with exclusive access to the raw connection.
    pub fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> T) -> T {
        let conn = self.conn.lock();
        f(&conn)
    }
}

#[cfg(test)]
mod tests {
    use super::{Database, DbError};

    #[test]
    fn failed_transaction_rolls_back() {
        let db = Database::open_in_memory().expect("open");
        db.with_connection(|conn| conn.execute_batch("CREATE TABLE kv (k TEXT, v TEXT);"))
            .expect("create table");

        let result: Result<(), DbError> = db.transaction(|tx| {
            tx.execute("INSERT INTO kv (k, v) VALUES ('a', 'b');", [])?;
            tx.execute("INSERT INTO missing (k) VALUES ('x');", [])?;
            Ok(())
        });
        assert!(result.is_err());

        let rows: i64 = db
            .with_connection(|conn| conn.query_row("SELECT COUNT(*) FROM kv;", [], |row| row.get(0)))
            .expect("count");
        assert_eq!(rows, 0);
    }

    #[test]
    fn foreign_keys_are_enabled() {
        let db = Database::open_in_memory().expect("open");
        let enabled: i64 = db
            .with_connection(|conn| conn.query_row("PRAGMA foreign_keys;", [], |row| row.get(0)))
            .expect("pragma");
        assert_eq!(enabled, 1);
    }
}
