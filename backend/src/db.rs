//! SQLite persistence for batches and records.
//!
//! One connection is shared behind a mutex and every call runs on actix's blocking
//! pool, so handlers `await` store work without stalling the async workers. Locking
//! and transaction isolation beyond that are left to SQLite.

use crate::error::AppError;
use actix_web::web;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

const SCHEMA: &str = "
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS upload_batches (
    id         TEXT PRIMARY KEY,
    name       TEXT NOT NULL,
    filename   TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS audit_records (
    seq             INTEGER PRIMARY KEY AUTOINCREMENT,
    id              TEXT NOT NULL UNIQUE,
    upload_batch_id TEXT NOT NULL REFERENCES upload_batches(id),
    data            TEXT NOT NULL,
    created_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_audit_records_batch
    ON audit_records (upload_batch_id, created_at);
";

/// Creates the tables if they do not exist yet and turns on foreign key enforcement.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)
}

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: &str) -> Result<Self, AppError> {
        Self::from_connection(Connection::open(path)?)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, AppError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, AppError> {
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Runs `f` with exclusive access to the connection on the blocking thread pool.
    pub async fn run<F, T>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut Connection) -> Result<T, AppError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        web::block(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| AppError::Internal("database connection lock poisoned".into()))?;
            f(&mut guard)
        })
        .await?
    }
}


/// In-memory connection with the schema applied, for unit tests of store functions.
#[cfg(test)]
pub fn test_connection() -> Connection {
    let conn = Connection::open_in_memory().expect("in-memory database");
    init_schema(&conn).expect("schema");
    conn
}
