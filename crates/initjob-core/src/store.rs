//! Metadata store holding the registered package indexes.
//!
//! The job only ever writes index registrations and reads back the list of
//! index URLs; everything else in the store belongs to other services.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags, params};
use thiserror::Error;

use crate::types::{IndexRegistration, IndexUrl};

/// Failure talking to the metadata store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The directory holding the database could not be created.
    #[error("Failed to create {}: {source}", path.display())]
    CreateDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A stored URL no longer parses as an index URL.
    #[error("Invalid index URL in store: {0}")]
    InvalidUrl(String),
}

/// The subset of the metadata store API this job relies on.
pub trait MetadataStore {
    /// Create the schema. Safe to call on an already initialized store.
    fn initialize_schema(&self) -> Result<(), StoreError>;

    /// Record a package index. Registering the same URL twice is allowed.
    fn register_index(&self, registration: &IndexRegistration) -> Result<(), StoreError>;

    /// Distinct registered index URLs, in the order they were first registered.
    fn index_urls(&self) -> Result<Vec<IndexUrl>, StoreError>;
}

/// Metadata store backed by a `SQLite` database.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the
    /// database cannot be opened.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Open an existing database without write access (used for dry runs).
    ///
    /// # Errors
    ///
    /// Returns an error if the database does not exist or cannot be opened.
    pub fn open_read_only(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    /// In-memory store (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if `SQLite` cannot allocate the database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }
}

impl MetadataStore for SqliteStore {
    fn initialize_schema(&self) -> Result<(), StoreError> {
        tracing::info!("Initializing metadata store schema");
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS python_package_index (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                url TEXT NOT NULL,
                warehouse_api_url TEXT,
                verify_ssl INTEGER NOT NULL,
                warehouse INTEGER NOT NULL,
                registered_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_python_package_index_url
                ON python_package_index(url);
            ",
        )?;
        Ok(())
    }

    fn register_index(&self, registration: &IndexRegistration) -> Result<(), StoreError> {
        tracing::debug!("Registering index {}", registration.url);
        self.conn.execute(
            "INSERT INTO python_package_index
                (url, warehouse_api_url, verify_ssl, warehouse, registered_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                registration.url.as_str(),
                registration.warehouse_api_url,
                registration.verify_ssl,
                registration.warehouse,
                chrono::Utc::now().timestamp(),
            ],
        )?;
        Ok(())
    }

    fn index_urls(&self) -> Result<Vec<IndexUrl>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT url FROM python_package_index GROUP BY url ORDER BY MIN(id)",
        )?;
        let urls = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut result = Vec::new();
        for url in urls {
            let url = url?;
            result.push(IndexUrl::new(&url).map_err(|_| StoreError::InvalidUrl(url))?);
        }
        Ok(result)
    }
}
