use thiserror::Error;

/// Errors produced by the repository layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Anything SQLite itself reports.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A lookup by id (or the local-user slot) matched nothing.
    #[error("Record not found")]
    NotFound,

    /// One of the JSON columns (friends, members, message body) failed to
    /// encode or decode.
    #[error("JSON column error: {0}")]
    Json(#[from] serde_json::Error),

    /// A migration could not be applied; the database is left at its
    /// previous `user_version`.
    #[error("Migration error: {0}")]
    Migration(String),

    /// No platform data directory could be determined for the default
    /// database location.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Creating the data directory (or similar filesystem work) failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
