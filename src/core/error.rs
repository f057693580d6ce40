use rusqlite;
use std::env;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GuauMiauError {
    #[error("SQLite error: {0}")]
    RusqliteError(#[from] rusqlite::Error),
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("Pet list codec error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Failed to initialize database: {0}")]
    DatabaseInitializationError(String),
    #[error("Environment variable error: {0}")]
    EnvVarError(#[from] env::VarError),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Account already exists: {0}")]
    AlreadyExists(String),
    #[error("Worker error: {0}")]
    WorkerError(String),
}

impl GuauMiauError {
    /// True when the failure came from the storage medium rather than from a
    /// domain outcome. Callers show a generic failure for these and never
    /// attribute them to a form field.
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(
            self,
            GuauMiauError::RusqliteError(_)
                | GuauMiauError::IoError(_)
                | GuauMiauError::SerializationError(_)
                | GuauMiauError::DatabaseInitializationError(_)
                | GuauMiauError::WorkerError(_)
        )
    }
}
