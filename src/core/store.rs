//! Store handle for the app's on-device state.
//!
//! The handle is built once by the entry point and passed to whatever needs
//! the account database. There is no process-global instance.

use crate::core::config::AppConfig;
use crate::core::db;
use std::path::PathBuf;

/// Store handle representing a GUAU&MIAU data directory.
#[derive(Debug, Clone)]
pub struct Store {
    /// Directory holding the account database and the optional config file
    pub root: PathBuf,
    db_file: Option<String>,
}

impl Store {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            db_file: None,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            root: config.data_dir.clone(),
            db_file: config.db_file.clone(),
        }
    }

    pub fn db_path(&self) -> PathBuf {
        match &self.db_file {
            Some(name) => self.root.join(name),
            None => db::accounts_db_path(&self.root),
        }
    }
}
