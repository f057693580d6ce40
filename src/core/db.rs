use crate::core::error;
use crate::core::schemas;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};

pub fn db_connect(db_path: &str) -> Result<Connection, error::GuauMiauError> {
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(std::time::Duration::from_secs(5))
        .map_err(error::GuauMiauError::RusqliteError)?;
    conn.query_row("PRAGMA journal_mode=WAL;", [], |_| Ok(()))
        .map_err(error::GuauMiauError::RusqliteError)?;
    Ok(conn)
}

pub fn accounts_db_path(root: &Path) -> PathBuf {
    root.join(schemas::ACCOUNTS_DB_NAME)
}

/// Opens (creating if needed) the account database at `db_path` and brings its
/// schema up to the compiled version.
pub fn initialize_accounts_db(db_path: &Path) -> Result<Connection, error::GuauMiauError> {
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent).map_err(error::GuauMiauError::IoError)?;
    }
    let conn = db_connect(&db_path.to_string_lossy())?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// Schema policy is destructive reset: a database stamped with any other
/// `user_version` loses its `users` table. Fresh files report version 0.
pub fn ensure_schema(conn: &Connection) -> Result<(), error::GuauMiauError> {
    let stored: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if stored != schemas::ACCOUNTS_SCHEMA_VERSION {
        if stored != 0 {
            tracing::warn!(
                stored,
                expected = schemas::ACCOUNTS_SCHEMA_VERSION,
                "account schema changed, discarding stored accounts"
            );
        }
        conn.execute(schemas::ACCOUNTS_DB_DROP_USERS, [])?;
        conn.execute(schemas::ACCOUNTS_DB_SCHEMA_USERS, [])?;
        // PRAGMA does not take bound parameters.
        conn.execute_batch(&format!(
            "PRAGMA user_version = {};",
            schemas::ACCOUNTS_SCHEMA_VERSION
        ))
        .map_err(|e| error::GuauMiauError::DatabaseInitializationError(e.to_string()))?;
    } else {
        conn.execute(schemas::ACCOUNTS_DB_SCHEMA_USERS, [])?;
    }

    Ok(())
}
