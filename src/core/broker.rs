use crate::core::error;
use rusqlite::Connection;
use std::sync::Mutex;
use ulid::Ulid;

/// The DB Broker is the single path to the account database.
/// Every operation takes the connection lock for its whole duration, so a
/// check-then-write inside one closure cannot interleave with another caller.
pub struct DbBroker {
    conn: Mutex<Connection>,
    db_id: String,
}

impl DbBroker {
    pub fn new(conn: Connection, db_id: impl Into<String>) -> Self {
        Self {
            conn: Mutex::new(conn),
            db_id: db_id.into(),
        }
    }

    /// Execute a closure with the serialized connection.
    pub fn with_conn<F, R>(&self, op_name: &str, f: F) -> Result<R, error::GuauMiauError>
    where
        F: FnOnce(&Connection) -> Result<R, error::GuauMiauError>,
    {
        let event_id = Ulid::new().to_string();
        let conn = self.conn.lock().map_err(|_| {
            error::GuauMiauError::WorkerError("account store lock poisoned".to_string())
        })?;

        let result = f(&conn);

        match &result {
            Ok(_) => tracing::debug!(
                event_id = %event_id,
                db_id = %self.db_id,
                op = op_name,
                status = "success",
                "broker op"
            ),
            Err(e) if e.is_storage_unavailable() => tracing::warn!(
                event_id = %event_id,
                db_id = %self.db_id,
                op = op_name,
                status = "error",
                error = %e,
                "broker op"
            ),
            Err(e) => tracing::debug!(
                event_id = %event_id,
                db_id = %self.db_id,
                op = op_name,
                status = "rejected",
                error = %e,
                "broker op"
            ),
        }

        result
    }
}
