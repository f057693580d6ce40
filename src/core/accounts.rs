//! The account store: persistence for user accounts keyed by email.
//!
//! Absence is never an error here. `find_by_credentials` answers `None` for an
//! unknown email and for a wrong password alike, and `insert` reports a taken
//! email as [`GuauMiauError::AlreadyExists`]. Everything else coming out of
//! these calls is a storage failure (see [`GuauMiauError::is_storage_unavailable`]).

use crate::core::account::{PasswordCredential, UserAccount, decode_pets, encode_pets};
use crate::core::broker::DbBroker;
use crate::core::db;
use crate::core::error::GuauMiauError;
use crate::core::schemas;
use crate::core::store::Store;
use rusqlite::{Connection, OptionalExtension, ffi, params};

pub trait AccountStore: Send + Sync {
    /// Inserts a new account. Fails with `AlreadyExists` if the email is taken;
    /// an existing row is never overwritten.
    fn insert(&self, account: &UserAccount) -> Result<(), GuauMiauError>;

    fn find_by_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<UserAccount>, GuauMiauError>;

    fn exists_by_email(&self, email: &str) -> Result<bool, GuauMiauError>;
}

/// Raw `users` row before the pet column is decoded.
struct UserRow {
    email: String,
    full_name: String,
    phone: Option<String>,
    password_salt: String,
    password_digest: String,
    pets: String,
}

impl UserRow {
    fn credential(&self) -> PasswordCredential {
        PasswordCredential {
            salt: self.password_salt.clone(),
            digest: self.password_digest.clone(),
        }
    }

    fn into_account(self) -> Result<UserAccount, GuauMiauError> {
        let credential = self.credential();
        Ok(UserAccount {
            full_name: self.full_name,
            email: self.email,
            phone: self.phone,
            credential,
            pets: decode_pets(&self.pets)?,
        })
    }
}

/// Only the email primary key maps to `AlreadyExists`; any other constraint
/// failure is a storage problem.
fn insert_error(err: rusqlite::Error, email: &str) -> GuauMiauError {
    match err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
        {
            GuauMiauError::AlreadyExists(email.to_string())
        }
        e => e.into(),
    }
}

pub struct SqliteAccountStore {
    broker: DbBroker,
}

impl SqliteAccountStore {
    pub fn open(store: &Store) -> Result<Self, GuauMiauError> {
        let conn = db::initialize_accounts_db(&store.db_path())?;
        tracing::debug!(path = %store.db_path().display(), "account store opened");
        Ok(Self {
            broker: DbBroker::new(conn, schemas::ACCOUNTS_DB_NAME),
        })
    }

    /// Non-persistent store, used by tests and dry runs.
    pub fn open_in_memory() -> Result<Self, GuauMiauError> {
        let conn = Connection::open_in_memory()?;
        db::ensure_schema(&conn)?;
        Ok(Self {
            broker: DbBroker::new(conn, ":memory:"),
        })
    }

    fn find_row(conn: &Connection, email: &str) -> Result<Option<UserRow>, GuauMiauError> {
        let row = conn
            .query_row(
                "SELECT email, full_name, phone, password_salt, password_digest, pets
                 FROM users WHERE email = ?1 LIMIT 1",
                params![email],
                |row| {
                    Ok(UserRow {
                        email: row.get(0)?,
                        full_name: row.get(1)?,
                        phone: row.get(2)?,
                        password_salt: row.get(3)?,
                        password_digest: row.get(4)?,
                        pets: row.get(5)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }
}

impl AccountStore for SqliteAccountStore {
    fn insert(&self, account: &UserAccount) -> Result<(), GuauMiauError> {
        let pets = encode_pets(&account.pets)?;
        self.broker.with_conn("accounts.insert", |conn| {
            let res = conn.execute(
                "INSERT INTO users(email, full_name, phone, password_salt, password_digest, pets)
                 VALUES(?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    account.email,
                    account.full_name,
                    account.phone,
                    account.credential.salt,
                    account.credential.digest,
                    pets
                ],
            );
            res.map(|_| ()).map_err(|e| insert_error(e, &account.email))
        })
    }

    fn find_by_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<UserAccount>, GuauMiauError> {
        let row = self
            .broker
            .with_conn("accounts.find_by_credentials", |conn| {
                Self::find_row(conn, email)
            })?;

        match row {
            Some(row) if row.credential().matches(password) => {
                Ok(Some(row.into_account()?))
            }
            _ => Ok(None),
        }
    }

    fn exists_by_email(&self, email: &str) -> Result<bool, GuauMiauError> {
        self.broker.with_conn("accounts.exists_by_email", |conn| {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1)",
                params![email],
                |row| row.get(0),
            )?;
            Ok(exists)
        })
    }
}
