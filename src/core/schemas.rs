//! Database schema definitions for the account store.
//!
//! One SQLite file holds one table. Pets are not a relation of their own: the
//! owner's pet list lives in the `pets` column as a JSON array.

pub const ACCOUNTS_DB_NAME: &str = "guau_miau.db";

/// Bumped on every incompatible change to `ACCOUNTS_DB_SCHEMA_USERS`.
/// A stored database with a different `user_version` is wiped and recreated.
pub const ACCOUNTS_SCHEMA_VERSION: i64 = 1;

pub const ACCOUNTS_DB_SCHEMA_USERS: &str = "
    CREATE TABLE IF NOT EXISTS users (
        email TEXT PRIMARY KEY NOT NULL,
        full_name TEXT NOT NULL,
        phone TEXT,
        password_salt TEXT NOT NULL,
        password_digest TEXT NOT NULL,
        pets TEXT NOT NULL -- JSON array of {name, type}
    )
";

pub const ACCOUNTS_DB_DROP_USERS: &str = "DROP TABLE IF EXISTS users";
