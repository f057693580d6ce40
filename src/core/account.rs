//! Account records and the pet-list column codec.

use crate::core::error::GuauMiauError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use ulid::Ulid;

/// Pet types offered by the registration screen. Any non-blank type is accepted.
pub const PET_TYPES: [&str; 4] = ["Gato", "Perro", "Ave", "Otro"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Pet {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
        }
    }
}

/// Salted SHA-256 of a password. The plaintext is never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordCredential {
    pub salt: String,
    pub digest: String,
}

impl PasswordCredential {
    pub fn derive(password: &str) -> Self {
        Self::with_salt(Ulid::new().to_string(), password)
    }

    pub fn with_salt(salt: String, password: &str) -> Self {
        let digest = hash_password(&salt, password);
        Self { salt, digest }
    }

    /// Exact-match check: the offered password must hash to the stored digest.
    pub fn matches(&self, password: &str) -> bool {
        hash_password(&self.salt, password) == self.digest
    }
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b"\0");
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub full_name: String,
    /// Unique key. Compared byte for byte, so case matters.
    pub email: String,
    pub phone: Option<String>,
    pub credential: PasswordCredential,
    pub pets: Vec<Pet>,
}

impl UserAccount {
    /// Builds a new account from submitted values. A blank phone is stored as absent.
    pub fn new(
        full_name: impl Into<String>,
        email: impl Into<String>,
        phone: Option<String>,
        password: &str,
        pets: Vec<Pet>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            email: email.into(),
            phone: phone.filter(|p| !p.trim().is_empty()),
            credential: PasswordCredential::derive(password),
            pets,
        }
    }
}

pub fn encode_pets(pets: &[Pet]) -> Result<String, GuauMiauError> {
    Ok(serde_json::to_string(pets)?)
}

pub fn decode_pets(raw: &str) -> Result<Vec<Pet>, GuauMiauError> {
    Ok(serde_json::from_str(raw)?)
}
