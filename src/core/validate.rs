//! Registration and login rules.
//!
//! Within one field the first failing rule wins. Across fields nothing
//! short-circuits: every call evaluates every field and every pet so the
//! screen can show all problems at once.

use crate::core::account::UserAccount;
use crate::core::form::{PetForm, PetId, RegisterFormState};
use regex::Regex;
use rustc_hash::FxHashMap;
use std::sync::LazyLock;
use thiserror::Error;

pub const MAX_NAME_LEN: usize = 50;
pub const MIN_PASSWORD_LEN: usize = 8;
pub const REQUIRED_DOMAIN: &str = "@duoc.cl";
pub const PASSWORD_SPECIALS: [char; 4] = ['@', '#', '$', '%'];

static FULL_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-ZñÑáéíóúÁÉÍÓÚüÜ ]+$").unwrap());

// `\d` is Unicode decimal digits only; fractions and superscripts don't count.
static DIGIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d").unwrap());

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9+._%\-]{1,256}@[a-zA-Z0-9][a-zA-Z0-9\-]{0,64}(\.[a-zA-Z0-9][a-zA-Z0-9\-]{0,25})+$",
    )
    .unwrap()
});

/// A user-correctable problem with one input. `Display` is the text shown
/// under the field.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    #[error("No puede estar vacío")]
    Blank,
    #[error("Solo letras y espacios")]
    NameFormat,
    #[error("Máximo 50 caracteres")]
    TooLong,
    #[error("Formato de correo inválido")]
    EmailFormat,
    #[error("Solo se aceptan correos @duoc.cl")]
    EmailDomain,
    #[error("Este correo ya está registrado")]
    EmailTaken,
    #[error("Mínimo 8 caracteres")]
    PasswordTooShort,
    #[error("Debe contener al menos una mayúscula")]
    MissingUppercase,
    #[error("Debe contener al menos una minúscula")]
    MissingLowercase,
    #[error("Debe contener al menos un número")]
    MissingDigit,
    #[error("Debe contener un carácter especial (@#$% )")]
    MissingSpecial,
    #[error("Las contraseñas no coinciden")]
    PasswordMismatch,
    #[error("Obligatorio")]
    PetRequired,
}

/// Returned for every failed login, whatever the cause. Which half of the
/// credentials was wrong is not revealed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Usuario o contraseña incorrectos.")]
pub struct InvalidCredentials;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    FullName,
    Email,
    Password,
    ConfirmPassword,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::FullName,
        Field::Email,
        Field::Password,
        Field::ConfirmPassword,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::FullName => "Nombre Completo",
            Field::Email => "Correo Electrónico",
            Field::Password => "Contraseña",
            Field::ConfirmPassword => "Confirmar Contraseña",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PetErrors {
    pub id: PetId,
    pub name: Option<FieldError>,
    pub kind: Option<FieldError>,
}

impl PetErrors {
    pub fn is_clean(&self) -> bool {
        self.name.is_none() && self.kind.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationReport {
    pub valid: bool,
    pub field_errors: FxHashMap<Field, FieldError>,
    /// One entry per pet, in form order.
    pub pet_errors: Vec<PetErrors>,
}

impl RegistrationReport {
    fn from_parts(field_errors: FxHashMap<Field, FieldError>, pet_errors: Vec<PetErrors>) -> Self {
        let valid = field_errors.is_empty() && pet_errors.iter().all(PetErrors::is_clean);
        Self {
            valid,
            field_errors,
            pet_errors,
        }
    }

    pub fn error(&self, field: Field) -> Option<FieldError> {
        self.field_errors.get(&field).copied()
    }

    pub fn pet(&self, id: PetId) -> Option<&PetErrors> {
        self.pet_errors.iter().find(|p| p.id == id)
    }

    /// Records a lost insert race: the email was free when validated but
    /// taken by the time the account was written.
    pub fn mark_email_taken(&mut self) {
        self.field_errors.insert(Field::Email, FieldError::EmailTaken);
        self.valid = false;
    }
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

pub fn check_full_name(name: &str) -> Option<FieldError> {
    if is_blank(name) {
        Some(FieldError::Blank)
    } else if !FULL_NAME_RE.is_match(name) {
        Some(FieldError::NameFormat)
    } else if char_len(name) > MAX_NAME_LEN {
        Some(FieldError::TooLong)
    } else {
        None
    }
}

/// Shape and domain only; the duplicate check needs the store.
pub fn check_email_shape(email: &str) -> Option<FieldError> {
    if is_blank(email) {
        Some(FieldError::Blank)
    } else if !EMAIL_RE.is_match(email) {
        Some(FieldError::EmailFormat)
    } else if !email.ends_with(REQUIRED_DOMAIN) {
        Some(FieldError::EmailDomain)
    } else {
        None
    }
}

pub fn check_password(password: &str) -> Option<FieldError> {
    if char_len(password) < MIN_PASSWORD_LEN {
        Some(FieldError::PasswordTooShort)
    } else if !password.chars().any(char::is_uppercase) {
        Some(FieldError::MissingUppercase)
    } else if !password.chars().any(char::is_lowercase) {
        Some(FieldError::MissingLowercase)
    } else if !DIGIT_RE.is_match(password) {
        Some(FieldError::MissingDigit)
    } else if !password.contains(PASSWORD_SPECIALS) {
        Some(FieldError::MissingSpecial)
    } else {
        None
    }
}

pub fn check_confirm_password(password: &str, confirm: &str) -> Option<FieldError> {
    (password != confirm).then_some(FieldError::PasswordMismatch)
}

pub fn check_pet(pet: &PetForm) -> PetErrors {
    let name = if is_blank(&pet.name) {
        Some(FieldError::PetRequired)
    } else if char_len(&pet.name) > MAX_NAME_LEN {
        Some(FieldError::TooLong)
    } else {
        None
    };
    let kind = is_blank(&pet.kind).then_some(FieldError::PetRequired);
    PetErrors {
        id: pet.id,
        name,
        kind,
    }
}

/// Validates a form snapshot.
///
/// `is_registered` is consulted only for an email that already passed the
/// shape and domain checks. Its error, if any, aborts validation: a storage
/// failure is not a field error.
pub fn validate_registration<E>(
    form: &RegisterFormState,
    is_registered: impl FnOnce(&str) -> Result<bool, E>,
) -> Result<RegistrationReport, E> {
    let mut field_errors = FxHashMap::default();

    if let Some(e) = check_full_name(&form.full_name) {
        field_errors.insert(Field::FullName, e);
    }

    let email_error = match check_email_shape(&form.email) {
        Some(e) => Some(e),
        None => is_registered(&form.email)?.then_some(FieldError::EmailTaken),
    };
    if let Some(e) = email_error {
        field_errors.insert(Field::Email, e);
    }

    if let Some(e) = check_password(&form.password) {
        field_errors.insert(Field::Password, e);
    }
    if let Some(e) = check_confirm_password(&form.password, &form.confirm_password) {
        field_errors.insert(Field::ConfirmPassword, e);
    }

    let pet_errors = form.pets.iter().map(check_pet).collect();

    Ok(RegistrationReport::from_parts(field_errors, pet_errors))
}

/// Turns a credential lookup into a login decision.
pub fn check_login(found: Option<UserAccount>) -> Result<UserAccount, InvalidCredentials> {
    found.ok_or(InvalidCredentials)
}
