//! Form state for the login and registration screens.
//!
//! State only moves through `apply(state, event) -> state`. Screens wrap these
//! in a `watch` channel so the presentation layer can subscribe.

use crate::core::account::{Pet, UserAccount};
use crate::core::validate::{Field, RegistrationReport};

pub type PetId = u32;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetForm {
    pub id: PetId,
    pub name: String,
    pub kind: String,
    pub name_error: Option<String>,
    pub kind_error: Option<String>,
}

impl PetForm {
    pub fn new(id: PetId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterFormState {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
    pub pets: Vec<PetForm>,
    pub full_name_error: Option<String>,
    pub email_error: Option<String>,
    pub password_error: Option<String>,
    pub confirm_password_error: Option<String>,
    /// Generic, non-field failure (storage trouble).
    pub failure: Option<String>,
    pub busy: bool,
    /// Edge-triggered: set once on success, cleared by `RegistrationHandled`.
    pub registration_success: bool,
    next_pet_id: PetId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterEvent {
    FullNameChanged(String),
    EmailChanged(String),
    /// Ignored unless every character is a digit.
    PhoneChanged(String),
    PasswordChanged(String),
    ConfirmPasswordChanged(String),
    PetAdded,
    PetRemoved(PetId),
    PetNameChanged(PetId, String),
    PetTypeChanged(PetId, String),
    SubmitStarted,
    ValidationFailed(RegistrationReport),
    Registered,
    SubmitFailed(String),
    RegistrationHandled,
}

impl RegisterFormState {
    /// Id the next `PetAdded` will hand out.
    pub fn next_pet_id(&self) -> PetId {
        self.next_pet_id
    }

    pub fn pet(&self, id: PetId) -> Option<&PetForm> {
        self.pets.iter().find(|p| p.id == id)
    }

    pub fn error(&self, field: Field) -> Option<&str> {
        match field {
            Field::FullName => self.full_name_error.as_deref(),
            Field::Email => self.email_error.as_deref(),
            Field::Password => self.password_error.as_deref(),
            Field::ConfirmPassword => self.confirm_password_error.as_deref(),
        }
    }

    pub fn has_errors(&self) -> bool {
        Field::ALL.iter().any(|f| self.error(*f).is_some())
            || self
                .pets
                .iter()
                .any(|p| p.name_error.is_some() || p.kind_error.is_some())
    }

    fn update_pet(&mut self, id: PetId, f: impl FnOnce(&mut PetForm)) {
        if let Some(pet) = self.pets.iter_mut().find(|p| p.id == id) {
            f(pet);
        }
    }

    pub fn apply(mut self, event: RegisterEvent) -> Self {
        match event {
            RegisterEvent::FullNameChanged(v) => {
                self.full_name = v;
                self.full_name_error = None;
            }
            RegisterEvent::EmailChanged(v) => {
                self.email = v;
                self.email_error = None;
            }
            RegisterEvent::PhoneChanged(v) => {
                if v.chars().all(|c| c.is_ascii_digit()) {
                    self.phone = v;
                }
            }
            RegisterEvent::PasswordChanged(v) => {
                self.password = v;
                self.password_error = None;
            }
            RegisterEvent::ConfirmPasswordChanged(v) => {
                self.confirm_password = v;
                self.confirm_password_error = None;
            }
            RegisterEvent::PetAdded => {
                self.pets.push(PetForm::new(self.next_pet_id));
                self.next_pet_id += 1;
            }
            RegisterEvent::PetRemoved(id) => {
                self.pets.retain(|p| p.id != id);
            }
            RegisterEvent::PetNameChanged(id, name) => self.update_pet(id, |p| {
                p.name = name;
                p.name_error = None;
            }),
            RegisterEvent::PetTypeChanged(id, kind) => self.update_pet(id, |p| {
                p.kind = kind;
                p.kind_error = None;
            }),
            RegisterEvent::SubmitStarted => {
                self.busy = true;
                self.failure = None;
                self.registration_success = false;
            }
            RegisterEvent::ValidationFailed(report) => {
                let msg = |f: Field| report.error(f).map(|e| e.to_string());
                self.full_name_error = msg(Field::FullName);
                self.email_error = msg(Field::Email);
                self.password_error = msg(Field::Password);
                self.confirm_password_error = msg(Field::ConfirmPassword);
                for pet in &mut self.pets {
                    let errs = report.pet(pet.id);
                    pet.name_error = errs.and_then(|e| e.name).map(|e| e.to_string());
                    pet.kind_error = errs.and_then(|e| e.kind).map(|e| e.to_string());
                }
                self.busy = false;
                self.registration_success = false;
            }
            RegisterEvent::Registered => {
                self.busy = false;
                self.registration_success = true;
            }
            RegisterEvent::SubmitFailed(msg) => {
                self.busy = false;
                self.failure = Some(msg);
                self.registration_success = false;
            }
            RegisterEvent::RegistrationHandled => {
                // The form does not outlive a successful registration. Pet ids
                // keep counting so none is ever handed out twice.
                if self.registration_success {
                    self = Self {
                        next_pet_id: self.next_pet_id,
                        ..Self::default()
                    };
                }
            }
        }
        self
    }

    /// Account to persist for this submission.
    pub fn to_account(&self) -> UserAccount {
        UserAccount::new(
            self.full_name.clone(),
            self.email.clone(),
            Some(self.phone.clone()),
            &self.password,
            self.pets
                .iter()
                .map(|p| Pet::new(p.name.clone(), p.kind.clone()))
                .collect(),
        )
    }
}

pub const LOGIN_LOADING_MESSAGE: &str = "Iniciando sesión...";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginFormState {
    pub email: String,
    pub password: String,
    pub error: Option<String>,
    pub busy: bool,
    /// Edge-triggered: set once on success, cleared by `LoginHandled`.
    pub login_success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginEvent {
    EmailChanged(String),
    PasswordChanged(String),
    SubmitStarted,
    LoginSucceeded,
    LoginFailed(String),
    LoginHandled,
}

impl LoginFormState {
    /// Text shown in place of the login button while the lookup runs.
    pub fn status_message(&self) -> Option<&'static str> {
        self.busy.then_some(LOGIN_LOADING_MESSAGE)
    }

    pub fn apply(mut self, event: LoginEvent) -> Self {
        match event {
            LoginEvent::EmailChanged(v) => {
                self.email = v;
                self.error = None;
            }
            LoginEvent::PasswordChanged(v) => {
                self.password = v;
                self.error = None;
            }
            LoginEvent::SubmitStarted => {
                self.busy = true;
                self.error = None;
            }
            LoginEvent::LoginSucceeded => {
                self.busy = false;
                self.login_success = true;
            }
            LoginEvent::LoginFailed(msg) => {
                self.busy = false;
                self.error = Some(msg);
                self.login_success = false;
            }
            LoginEvent::LoginHandled => {
                self.login_success = false;
            }
        }
        self
    }
}
