use crate::core::account::UserAccount;
use crate::core::accounts::AccountStore;
use crate::core::error::GuauMiauError;
use crate::core::form::{PetId, RegisterEvent, RegisterFormState};
use crate::core::validate::{RegistrationReport, validate_registration};
use crate::core::worker::Dispatcher;
use crate::screens::STORAGE_FAILURE_MESSAGE;
use std::sync::Arc;
use tokio::sync::watch;

pub const SUCCESS_MESSAGE: &str = "Registro exitoso";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Registered(UserAccount),
    Rejected(RegistrationReport),
    Failed(String),
    /// A submit was already in flight.
    Ignored,
}

enum Attempt {
    Registered(UserAccount),
    Rejected(RegistrationReport),
}

pub struct RegisterScreen {
    state: watch::Sender<RegisterFormState>,
    store: Arc<dyn AccountStore>,
    dispatcher: Dispatcher,
}

impl RegisterScreen {
    pub fn new(store: Arc<dyn AccountStore>, dispatcher: Dispatcher) -> Self {
        let (state, _) = watch::channel(RegisterFormState::default());
        Self {
            state,
            store,
            dispatcher,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<RegisterFormState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> RegisterFormState {
        self.state.borrow().clone()
    }

    pub fn dispatch(&self, event: RegisterEvent) {
        self.state
            .send_modify(|s| *s = std::mem::take(s).apply(event));
    }

    pub fn on_full_name_change(&self, v: impl Into<String>) {
        self.dispatch(RegisterEvent::FullNameChanged(v.into()));
    }

    pub fn on_email_change(&self, v: impl Into<String>) {
        self.dispatch(RegisterEvent::EmailChanged(v.into()));
    }

    pub fn on_phone_change(&self, v: impl Into<String>) {
        self.dispatch(RegisterEvent::PhoneChanged(v.into()));
    }

    pub fn on_password_change(&self, v: impl Into<String>) {
        self.dispatch(RegisterEvent::PasswordChanged(v.into()));
    }

    pub fn on_confirm_password_change(&self, v: impl Into<String>) {
        self.dispatch(RegisterEvent::ConfirmPasswordChanged(v.into()));
    }

    /// Appends an empty pet sub-form and returns its id.
    pub fn add_pet(&self) -> PetId {
        let mut id = 0;
        self.state.send_modify(|s| {
            id = s.next_pet_id();
            *s = std::mem::take(s).apply(RegisterEvent::PetAdded);
        });
        id
    }

    pub fn remove_pet(&self, id: PetId) {
        self.dispatch(RegisterEvent::PetRemoved(id));
    }

    pub fn on_pet_name_change(&self, id: PetId, v: impl Into<String>) {
        self.dispatch(RegisterEvent::PetNameChanged(id, v.into()));
    }

    pub fn on_pet_type_change(&self, id: PetId, v: impl Into<String>) {
        self.dispatch(RegisterEvent::PetTypeChanged(id, v.into()));
    }

    pub fn on_registration_handled(&self) {
        self.dispatch(RegisterEvent::RegistrationHandled);
    }

    /// Validates the current form and, if it passes, stores the account.
    ///
    /// Both the duplicate check and the insert run on the blocking pool. The
    /// insert has the final say on duplicates: losing a race to another
    /// registration shows up as the email's duplicate error.
    pub async fn submit(&self) -> SubmitOutcome {
        let started = self.state.send_if_modified(|s| {
            if s.busy {
                return false;
            }
            *s = std::mem::take(s).apply(RegisterEvent::SubmitStarted);
            true
        });
        if !started {
            tracing::debug!("registration submit ignored, one already in flight");
            return SubmitOutcome::Ignored;
        }

        let form = self.snapshot();
        let store = self.store.clone();
        let attempt = self
            .dispatcher
            .run("register.submit", move || {
                let mut report = validate_registration(&form, |email| store.exists_by_email(email))?;
                if !report.valid {
                    return Ok(Attempt::Rejected(report));
                }
                let account = form.to_account();
                match store.insert(&account) {
                    Ok(()) => Ok(Attempt::Registered(account)),
                    Err(GuauMiauError::AlreadyExists(_)) => {
                        report.mark_email_taken();
                        Ok(Attempt::Rejected(report))
                    }
                    Err(e) => Err(e),
                }
            })
            .await;

        match attempt {
            Ok(Attempt::Registered(account)) => {
                tracing::info!(email = %account.email, pets = account.pets.len(), "account registered");
                self.dispatch(RegisterEvent::Registered);
                SubmitOutcome::Registered(account)
            }
            Ok(Attempt::Rejected(report)) => {
                tracing::debug!(errors = report.field_errors.len(), "registration rejected");
                self.dispatch(RegisterEvent::ValidationFailed(report.clone()));
                SubmitOutcome::Rejected(report)
            }
            Err(e) => {
                tracing::warn!(error = %e, "registration failed");
                self.dispatch(RegisterEvent::SubmitFailed(STORAGE_FAILURE_MESSAGE.to_string()));
                SubmitOutcome::Failed(STORAGE_FAILURE_MESSAGE.to_string())
            }
        }
    }
}
