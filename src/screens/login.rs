use crate::core::account::UserAccount;
use crate::core::accounts::AccountStore;
use crate::core::form::{LoginEvent, LoginFormState};
use crate::core::validate::check_login;
use crate::core::worker::Dispatcher;
use crate::screens::STORAGE_FAILURE_MESSAGE;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    SignedIn(UserAccount),
    /// Unknown email or wrong password; the message does not say which.
    Rejected(String),
    Failed(String),
    Ignored,
}

pub struct LoginScreen {
    state: watch::Sender<LoginFormState>,
    store: Arc<dyn AccountStore>,
    dispatcher: Dispatcher,
}

impl LoginScreen {
    pub fn new(store: Arc<dyn AccountStore>, dispatcher: Dispatcher) -> Self {
        let (state, _) = watch::channel(LoginFormState::default());
        Self {
            state,
            store,
            dispatcher,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<LoginFormState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> LoginFormState {
        self.state.borrow().clone()
    }

    pub fn dispatch(&self, event: LoginEvent) {
        self.state
            .send_modify(|s| *s = std::mem::take(s).apply(event));
    }

    pub fn on_email_change(&self, v: impl Into<String>) {
        self.dispatch(LoginEvent::EmailChanged(v.into()));
    }

    pub fn on_password_change(&self, v: impl Into<String>) {
        self.dispatch(LoginEvent::PasswordChanged(v.into()));
    }

    pub fn on_login_handled(&self) {
        self.dispatch(LoginEvent::LoginHandled);
    }

    /// Looks the credentials up as typed. No format checks happen here.
    pub async fn submit(&self) -> LoginOutcome {
        let started = self.state.send_if_modified(|s| {
            if s.busy {
                return false;
            }
            *s = std::mem::take(s).apply(LoginEvent::SubmitStarted);
            true
        });
        if !started {
            return LoginOutcome::Ignored;
        }

        let LoginFormState {
            email, password, ..
        } = self.snapshot();
        let store = self.store.clone();
        let found = self
            .dispatcher
            .run("login.submit", move || {
                store.find_by_credentials(&email, &password)
            })
            .await;

        match found.map(check_login) {
            Ok(Ok(account)) => {
                tracing::info!(email = %account.email, "login succeeded");
                self.dispatch(LoginEvent::LoginSucceeded);
                LoginOutcome::SignedIn(account)
            }
            Ok(Err(rejected)) => {
                tracing::info!("login rejected");
                let msg = rejected.to_string();
                self.dispatch(LoginEvent::LoginFailed(msg.clone()));
                LoginOutcome::Rejected(msg)
            }
            Err(e) => {
                tracing::warn!(error = %e, "login lookup failed");
                self.dispatch(LoginEvent::LoginFailed(STORAGE_FAILURE_MESSAGE.to_string()));
                LoginOutcome::Failed(STORAGE_FAILURE_MESSAGE.to_string())
            }
        }
    }
}
