//! Screen view-models: login, registration and the main (welcome) screen.
//!
//! Each screen owns a `watch` channel of its form state and talks to the core
//! only through [`AccountStore`] calls run on the [`Dispatcher`].

pub mod login;
pub mod main_screen;
pub mod register;

use crate::core::accounts::AccountStore;
use crate::core::account::UserAccount;
use crate::core::worker::Dispatcher;
use std::sync::Arc;

/// Shown for storage failures. Never attached to a field.
pub const STORAGE_FAILURE_MESSAGE: &str = "No se pudo acceder a los datos. Intenta nuevamente.";

/// Shared dependencies handed to every screen. Built once by the entry point.
#[derive(Clone)]
pub struct App {
    store: Arc<dyn AccountStore>,
    dispatcher: Dispatcher,
}

impl App {
    pub fn new(store: Arc<dyn AccountStore>, dispatcher: Dispatcher) -> Self {
        Self { store, dispatcher }
    }

    pub fn login_screen(&self) -> login::LoginScreen {
        login::LoginScreen::new(self.store.clone(), self.dispatcher.clone())
    }

    pub fn register_screen(&self) -> register::RegisterScreen {
        register::RegisterScreen::new(self.store.clone(), self.dispatcher.clone())
    }

    pub fn main_screen(&self, account: UserAccount) -> main_screen::MainScreen {
        main_screen::MainScreen::new(account)
    }
}
