use crate::core::account::{Pet, UserAccount};
use crate::screens::App;
use crate::screens::login::LoginScreen;

pub const GREETING: &str = "¡Bienvenido a GUAU&MIAU!";

/// Shown after a successful login.
pub struct MainScreen {
    account: UserAccount,
}

impl MainScreen {
    pub fn new(account: UserAccount) -> Self {
        Self { account }
    }

    pub fn greeting(&self) -> &'static str {
        GREETING
    }

    pub fn full_name(&self) -> &str {
        &self.account.full_name
    }

    pub fn pets(&self) -> &[Pet] {
        &self.account.pets
    }

    /// Ends the session. The account is dropped and a fresh login form is
    /// returned, so nothing typed before carries over.
    pub fn log_out(self, app: &App) -> LoginScreen {
        tracing::info!(email = %self.account.email, "logged out");
        app.login_screen()
    }
}
