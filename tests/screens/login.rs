use guaumiau::core::account::{Pet, UserAccount};
use guaumiau::core::accounts::{AccountStore, SqliteAccountStore};
use guaumiau::core::error::GuauMiauError;
use guaumiau::core::form::LOGIN_LOADING_MESSAGE;
use guaumiau::core::worker::Dispatcher;
use guaumiau::screens::App;
use guaumiau::screens::login::LoginOutcome;
use guaumiau::screens::main_screen::GREETING;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

const BAD_LOGIN: &str = "Usuario o contraseña incorrectos.";

fn seeded_app() -> App {
    let store = SqliteAccountStore::open_in_memory().unwrap();
    store
        .insert(&UserAccount::new(
            "Ana Pérez",
            "a@duoc.cl",
            None,
            "Abcdefg1@",
            vec![Pet::new("Luna", "Gato")],
        ))
        .unwrap();
    App::new(Arc::new(store), Dispatcher::current())
}

async fn attempt(app: &App, email: &str, password: &str) -> LoginOutcome {
    let screen = app.login_screen();
    screen.on_email_change(email);
    screen.on_password_change(password);
    screen.submit().await
}

#[tokio::test]
async fn test_login_success_reaches_main_screen() {
    let app = seeded_app();
    let screen = app.login_screen();
    screen.on_email_change("a@duoc.cl");
    screen.on_password_change("Abcdefg1@");

    let account = match screen.submit().await {
        LoginOutcome::SignedIn(account) => account,
        other => panic!("expected sign in, got {other:?}"),
    };
    assert!(screen.snapshot().login_success);
    screen.on_login_handled();
    assert!(!screen.snapshot().login_success);

    let main = app.main_screen(account);
    assert_eq!(main.greeting(), GREETING);
    assert_eq!(main.full_name(), "Ana Pérez");
    assert_eq!(main.pets(), &[Pet::new("Luna", "Gato")]);

    let fresh = main.log_out(&app);
    assert_eq!(fresh.snapshot().email, "");
}

#[tokio::test]
async fn test_wrong_password_and_unknown_email_look_the_same() {
    let app = seeded_app();
    let wrong_password = attempt(&app, "a@duoc.cl", "Abcdefg1#").await;
    let unknown_email = attempt(&app, "b@duoc.cl", "Abcdefg1@").await;

    assert_eq!(wrong_password, LoginOutcome::Rejected(BAD_LOGIN.to_string()));
    assert_eq!(wrong_password, unknown_email);
}

#[tokio::test]
async fn test_login_does_not_validate_format() {
    let app = seeded_app();
    // Malformed input is simply not found; no field-specific message.
    let outcome = attempt(&app, "not-an-email", "").await;
    assert_eq!(outcome, LoginOutcome::Rejected(BAD_LOGIN.to_string()));
}

#[tokio::test]
async fn test_email_match_is_case_sensitive() {
    let app = seeded_app();
    let outcome = attempt(&app, "A@duoc.cl", "Abcdefg1@").await;
    assert_eq!(outcome, LoginOutcome::Rejected(BAD_LOGIN.to_string()));
}

#[tokio::test]
async fn test_error_clears_on_edit() {
    let app = seeded_app();
    let screen = app.login_screen();
    screen.on_email_change("b@duoc.cl");
    screen.on_password_change("x");
    screen.submit().await;
    assert_eq!(screen.snapshot().error.as_deref(), Some(BAD_LOGIN));
    assert!(!screen.snapshot().busy);

    screen.on_password_change("y");
    assert_eq!(screen.snapshot().error, None);
}

#[tokio::test]
async fn test_registered_account_can_log_in() {
    let store = Arc::new(SqliteAccountStore::open_in_memory().unwrap());
    let app = App::new(store.clone(), Dispatcher::current());

    let register = app.register_screen();
    register.on_full_name_change("José Muñoz");
    register.on_email_change("jose@duoc.cl");
    register.on_phone_change("987654321");
    register.on_password_change("Perro$123");
    register.on_confirm_password_change("Perro$123");
    register.submit().await;
    register.on_registration_handled();

    assert!(store.exists_by_email("jose@duoc.cl").unwrap());
    match attempt(&app, "jose@duoc.cl", "Perro$123").await {
        LoginOutcome::SignedIn(account) => {
            assert_eq!(account.full_name, "José Muñoz");
            assert_eq!(account.phone.as_deref(), Some("987654321"));
        }
        other => panic!("expected sign in, got {other:?}"),
    }
}

/// Store whose lookups hang until released, to hold a login in flight.
struct GatedStore {
    inner: SqliteAccountStore,
    open: AtomicBool,
}

impl AccountStore for GatedStore {
    fn insert(&self, account: &UserAccount) -> Result<(), GuauMiauError> {
        self.inner.insert(account)
    }

    fn find_by_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<UserAccount>, GuauMiauError> {
        while !self.open.load(Ordering::SeqCst) {
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        self.inner.find_by_credentials(email, password)
    }

    fn exists_by_email(&self, email: &str) -> Result<bool, GuauMiauError> {
        self.inner.exists_by_email(email)
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_second_login_while_busy_is_ignored() {
    let inner = SqliteAccountStore::open_in_memory().unwrap();
    inner
        .insert(&UserAccount::new("Ana Pérez", "a@duoc.cl", None, "Abcdefg1@", vec![]))
        .unwrap();
    let store = Arc::new(GatedStore {
        inner,
        open: AtomicBool::new(false),
    });
    let app = App::new(store.clone(), Dispatcher::current());
    let screen = Arc::new(app.login_screen());
    screen.on_email_change("a@duoc.cl");
    screen.on_password_change("Abcdefg1@");

    let first = {
        let screen = screen.clone();
        tokio::spawn(async move { screen.submit().await })
    };
    let mut rx = screen.subscribe();
    rx.wait_for(|s| s.busy).await.unwrap();
    assert_eq!(screen.snapshot().status_message(), Some(LOGIN_LOADING_MESSAGE));

    assert_eq!(screen.submit().await, LoginOutcome::Ignored);
    assert!(screen.snapshot().busy);

    store.open.store(true, Ordering::SeqCst);
    assert!(matches!(first.await.unwrap(), LoginOutcome::SignedIn(_)));
    let state = screen.snapshot();
    assert!(!state.busy);
    assert!(state.login_success);
    assert_eq!(state.status_message(), None);
}
