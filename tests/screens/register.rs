use guaumiau::core::account::UserAccount;
use guaumiau::core::accounts::{AccountStore, SqliteAccountStore};
use guaumiau::core::error::GuauMiauError;
use guaumiau::core::validate::{Field, FieldError};
use guaumiau::core::worker::Dispatcher;
use guaumiau::screens::register::{RegisterScreen, SubmitOutcome};
use guaumiau::screens::{App, STORAGE_FAILURE_MESSAGE};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

fn app() -> (App, Arc<SqliteAccountStore>) {
    let store = Arc::new(SqliteAccountStore::open_in_memory().unwrap());
    (App::new(store.clone(), Dispatcher::current()), store)
}

fn fill_valid(screen: &RegisterScreen, email: &str) {
    screen.on_full_name_change("Ana Pérez");
    screen.on_email_change(email);
    screen.on_password_change("Abcdefg1@");
    screen.on_confirm_password_change("Abcdefg1@");
}

#[tokio::test]
async fn test_register_then_duplicate_is_rejected() {
    let (app, store) = app();

    let screen = app.register_screen();
    fill_valid(&screen, "a@duoc.cl");
    let outcome = screen.submit().await;
    assert!(matches!(outcome, SubmitOutcome::Registered(_)));
    assert!(screen.snapshot().registration_success);
    assert!(store.exists_by_email("a@duoc.cl").unwrap());

    let again = app.register_screen();
    fill_valid(&again, "a@duoc.cl");
    match again.submit().await {
        SubmitOutcome::Rejected(report) => {
            assert_eq!(report.error(Field::Email), Some(FieldError::EmailTaken));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
    let state = again.snapshot();
    assert_eq!(state.email_error.as_deref(), Some("Este correo ya está registrado"));
    assert!(!state.busy);
    assert!(!state.registration_success);
}

#[tokio::test]
async fn test_rejected_form_keeps_values_and_shows_every_error() {
    let (app, _) = app();
    let screen = app.register_screen();
    screen.on_full_name_change("Ana 2");
    screen.on_email_change("a@gmail.com");
    screen.on_password_change("abcdefg1@");
    screen.on_confirm_password_change("otra");
    let pet = screen.add_pet();

    let outcome = screen.submit().await;
    assert!(matches!(outcome, SubmitOutcome::Rejected(_)));

    let state = screen.snapshot();
    assert_eq!(state.full_name, "Ana 2");
    assert_eq!(state.full_name_error.as_deref(), Some("Solo letras y espacios"));
    assert_eq!(state.email_error.as_deref(), Some("Solo se aceptan correos @duoc.cl"));
    assert_eq!(
        state.password_error.as_deref(),
        Some("Debe contener al menos una mayúscula")
    );
    assert_eq!(
        state.confirm_password_error.as_deref(),
        Some("Las contraseñas no coinciden")
    );
    let pet = state.pet(pet).unwrap();
    assert_eq!(pet.name_error.as_deref(), Some("Obligatorio"));
    assert_eq!(pet.kind_error.as_deref(), Some("Obligatorio"));
}

#[tokio::test]
async fn test_pets_are_stored_in_form_order() {
    let (app, store) = app();
    let screen = app.register_screen();
    fill_valid(&screen, "a@duoc.cl");
    let first = screen.add_pet();
    let second = screen.add_pet();
    let third = screen.add_pet();
    screen.on_pet_name_change(second, "Rex");
    screen.on_pet_type_change(second, "Perro");
    screen.on_pet_name_change(third, "Piolín");
    screen.on_pet_type_change(third, "Ave");
    screen.remove_pet(first);

    assert!(matches!(screen.submit().await, SubmitOutcome::Registered(_)));

    let stored = store
        .find_by_credentials("a@duoc.cl", "Abcdefg1@")
        .unwrap()
        .unwrap();
    let names: Vec<&str> = stored.pets.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Rex", "Piolín"]);
}

#[tokio::test]
async fn test_subscribers_see_transitions_and_success_is_acknowledged() {
    let (app, _) = app();
    let screen = app.register_screen();
    let mut rx = screen.subscribe();
    fill_valid(&screen, "a@duoc.cl");
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().email, "a@duoc.cl");

    screen.submit().await;
    assert!(rx.borrow_and_update().registration_success);

    screen.on_registration_handled();
    let state = rx.borrow_and_update().clone();
    assert!(!state.registration_success);
    assert_eq!(state.email, "");
}

/// Store whose lookups hang until released, to hold a submit in flight.
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
        self.inner.find_by_credentials(email, password)
    }

    fn exists_by_email(&self, email: &str) -> Result<bool, GuauMiauError> {
        while !self.open.load(Ordering::SeqCst) {
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        self.inner.exists_by_email(email)
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_second_submit_while_busy_is_ignored() {
    let store = Arc::new(GatedStore {
        inner: SqliteAccountStore::open_in_memory().unwrap(),
        open: AtomicBool::new(false),
    });
    let app = App::new(store.clone(), Dispatcher::current());
    let screen = Arc::new(app.register_screen());
    fill_valid(&screen, "a@duoc.cl");

    let first = {
        let screen = screen.clone();
        tokio::spawn(async move { screen.submit().await })
    };
    let mut rx = screen.subscribe();
    rx.wait_for(|s| s.busy).await.unwrap();

    assert_eq!(screen.submit().await, SubmitOutcome::Ignored);

    store.open.store(true, Ordering::SeqCst);
    assert!(matches!(first.await.unwrap(), SubmitOutcome::Registered(_)));
    assert!(!screen.snapshot().busy);
}

struct BrokenStore;

impl AccountStore for BrokenStore {
    fn insert(&self, _: &UserAccount) -> Result<(), GuauMiauError> {
        Err(std::io::Error::other("disk full").into())
    }

    fn find_by_credentials(&self, _: &str, _: &str) -> Result<Option<UserAccount>, GuauMiauError> {
        Err(std::io::Error::other("disk full").into())
    }

    fn exists_by_email(&self, _: &str) -> Result<bool, GuauMiauError> {
        Ok(false)
    }
}

#[tokio::test]
async fn test_storage_failure_is_generic_not_a_field_error() {
    let app = App::new(Arc::new(BrokenStore), Dispatcher::current());
    let screen = app.register_screen();
    fill_valid(&screen, "a@duoc.cl");

    let outcome = screen.submit().await;
    assert_eq!(outcome, SubmitOutcome::Failed(STORAGE_FAILURE_MESSAGE.to_string()));

    let state = screen.snapshot();
    assert_eq!(state.failure.as_deref(), Some(STORAGE_FAILURE_MESSAGE));
    assert!(!state.has_errors());
    assert!(!state.busy);
    assert_eq!(state.full_name, "Ana Pérez");
}

/// Says every email is free, as if a concurrent registration committed
/// between the check and the insert.
struct RacingStore {
    inner: SqliteAccountStore,
}

impl AccountStore for RacingStore {
    fn insert(&self, account: &UserAccount) -> Result<(), GuauMiauError> {
        self.inner.insert(account)
    }

    fn find_by_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<UserAccount>, GuauMiauError> {
        self.inner.find_by_credentials(email, password)
    }

    fn exists_by_email(&self, _: &str) -> Result<bool, GuauMiauError> {
        Ok(false)
    }
}

#[tokio::test]
async fn test_lost_insert_race_surfaces_as_duplicate_email() {
    let inner = SqliteAccountStore::open_in_memory().unwrap();
    inner
        .insert(&UserAccount::new("Otro", "a@duoc.cl", None, "Abcdefg1@", vec![]))
        .unwrap();
    let app = App::new(Arc::new(RacingStore { inner }), Dispatcher::current());

    let screen = app.register_screen();
    fill_valid(&screen, "a@duoc.cl");
    match screen.submit().await {
        SubmitOutcome::Rejected(report) => {
            assert_eq!(report.error(Field::Email), Some(FieldError::EmailTaken));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
    assert_eq!(
        screen.snapshot().email_error.as_deref(),
        Some("Este correo ya está registrado")
    );
}
