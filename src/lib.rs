//! GUAU&MIAU: local-first accounts for pet owners.
//!
//! Three screens (login, registration, main) sit on a small core:
//!
//! - **Validator** ([`core::validate`]): pure checks over a registration form
//!   snapshot producing per-field messages. All fields are evaluated on every
//!   call; within a field the first failing rule wins.
//! - **Account store** ([`core::accounts`]): SQLite table keyed by email, pets
//!   embedded as a JSON column. Insert-if-absent is a single atomic statement.
//!
//! Screens ([`screens`]) hold their form state behind a `watch` channel and
//! run every store call on the blocking pool through [`core::worker::Dispatcher`].
//!
//! # Examples
//!
//! ```bash
//! guaumiau register --full-name "Ana Pérez" --email ana@duoc.cl \
//!     --password 'Abcdefg1@' --confirm-password 'Abcdefg1@' --pet Luna:Gato
//! guaumiau login --email ana@duoc.cl --password 'Abcdefg1@'
//! ```
//!
//! # Crate Structure
//!
//! - [`core`]: account model, validation, form state, store, config, logging
//! - [`screens`]: login, registration and main screen view-models

pub mod core;
pub mod screens;

use crate::core::{
    accounts::SqliteAccountStore,
    config::AppConfig,
    error::GuauMiauError,
    form::RegisterFormState,
    logging,
    store::Store,
    validate::Field,
    worker::Dispatcher,
};
use crate::screens::{App, login::LoginOutcome, register::SubmitOutcome};

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[clap(
    name = "guaumiau",
    version = env!("CARGO_PKG_VERSION"),
    about = "GUAU&MIAU account registration and login"
)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Data directory (overrides GUAUMIAU_DATA_DIR).
    #[clap(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Output format.
    #[clap(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account.
    Register {
        #[clap(long)]
        full_name: String,
        #[clap(long)]
        email: String,
        /// Digits only.
        #[clap(long)]
        phone: Option<String>,
        #[clap(long)]
        password: String,
        #[clap(long)]
        confirm_password: String,
        /// Pet as NAME:TYPE. Repeat for several pets.
        #[clap(long = "pet", value_parser = parse_pet)]
        pets: Vec<(String, String)>,
    },
    /// Sign in and show the main screen.
    Login {
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
    },
    /// List the pet types offered at registration.
    PetTypes,
}

fn parse_pet(s: &str) -> Result<(String, String), String> {
    match s.split_once(':') {
        Some((name, kind)) => Ok((name.to_string(), kind.to_string())),
        None => Err(format!("expected NAME:TYPE, got '{}'", s)),
    }
}

/// Parses the command line and runs it to completion.
pub async fn run() -> Result<ExitCode, GuauMiauError> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    run_with(cli).await
}

pub async fn run_with(cli: Cli) -> Result<ExitCode, GuauMiauError> {
    if let Command::PetTypes = cli.command {
        print_pet_types(cli.format);
        return Ok(ExitCode::SUCCESS);
    }

    let config = AppConfig::load(cli.data_dir.as_deref())?;
    let store = Store::from_config(&config);
    let accounts = SqliteAccountStore::open(&store)?;
    let app = App::new(Arc::new(accounts), Dispatcher::current());

    match cli.command {
        Command::Register {
            full_name,
            email,
            phone,
            password,
            confirm_password,
            pets,
        } => {
            let screen = app.register_screen();
            screen.on_full_name_change(full_name);
            screen.on_email_change(email);
            if let Some(phone) = phone {
                screen.on_phone_change(phone);
            }
            screen.on_password_change(password);
            screen.on_confirm_password_change(confirm_password);
            for (name, kind) in pets {
                let id = screen.add_pet();
                screen.on_pet_name_change(id, name);
                screen.on_pet_type_change(id, kind);
            }

            let outcome = screen.submit().await;
            let form = screen.snapshot();
            let code = print_register_outcome(cli.format, &outcome, &form);
            if form.registration_success {
                screen.on_registration_handled();
            }
            Ok(code)
        }
        Command::Login { email, password } => {
            let screen = app.login_screen();
            screen.on_email_change(email);
            screen.on_password_change(password);

            let outcome = screen.submit().await;
            if let LoginOutcome::SignedIn(account) = &outcome {
                screen.on_login_handled();
                let main = app.main_screen(account.clone());
                print_main_screen(cli.format, &main);
                return Ok(ExitCode::SUCCESS);
            }
            Ok(print_login_failure(cli.format, &outcome))
        }
        Command::PetTypes => Ok(ExitCode::SUCCESS),
    }
}

fn print_pet_types(format: OutputFormat) {
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "pet_types": crate::core::account::PET_TYPES })
        ),
        OutputFormat::Text => {
            for t in crate::core::account::PET_TYPES {
                println!("{}", t);
            }
        }
    }
}

fn print_register_outcome(
    format: OutputFormat,
    outcome: &SubmitOutcome,
    form: &RegisterFormState,
) -> ExitCode {
    use colored::Colorize;

    let ok = matches!(outcome, SubmitOutcome::Registered(_));
    match format {
        OutputFormat::Json => {
            let fields: serde_json::Map<String, serde_json::Value> = Field::ALL
                .iter()
                .filter_map(|f| {
                    form.error(*f)
                        .map(|m| (format!("{:?}", f), serde_json::Value::from(m)))
                })
                .collect();
            let pets: Vec<serde_json::Value> = form
                .pets
                .iter()
                .map(|p| {
                    serde_json::json!({
                        "id": p.id,
                        "name_error": p.name_error,
                        "type_error": p.kind_error,
                    })
                })
                .collect();
            println!(
                "{}",
                serde_json::json!({
                    "cmd": "register",
                    "status": if ok { "ok" } else { "error" },
                    "message": if ok { Some(screens::register::SUCCESS_MESSAGE) } else { None },
                    "failure": form.failure,
                    "field_errors": fields,
                    "pets": pets,
                })
            );
        }
        OutputFormat::Text => match outcome {
            SubmitOutcome::Registered(_) => {
                println!("{} {}", "✓".bright_green(), screens::register::SUCCESS_MESSAGE);
            }
            SubmitOutcome::Failed(msg) => {
                eprintln!("{} {}", "✗".bright_red(), msg);
            }
            SubmitOutcome::Rejected(_) | SubmitOutcome::Ignored => {
                for f in Field::ALL {
                    if let Some(msg) = form.error(f) {
                        eprintln!("{} {}: {}", "✗".bright_red(), f.label().bold(), msg);
                    }
                }
                for (i, pet) in form.pets.iter().enumerate() {
                    if let Some(msg) = &pet.name_error {
                        eprintln!("{} Mascota {} nombre: {}", "✗".bright_red(), i + 1, msg);
                    }
                    if let Some(msg) = &pet.kind_error {
                        eprintln!("{} Mascota {} tipo: {}", "✗".bright_red(), i + 1, msg);
                    }
                }
            }
        },
    }

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_main_screen(format: OutputFormat, main: &screens::main_screen::MainScreen) {
    use colored::Colorize;

    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({
                "cmd": "login",
                "status": "ok",
                "greeting": main.greeting(),
                "full_name": main.full_name(),
                "pets": main.pets(),
            })
        ),
        OutputFormat::Text => {
            println!("{}", main.greeting().bright_green().bold());
            println!("  {}", main.full_name());
            for pet in main.pets() {
                println!("  {} {} ({})", "▸".bright_cyan(), pet.name, pet.kind);
            }
        }
    }
}

fn print_login_failure(format: OutputFormat, outcome: &LoginOutcome) -> ExitCode {
    use colored::Colorize;

    let msg = match outcome {
        LoginOutcome::Rejected(m) | LoginOutcome::Failed(m) => m.as_str(),
        LoginOutcome::SignedIn(_) | LoginOutcome::Ignored => "",
    };
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "cmd": "login", "status": "error", "message": msg })
        ),
        OutputFormat::Text => eprintln!("{} {}", "✗".bright_red(), msg),
    }
    ExitCode::FAILURE
}
