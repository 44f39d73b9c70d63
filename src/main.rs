use std::path::{Path, PathBuf};
use std::process::ExitCode;

use account_session::config::{Config, ConfigError};
use account_session::profile::{self, FormErrors, ProfileForm, SubmitOutcome};
use account_session::{AvatarFile, BackendError, ProfileUpdate, SessionError, SessionStore};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("backend setup failed: {0}")]
    Backend(#[from] BackendError),
    #[error("{0}")]
    Session(#[from] SessionError),
    #[error("missing credentials; pass --email/--password or set ACCOUNT_EMAIL/ACCOUNT_PASSWORD")]
    MissingCredentials,
    #[error("could not read {}: {source}", path.display())]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("invalid input: {0}")]
    InvalidForm(String),
    #[error("{0}")]
    Rejected(String),
    #[error("session expired; log in again")]
    SessionExpired,
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "account-session", about = "Log in, edit the profile, and manage the avatar of an account")]
struct Cli {
    #[arg(long, env = "ACCOUNT_EMAIL", global = true)]
    email: Option<String>,

    #[arg(long, env = "ACCOUNT_PASSWORD", global = true, hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and print the session state.
    Show,
    /// Create an account, then log in with it.
    Signup {
        #[arg(long)]
        name: String,
    },
    SetName {
        name: String,
    },
    SetPassword {
        #[arg(long)]
        current: String,
        #[arg(long = "new")]
        new_password: String,
    },
    /// Upload an image file as the new avatar.
    SetAvatar {
        path: PathBuf,
    },
    /// Merge one string preference into the account's prefs.
    SetPref {
        key: String,
        value: String,
    },
    Logout,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "failed to load .env"),
    }

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let Cli { email, password, command } = cli;
    let (email, password) = match (email, password) {
        (Some(email), Some(password)) => (email, password),
        _ => return Err(CliError::MissingCredentials),
    };

    let config = Config::from_env()?;
    // Each run starts with an empty cookie jar, so there is no session to probe for.
    let store = SessionStore::from_config(&config)?;

    if let Command::Signup { name } = &command {
        store.signup(name, &email, &password).await?;
        return print_state(&store);
    }

    let profile = store.login(&email, &password).await?;

    match command {
        Command::Show | Command::Signup { .. } => {}
        Command::SetName { name } => {
            let mut form = ProfileForm { name, ..ProfileForm::from_profile(&profile) };
            check_outcome(profile::submit(&store, &mut form).await)?;
        }
        Command::SetPassword { current, new_password } => {
            let mut form = ProfileForm {
                current_password: current,
                confirm_new_password: new_password.clone(),
                new_password,
                ..ProfileForm::from_profile(&profile)
            };
            check_outcome(profile::submit(&store, &mut form).await)?;
        }
        Command::SetAvatar { path } => {
            let file = read_avatar(&path).await?;
            store.update_avatar(&file).await?;
        }
        Command::SetPref { key, value } => {
            let mut prefs = profile.prefs;
            prefs.insert(key, value.into());
            store.refresh(Some(ProfileUpdate::prefs(prefs))).await?;
        }
        Command::Logout => store.logout().await?,
    }

    print_state(&store)
}

fn print_state(store: &SessionStore) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(&store.snapshot())?);
    Ok(())
}

fn check_outcome(outcome: SubmitOutcome) -> Result<(), CliError> {
    match outcome {
        SubmitOutcome::Saved { message } => {
            tracing::info!("{message}");
            Ok(())
        }
        SubmitOutcome::Invalid(errors) => Err(CliError::InvalidForm(describe(&errors))),
        SubmitOutcome::Failed { message } => Err(CliError::Rejected(message)),
        SubmitOutcome::RedirectToLogin => Err(CliError::SessionExpired),
    }
}

fn describe(errors: &FormErrors) -> String {
    [errors.name, errors.current_password, errors.new_password, errors.confirm_new_password]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join("; ")
}

async fn read_avatar(path: &Path) -> Result<AvatarFile, CliError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| CliError::ReadFile { path: path.to_path_buf(), source })?;
    let file_name = path
        .file_name()
        .map_or_else(|| "avatar".to_owned(), |n| n.to_string_lossy().into_owned());
    let file = AvatarFile::new(file_name, bytes);
    Ok(match content_type_for(path) {
        Some(content_type) => file.with_content_type(content_type),
        None => file,
    })
}

fn content_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}
