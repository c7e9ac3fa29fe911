//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{Result, SecretStoreError};
use crate::store::{Repository, SqliteRepository};
use crate::vault::{check_strength, VaultSession, MIN_PASSWORD_LEN};

/// Environment variable holding the master password for scripted use.
pub const PASSWORD_ENV: &str = "SECRET_STORE_PASSWORD";

/// Environment variable holding the replacement password for `passwd`.
pub const NEW_PASSWORD_ENV: &str = "SECRET_STORE_NEW_PASSWORD";

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "SECRETSTORE_LOG";

/// SecretStore CLI: a local, password-protected secret vault.
#[derive(Parser)]
#[command(
    name = "secretstore",
    about = "Local encrypted secret vault",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault database file (default: ~/secrets.sqlite3.dat)
    #[arg(long, env = "SECRET_STORE_FILE", global = true)]
    pub store: Option<PathBuf>,

    /// Log debug events to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Print a secret's value
    Get {
        /// Secret label
        label: String,
    },

    /// Set a secret (add or update)
    Set {
        /// Secret label
        label: String,
        /// Secret value (omit for interactive prompt or piped stdin)
        value: Option<String>,
    },

    /// Delete a secret
    Delete {
        /// Secret label
        label: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// List all secret labels
    List,

    /// Change the master password and re-encrypt every secret
    Passwd,

    /// Export the whole vault (still encrypted) to a JSON document
    Export {
        /// Output file path (default: ~/secrets_export.json)
        #[arg(short, long, env = "SECRET_EXPORT_FILE")]
        output: Option<PathBuf>,
    },

    /// Build a new vault from an exported JSON document
    Import {
        /// Path to the exported document
        file: PathBuf,
    },

    /// Print characters of a secret's `pw:` field at 1-based positions
    BankLogin {
        /// Secret label
        label: String,
        /// Character positions, starting at 1
        #[arg(required = true, num_args = 1..)]
        positions: Vec<usize>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Install the stderr log subscriber.
///
/// `SECRETSTORE_LOG` wins when set; otherwise `--verbose` selects `debug`
/// and the default is `warn`.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    // A second install (e.g. in tests) is harmless.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Load `~/.secretstore.toml`, or defaults if there is none.
pub fn load_settings() -> Result<Settings> {
    Settings::load_default()
}

/// The vault database: `--store` / `SECRET_STORE_FILE`, else the config.
pub fn store_path(cli: &Cli, settings: &Settings) -> PathBuf {
    cli.store
        .clone()
        .unwrap_or_else(|| settings.store_file.clone())
}

/// Get the master password, trying in order:
/// 1. `SECRET_STORE_PASSWORD` env var (scripts)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter master password")
        .interact()
        .map_err(|e| SecretStoreError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new password with confirmation (new vaults and `passwd`).
///
/// Also respects `env_var` for scripted usage.
/// Enforces the minimum password length.
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_new_password(env_var: &str) -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(env_var) {
        if !pw.is_empty() {
            check_strength(&pw)?;
            return Ok(Zeroizing::new(pw));
        }
    }

    loop {
        let password = Zeroizing::new(
            dialoguer::Password::new()
                .with_prompt("Choose master password")
                .with_confirmation(
                    "Confirm master password",
                    "Passwords do not match, try again",
                )
                .interact()
                .map_err(|e| SecretStoreError::CommandFailed(format!("password prompt: {e}")))?,
        );

        if check_strength(&password).is_err() {
            output::warning(&format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(password);
    }
}

/// Open the vault database and unlock it.
///
/// An empty database gets a new master password (prompted twice); an
/// existing one is unlocked with the current password.
pub fn open_session(cli: &Cli) -> Result<VaultSession<SqliteRepository>> {
    let settings = load_settings()?;
    let params = settings.kdf_params()?;
    let path = store_path(cli, &settings);

    let repository = SqliteRepository::open(&path)?;
    let password = if repository.load_master_password()?.is_some() {
        prompt_password()?
    } else {
        output::info(&format!("Creating a new vault at {}", path.display()));
        prompt_new_password(PASSWORD_ENV)?
    };

    VaultSession::open_with_params(repository, &password, &params)
}
