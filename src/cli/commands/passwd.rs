//! `secretstore passwd` — change the master password.
//!
//! Unlocks the vault with the current password, then re-encrypts every
//! secret under a new one. On the SQLite store the re-encrypted secrets
//! and the new password are committed in a single transaction.

use crate::cli::output;
use crate::cli::{open_session, prompt_new_password, Cli, NEW_PASSWORD_ENV};
use crate::errors::Result;

/// Execute the `passwd` command.
pub fn execute(cli: &Cli) -> Result<()> {
    // 1. Open the vault with the current password.
    output::info("Enter your current master password.");
    let mut session = open_session(cli)?;

    // 2. Prompt for the new password.
    output::info("Choose your new master password.");
    let new_password = prompt_new_password(NEW_PASSWORD_ENV)?;

    // 3. Re-encrypt and commit.
    session.rotate_password(&new_password)?;

    let count = session.list_labels()?.len();
    output::success(&format!(
        "Master password changed ({count} secrets re-encrypted)"
    ));

    Ok(())
}
