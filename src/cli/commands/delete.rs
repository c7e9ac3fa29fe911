//! `secretstore delete` — remove a secret from the vault.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{open_session, Cli};
use crate::errors::{Result, SecretStoreError};

/// Execute the `delete` command.
pub fn execute(cli: &Cli, label: &str, force: bool) -> Result<()> {
    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete secret '{label}'?"))
            .default(false)
            .interact()
            .map_err(|e| SecretStoreError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    let mut session = open_session(cli)?;

    if !session.contains(label)? {
        output::warning(&format!("No secret labelled '{label}', nothing deleted"));
        return Ok(());
    }

    session.delete(label)?;
    output::success(&format!("Deleted secret '{label}'"));

    Ok(())
}
