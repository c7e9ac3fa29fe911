//! `secretstore set` — add or update a secret in the vault.

use std::io::{self, IsTerminal, Read};

use zeroize::{Zeroize, Zeroizing};

use crate::cli::output;
use crate::cli::{open_session, Cli};
use crate::errors::{Result, SecretStoreError};

/// Execute the `set` command.
pub fn execute(cli: &Cli, label: &str, value: Option<&str>) -> Result<()> {
    // Determine the secret value from one of three sources.
    let secret_value = Zeroizing::new(if let Some(v) = value {
        // Source 1: Inline value on the command line.
        output::warning("Value provided on command line — it may appear in shell history.");
        v.to_string()
    } else if !io::stdin().is_terminal() {
        // Source 2: Piped input (stdin is not a terminal).
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        let trimmed = buf.trim_end().to_string();
        buf.zeroize();
        trimmed
    } else {
        // Source 3: Interactive secure prompt (default).
        dialoguer::Password::new()
            .with_prompt(format!("Enter value for {label}"))
            .allow_empty_password(true)
            .interact()
            .map_err(|e| SecretStoreError::CommandFailed(format!("input prompt: {e}")))?
    });

    let mut session = open_session(cli)?;

    let existed = session.contains(label)?;
    session.write(label, &secret_value)?;

    let total = session.list_labels()?.len();
    if existed {
        output::success(&format!("Secret '{label}' updated ({total} total)"));
    } else {
        output::success(&format!("Secret '{label}' added ({total} total)"));
    }

    Ok(())
}
