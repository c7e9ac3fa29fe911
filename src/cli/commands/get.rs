//! `secretstore get` — print a single secret's value.

use crate::cli::{open_session, Cli};
use crate::errors::{Result, SecretStoreError};

/// Execute the `get` command.
pub fn execute(cli: &Cli, label: &str) -> Result<()> {
    let session = open_session(cli)?;

    // Decrypt and print the secret value to stdout.
    match session.read(label)? {
        Some(value) => {
            println!("{value}");
            Ok(())
        }
        None => Err(SecretStoreError::CommandFailed(format!(
            "no secret labelled '{label}'"
        ))),
    }
}
