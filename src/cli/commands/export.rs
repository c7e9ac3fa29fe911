//! `secretstore export` — write the whole vault to a JSON document.
//!
//! The document holds the stored records verbatim: secrets stay
//! encrypted and the same master password unlocks them after `import`.

use std::path::PathBuf;

use crate::cli::output;
use crate::cli::{load_settings, open_session, store_path, Cli};
use crate::errors::{Result, SecretStoreError};

/// Execute the `export` command.
pub fn execute(cli: &Cli, output_path: Option<&PathBuf>) -> Result<()> {
    let settings = load_settings()?;
    let dest = output_path
        .cloned()
        .unwrap_or_else(|| settings.export_file.clone());

    // Safety: refuse to overwrite the vault database itself.
    if dest == store_path(cli, &settings) {
        return Err(SecretStoreError::CommandFailed(
            "refusing to export over the vault database".into(),
        ));
    }

    let session = open_session(cli)?;
    let document = session.export_document()?;
    document.write_to(&dest)?;

    output::success(&format!(
        "Exported {} secret(s) to {}",
        document.secrets.len(),
        dest.display()
    ));
    output::tip("The export is encrypted with your current master password.");

    Ok(())
}
