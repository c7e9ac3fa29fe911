//! `secretstore import` — build a new vault from an exported document.
//!
//! The target database must be empty. The password is checked against
//! the document before anything is written.

use std::path::Path;

use crate::cli::output;
use crate::cli::{load_settings, prompt_password, store_path, Cli};
use crate::errors::Result;
use crate::store::SqliteRepository;
use crate::vault::{MasterPassword, VaultDocument, VaultSession};

/// Execute the `import` command.
pub fn execute(cli: &Cli, file: &Path) -> Result<()> {
    let settings = load_settings()?;
    let params = settings.kdf_params()?;
    let path = store_path(cli, &settings);

    let document = VaultDocument::read_from(file)?;

    // Verify first so a wrong password leaves the target untouched.
    let password = prompt_password()?;
    MasterPassword::from_record(&document.master_password)?.verify(&password)?;

    let repository = SqliteRepository::open(&path)?;
    let session = VaultSession::open_from_document(repository, &password, &document, &params)?;

    output::success(&format!(
        "Imported {} secret(s) into {}",
        session.list_labels()?.len(),
        path.display()
    ));

    Ok(())
}
