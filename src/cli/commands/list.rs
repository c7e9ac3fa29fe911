//! `secretstore list` — display all secret labels in a table.

use crate::cli::output;
use crate::cli::{open_session, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let session = open_session(cli)?;
    let labels = session.list_labels()?;

    output::info(&format!("{} secret(s)", labels.len()));
    output::print_labels_table(&labels);

    Ok(())
}
