//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use std::collections::BTreeSet;

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::errors::{ErrorKind, SecretStoreError};

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    eprintln!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    eprintln!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print an error, plus a hint for the kinds a user can act on.
pub fn report(err: &SecretStoreError) {
    error(&err.to_string());
    match err.kind() {
        ErrorKind::Authentication => tip("Check the master password, or SECRET_STORE_PASSWORD."),
        ErrorKind::Weakness => tip("Choose a longer password."),
        ErrorKind::MalformedRecord => tip("The store or document is damaged; restore from an export."),
        ErrorKind::Repository | ErrorKind::Other => {}
    }
}

/// Print a numbered table of secret labels.
pub fn print_labels_table(labels: &BTreeSet<String>) {
    if labels.is_empty() {
        info("No secrets in this vault yet.");
        tip("Run `secretstore set <LABEL>` to add your first secret.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Label"]);

    for (i, label) in labels.iter().enumerate() {
        table.add_row(vec![(i + 1).to_string(), label.clone()]);
    }

    println!("{table}");
}
