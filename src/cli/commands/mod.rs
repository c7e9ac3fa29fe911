//! One module per subcommand. Each exposes an `execute` function.

pub mod bank_login;
pub mod completions;
pub mod delete;
pub mod export;
pub mod get;
pub mod import_cmd;
pub mod list;
pub mod passwd;
pub mod set;
