use clap::Parser;
use secretstore::cli::{init_logging, Cli, Commands};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Get { ref label } => secretstore::cli::commands::get::execute(&cli, label),
        Commands::Set {
            ref label,
            ref value,
        } => secretstore::cli::commands::set::execute(&cli, label, value.as_deref()),
        Commands::Delete { ref label, force } => {
            secretstore::cli::commands::delete::execute(&cli, label, force)
        }
        Commands::List => secretstore::cli::commands::list::execute(&cli),
        Commands::Passwd => secretstore::cli::commands::passwd::execute(&cli),
        Commands::Export { ref output } => {
            secretstore::cli::commands::export::execute(&cli, output.as_ref())
        }
        Commands::Import { ref file } => secretstore::cli::commands::import_cmd::execute(&cli, file),
        Commands::BankLogin {
            ref label,
            ref positions,
        } => secretstore::cli::commands::bank_login::execute(&cli, label, positions),
        Commands::Completions { shell } => secretstore::cli::commands::completions::execute(shell),
    };

    if let Err(e) = result {
        secretstore::cli::output::report(&e);
        std::process::exit(1);
    }
}
