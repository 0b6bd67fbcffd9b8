use crate::commands::{run_import, run_list, ImportArgs, ListArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use kindness_registry::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Kindness Registry",
    about = "Serve and administer the kindness position registry",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Validate a CSV export and import it as one batch
    Import(ImportArgs),
    /// Print registry records as JSON with applicant names masked
    List(ListArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Import(args) => run_import(args),
        Command::List(args) => run_list(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["kindness-registry-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn import_requires_a_csv_path() {
        assert!(Cli::try_parse_from(["kindness-registry-api", "import"]).is_err());

        let cli = Cli::try_parse_from([
            "kindness-registry-api",
            "import",
            "--csv",
            "positions.csv",
            "--database",
            "registry.db",
        ])
        .expect("parses");
        match cli.command {
            Some(Command::Import(args)) => {
                assert_eq!(args.csv, PathBuf::from("positions.csv"));
                assert_eq!(args.database, Some(PathBuf::from("registry.db")));
            }
            other => panic!("expected import command, got {other:?}"),
        }
    }

    #[test]
    fn list_accepts_a_search_term() {
        let cli = Cli::try_parse_from(["kindness-registry-api", "list", "--search", "Chen"])
            .expect("parses");
        match cli.command {
            Some(Command::List(args)) => {
                assert_eq!(args.search.as_deref(), Some("Chen"));
                assert!(args.database.is_none());
            }
            other => panic!("expected list command, got {other:?}"),
        }
    }
}
