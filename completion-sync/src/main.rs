use anyhow::Result;
use app_utils::{init_tracing, Config};
use clap::{Parser, Subcommand};
use tracing::debug;

mod commands;

/// Reconcile GitHub Classroom assignment completion with a report spreadsheet.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the classrooms visible to the token
    Classrooms,

    /// List a classroom's assignments
    Assignments {
        /// Classroom id or name; defaults to `CLASSROOM`
        #[arg(long, short)]
        classroom: Option<String>,
    },

    /// Print completion for the named assignments as JSON
    Status {
        /// Classroom id or name; defaults to `CLASSROOM`
        #[arg(long, short)]
        classroom: Option<String>,

        /// Assignment titles, spelled exactly as in the classroom
        #[arg(required = true)]
        titles: Vec<String>,
    },

    /// Bring the report sheet up to date with the classroom
    Sync {
        /// Classroom id or name; defaults to `CLASSROOM`
        #[arg(long, short)]
        classroom: Option<String>,

        /// Sheet range in A1 notation; defaults to `SHEET_RANGE`
        #[arg(long)]
        range: Option<String>,

        /// Print the reconciled sheet instead of writing it
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    let cli = Cli::parse();
    let config = Config::from_env()?;
    debug!(?cli, "initialized");

    match cli.command {
        Command::Classrooms => commands::list_classrooms(&config).await,
        Command::Assignments { classroom } => {
            commands::list_assignments(&config, classroom).await
        }
        Command::Status { classroom, titles } => {
            commands::print_status(&config, classroom, titles).await
        }
        Command::Sync {
            classroom,
            range,
            dry_run,
        } => commands::sync(&config, classroom, range, dry_run).await,
    }
}
