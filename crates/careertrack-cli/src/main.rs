use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::records::{AddArgs, UpdateArgs};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "CAREERTRACK_LOG";

#[derive(Parser)]
#[command(name = "careertrack")]
#[command(about = "careertrack - track job applications and follow-ups", long_about = None)]
struct Cli {
    /// Directory for config and guest data (defaults to the platform directories)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a new application
    Add(AddArgs),
    /// List applications, newest first
    List {
        /// Only show applications with this status
        #[arg(long)]
        status: Option<careertrack_core::application::ApplicationStatus>,
    },
    /// Change fields of an application
    Update(UpdateArgs),
    /// Delete an application
    Delete {
        /// Record id as shown by `list`
        id: String,
    },
    /// Applications waiting on a follow-up
    FollowUps,
    /// Dashboard totals
    Stats,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let manager = commands::utils::open_manager(cli.data_dir).await?;
    let json = cli.json;

    match cli.command {
        Commands::Add(args) => commands::records::add(&manager, args, json).await?,
        Commands::List { status } => commands::records::list(&manager, status, json)?,
        Commands::Update(args) => commands::records::update(&manager, args).await?,
        Commands::Delete { id } => commands::records::delete(&manager, &id).await?,
        Commands::FollowUps => commands::report::follow_ups(&manager, json)?,
        Commands::Stats => commands::report::stats(&manager, json)?,
    }

    manager.shutdown().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use careertrack_core::application::ApplicationStatus;

    #[test]
    fn test_parses_list_filter() {
        let cli = Cli::try_parse_from(["careertrack", "list", "--status", "hr-call"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::List {
                status: Some(ApplicationStatus::HrCall)
            }
        ));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["careertrack", "stats", "--json", "--data-dir", "/tmp/ct"])
                .unwrap();
        assert!(cli.json);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/ct")));
    }

    #[test]
    fn test_rejects_unknown_status() {
        assert!(Cli::try_parse_from(["careertrack", "list", "--status", "ghosted"]).is_err());
    }
}
