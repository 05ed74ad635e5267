use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tally_core::Category;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "tally", version, about = "Import bank CSV exports into the Tally ledger")]
struct Cli {
    /// Config file (default: config.toml in the data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// SQLite database to import into
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Preview a CSV file and import its transactions
    Import {
        file: PathBuf,
        /// Override a row's category, e.g. --set "3=Dining Out"
        #[arg(long = "set", value_name = "ROW=CATEGORY", value_parser = commands::parse_override)]
        overrides: Vec<(usize, Category)>,
        /// Show the preview without importing
        #[arg(long)]
        dry_run: bool,
        /// Print the preview as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the category suggested for a merchant name
    Suggest { name: String },
    /// List valid category labels
    Categories,
    /// List imported transactions
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = config::AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Import {
            file,
            overrides,
            dry_run,
            json,
        } => {
            let db_path = config.database_path(cli.db.as_deref())?;
            tracing::debug!("using database {}", db_path.display());
            commands::import(
                &config,
                &db_path,
                &file,
                commands::ImportOptions {
                    overrides,
                    dry_run,
                    json,
                },
            )
            .await
        }
        Command::Suggest { name } => commands::suggest(&config, &name),
        Command::Categories => {
            commands::categories();
            Ok(())
        }
        Command::List => {
            let db_path = config.database_path(cli.db.as_deref())?;
            commands::list(&db_path).await
        }
    }
}
