use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "citeflow")]
#[command(about = "Citeflow CLI - find citations for a claim in a document", long_about = None)]
struct Cli {
    /// Log filter directive (overrides RUST_LOG)
    #[arg(long, global = true, env = "CITEFLOW_LOG")]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search references for a highlighted passage
    Search(commands::search::SearchArgs),
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the resolved config and secret file locations
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_level.as_deref(), cli.log_json)?;

    match cli.command {
        Commands::Search(args) => commands::search::run(args).await?,
        Commands::Config { action } => match action {
            ConfigAction::Path => commands::config::path()?,
        },
    }

    Ok(())
}
