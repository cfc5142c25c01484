use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

/// Read store, date and total off receipt photos and keep them in a ticket log.
#[derive(Parser)]
#[command(name = "recibo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: recibo.toml in the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the ticket database
    Init,
    /// OCR a receipt photo, preview the fields and save the ticket
    Scan(commands::ScanArgs),
    /// Extract fields from already OCR'd text files
    Extract(commands::ExtractArgs),
    /// Scan every image dropped into the intake folder
    Watch,
    /// Show the most recently saved tickets
    List {
        #[arg(short, long, default_value_t = 20)]
        limit: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let ctx = commands::Context::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Init => commands::init(&ctx).await,
        Commands::Scan(args) => commands::scan(&ctx, args).await,
        Commands::Extract(args) => commands::extract(&ctx, args).await,
        Commands::Watch => commands::watch(&ctx).await,
        Commands::List { limit } => commands::list(&ctx, limit).await,
    }
}
