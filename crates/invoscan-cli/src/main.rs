//! CLI application for invoice text extraction.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{config, extract, rules, serve};

/// Invoice OCR - extract line items and payment details from invoices
#[derive(Parser)]
#[command(name = "invoscan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP upload server
    Serve(serve::ServeArgs),

    /// Extract data from a single invoice file
    Extract(extract::ExtractArgs),

    /// Manage configuration
    Config(config::ConfigArgs),

    /// Manage extraction rules
    Rules(rules::RulesArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Serve(args) => serve::run(args, config_path).await,
        Commands::Extract(args) => extract::run(args, config_path).await,
        Commands::Config(args) => config::run(args, config_path).await,
        Commands::Rules(args) => rules::run(args, config_path).await,
    }
}
