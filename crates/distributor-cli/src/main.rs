//! Merkle Distributor CLI
//!
//! Compiles balance files into a distribution document, re-verifies
//! published documents, and converts CSV allocations into balance files.

mod compile;
mod convert_csv;
mod verify;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "merkle-distributor")]
#[command(about = "Compile token airdrop balances into a Merkle distribution")]
#[command(version)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "DISTRIBUTOR_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the merkle root and claims from a balance file
    Compile(compile::Args),
    /// Check every proof and the token total of a distribution document
    Verify(verify::Args),
    /// Convert a `wallet,tokens` CSV into a balance file
    ConvertCsv(convert_csv::Args),
}

fn init_tracing(json: bool) {
    // Logs go to stderr so stdout stays clean for JSON output
    let registry = tracing_subscriber::registry().with(EnvFilter::from_default_env());
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn main() -> Result<()> {
    // Load environment from .env if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match cli.command {
        Commands::Compile(args) => compile::run(&args)?,
        Commands::Verify(args) => verify::run(&args)?,
        Commands::ConvertCsv(args) => convert_csv::run(&args)?,
    }

    Ok(())
}
