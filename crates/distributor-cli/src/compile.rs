use anyhow::{Context, Result};
use merkle_distributor::config::DEFAULT_MAX_RECORDS;
use merkle_distributor::{DistributorConfig, RawInput};
use std::path::PathBuf;

#[derive(clap::Args, Debug)]
pub struct Args {
    /// Balance file: `[{account, amount}]` or legacy `{address: amount}` JSON
    #[arg(short, long)]
    pub input: PathBuf,

    /// Where to write the distribution document (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Refuse inputs with more records than this
    #[arg(long, env = "DISTRIBUTOR_MAX_RECORDS", default_value_t = DEFAULT_MAX_RECORDS)]
    pub max_records: usize,
}

pub fn run(args: &Args) -> Result<()> {
    tracing::info!(input = %args.input.display(), "Reading balances");

    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let input: RawInput = serde_json::from_str(&text).context(
        "Balance file must be a JSON array of {account, amount} or an object of address to amount",
    )?;

    let config = DistributorConfig::with_max_records(args.max_records);
    let info =
        merkle_distributor::compile(input, &config).context("Failed to compile distribution")?;

    let json = serde_json::to_string_pretty(&info)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "Wrote distribution");
        }
        None => println!("{json}"),
    }

    tracing::info!(
        merkle_root = %info.merkle_root,
        token_total = %info.token_total,
        claims = info.claims.len(),
        "Done"
    );

    Ok(())
}
