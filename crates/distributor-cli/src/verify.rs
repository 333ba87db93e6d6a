use anyhow::{Context, Result};
use merkle_distributor::DistributorInfo;
use std::path::PathBuf;

#[derive(clap::Args, Debug)]
pub struct Args {
    /// Distribution document produced by `compile`
    #[arg(short, long)]
    pub distribution: PathBuf,
}

pub fn run(args: &Args) -> Result<()> {
    let text = std::fs::read_to_string(&args.distribution)
        .with_context(|| format!("Failed to read {}", args.distribution.display()))?;
    let info: DistributorInfo =
        serde_json::from_str(&text).context("Malformed distribution document")?;

    info.verify().with_context(|| {
        format!(
            "Distribution {} failed verification",
            args.distribution.display()
        )
    })?;

    tracing::info!(
        merkle_root = %info.merkle_root,
        token_total = %info.token_total,
        claims = info.claims.len(),
        "All proofs verified"
    );

    Ok(())
}
