//! CSV allocation import.
//!
//! Reads a sheet with a header row containing `wallet` and `tokens` columns,
//! where `tokens` is a whole-token count. Rows with no positive allocation
//! are dropped; the rest are scaled to base units.

use alloy::primitives::U256;
use anyhow::{bail, Context, Result};
use merkle_distributor::RawBalance;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(clap::Args, Debug)]
pub struct Args {
    /// CSV file with `wallet` and `tokens` columns
    #[arg(short, long)]
    pub input: PathBuf,

    /// Balance file to write
    #[arg(short, long)]
    pub output: PathBuf,

    /// Token decimals used to scale whole tokens into base units
    #[arg(long, default_value_t = 18)]
    pub decimals: u8,
}

pub fn run(args: &Args) -> Result<()> {
    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    let balances = convert(&text, args.decimals)?;

    let json = serde_json::to_string_pretty(&balances)?;
    std::fs::write(&args.output, json)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    tracing::info!(
        records = balances.len(),
        path = %args.output.display(),
        "Wrote balance file"
    );

    Ok(())
}

/// One sheet row; extra columns are ignored.
#[derive(Debug, Deserialize)]
struct CsvRow {
    wallet: String,
    tokens: String,
}

/// Convert CSV text into record-list balances.
pub fn convert(text: &str, decimals: u8) -> Result<Vec<RawBalance>> {
    let scale = U256::from(10u8)
        .checked_pow(U256::from(decimals))
        .context("decimals too large")?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers().context("Failed to read CSV header")?;
    for name in ["wallet", "tokens"] {
        if !headers.iter().any(|h| h == name) {
            bail!("CSV header has no `{name}` column");
        }
    }

    let mut balances = Vec::new();
    for result in reader.deserialize::<CsvRow>() {
        let CsvRow { wallet, tokens } = result.context("Malformed CSV row")?;

        if tokens.starts_with('-') {
            tracing::debug!(%wallet, %tokens, "Skipping non-positive allocation");
            continue;
        }
        if tokens.is_empty() || !tokens.bytes().all(|b| b.is_ascii_digit()) {
            bail!("{wallet}: invalid token count {tokens:?}");
        }
        let whole = U256::from_str_radix(&tokens, 10)
            .with_context(|| format!("{wallet}: invalid token count {tokens:?}"))?;
        if whole.is_zero() {
            tracing::debug!(%wallet, "Skipping zero allocation");
            continue;
        }

        let amount = whole
            .checked_mul(scale)
            .with_context(|| format!("{wallet}: allocation overflows 256 bits"))?;
        balances.push(RawBalance::new(wallet, amount.to_string().as_str()));
    }

    Ok(balances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use merkle_distributor::RawAmount;

    #[test]
    fn test_convert_scales_and_skips() {
        let csv = "name,wallet,tokens\n\
                   alice,0x0000000000000000000000000000000000000001,3\n\
                   bob,0x0000000000000000000000000000000000000002,0\n\
                   carol,0x0000000000000000000000000000000000000003,-4\n";
        let balances = convert(csv, 18).unwrap();
        assert_eq!(balances.len(), 1);
        assert_eq!(
            balances[0].account,
            "0x0000000000000000000000000000000000000001"
        );
        assert_eq!(balances[0].amount, RawAmount::from("3000000000000000000"));
    }

    #[test]
    fn test_convert_zero_decimals() {
        let csv = "wallet,tokens\n0xabc,7\n";
        let balances = convert(csv, 0).unwrap();
        assert_eq!(balances[0].amount, RawAmount::from("7"));
    }

    #[test]
    fn test_convert_missing_column() {
        assert!(convert("wallet,amount\n0x1,2\n", 18).is_err());
    }

    #[test]
    fn test_convert_bad_token_count() {
        assert!(convert("wallet,tokens\n0x1,lots\n", 18).is_err());
    }

    #[test]
    fn test_convert_quoted_fields() {
        let csv = "\"wallet\",\"tokens\"\n\
                   \"0x0000000000000000000000000000000000000001\",\"3\"\n\
                   \"0x0000000000000000000000000000000000000002\",\" 5 \"\n";
        let balances = convert(csv, 0).unwrap();
        assert_eq!(balances.len(), 2);
        assert_eq!(
            balances[0].account,
            "0x0000000000000000000000000000000000000001"
        );
        assert_eq!(balances[0].amount, RawAmount::from("3"));
        assert_eq!(balances[1].amount, RawAmount::from("5"));
    }

    #[test]
    fn test_convert_header_with_bom() {
        let csv = "\u{feff}wallet,tokens\n0x0000000000000000000000000000000000000001,2\n";
        let balances = convert(csv, 1).unwrap();
        assert_eq!(balances[0].amount, RawAmount::from("20"));
    }

    #[test]
    fn test_convert_short_row() {
        assert!(convert("wallet,tokens\n0x1\n", 18).is_err());
    }
}
