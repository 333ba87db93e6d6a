//! Balance validation.
//!
//! Turns raw balance input into canonical, de-duplicated, strictly positive
//! records sorted by address bytes. The sort position becomes the leaf index.

use crate::config::DistributorConfig;
use crate::error::DistributorError;
use crate::types::{BalanceRecord, RawAmount, RawInput};
use alloy::primitives::{Address, U256};
use std::collections::btree_map::{BTreeMap, Entry};
use tracing::debug;

/// Parses an Ethereum address into its canonical form.
///
/// Accepts 40 hex characters with or without a `0x` prefix. Mixed-case input
/// must carry a valid EIP-55 checksum; all-lowercase and all-uppercase input
/// is accepted as is.
///
/// # Errors
/// Returns [`DistributorError::InvalidAddress`] on bad length, non-hex
/// characters or a checksum mismatch.
pub fn parse_account(raw: &str) -> Result<Address, DistributorError> {
    let invalid = || DistributorError::InvalidAddress(raw.to_string());

    let body = raw.strip_prefix("0x").unwrap_or(raw);
    if body.len() != 40 {
        return Err(invalid());
    }

    let mut bytes = [0u8; 20];
    hex::decode_to_slice(body, &mut bytes).map_err(|_| invalid())?;
    let address = Address::from(bytes);

    let has_upper = body.bytes().any(|b| b.is_ascii_uppercase());
    let has_lower = body.bytes().any(|b| b.is_ascii_lowercase());
    if has_upper && has_lower && address.to_checksum(None)[2..] != *body {
        return Err(invalid());
    }

    Ok(address)
}

/// Parses an amount into a strictly positive `U256`.
///
/// `account` is only used for error context.
///
/// # Errors
/// Returns [`DistributorError::InvalidAmount`] for zero, negative, fractional,
/// unparseable or wider-than-256-bit values.
pub fn parse_amount(account: &str, raw: &RawAmount) -> Result<U256, DistributorError> {
    let amount = match raw {
        RawAmount::Number(n) => n.as_u64().map(U256::from).ok_or_else(|| {
            DistributorError::invalid_amount(account, format!("{n} is not a non-negative integer"))
        })?,
        RawAmount::Text(s) => parse_amount_str(account, s)?,
    };

    if amount.is_zero() {
        return Err(DistributorError::invalid_amount(
            account,
            "amount must be positive",
        ));
    }
    Ok(amount)
}

fn parse_amount_str(account: &str, s: &str) -> Result<U256, DistributorError> {
    if s.starts_with('-') {
        return Err(DistributorError::invalid_amount(
            account,
            format!("negative amount {s}"),
        ));
    }

    let (digits, radix) = match s.strip_prefix("0x") {
        Some(hex_digits) => (hex_digits, 16),
        None => (s, 10),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(DistributorError::invalid_amount(
            account,
            format!("cannot parse {s:?}"),
        ));
    }

    U256::from_str_radix(digits, u64::from(radix))
        .map_err(|e| DistributorError::invalid_amount(account, e.to_string()))
}

/// Validates and canonicalizes raw balance input.
#[derive(Debug, Clone, Copy, Default)]
pub struct BalanceValidator {
    config: DistributorConfig,
}

impl BalanceValidator {
    /// Create a validator with the given limits.
    #[must_use]
    pub fn new(config: DistributorConfig) -> Self {
        Self { config }
    }

    /// Validate `input` and return records sorted ascending by address bytes.
    ///
    /// The result does not depend on the order of entries in `input`.
    ///
    /// # Errors
    /// - [`DistributorError::EmptyInput`] if there are no entries
    /// - [`DistributorError::TooManyRecords`] if the record cap is exceeded
    /// - [`DistributorError::InvalidAddress`], [`DistributorError::DuplicateAddress`]
    ///   or [`DistributorError::InvalidAmount`] for the first bad entry
    pub fn validate(&self, input: RawInput) -> Result<Vec<BalanceRecord>, DistributorError> {
        if input.is_empty() {
            return Err(DistributorError::EmptyInput);
        }
        let max = self.config.effective_max_records();
        if input.len() > max {
            return Err(DistributorError::TooManyRecords {
                count: input.len(),
                max,
            });
        }

        let mut by_account: BTreeMap<Address, U256> = BTreeMap::new();
        for entry in input.into_balances() {
            let account = parse_account(&entry.account)?;
            let Entry::Vacant(slot) = by_account.entry(account) else {
                return Err(DistributorError::DuplicateAddress(account));
            };
            slot.insert(parse_amount(&entry.account, &entry.amount)?);
        }

        debug!(records = by_account.len(), "Validated balances");

        Ok(by_account
            .into_iter()
            .map(|(account, amount)| BalanceRecord { account, amount })
            .collect())
    }
}
