//! Distribution Data Model
//!
//! Raw balance input shapes, validated records, and the `DistributorInfo`
//! output document that gets published alongside the on-chain root.

use alloy::primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An amount exactly as it appears in a balance file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    /// JSON number, e.g. `100`
    Number(serde_json::Number),
    /// Decimal or `0x`-prefixed hex string
    Text(String),
}

impl From<&str> for RawAmount {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<u64> for RawAmount {
    fn from(n: u64) -> Self {
        Self::Number(n.into())
    }
}

/// One `{ account, amount }` entry of the record-list input format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBalance {
    /// Address string, any letter case
    pub account: String,
    /// Unparsed amount
    pub amount: RawAmount,
}

impl RawBalance {
    pub fn new(account: impl Into<String>, amount: impl Into<RawAmount>) -> Self {
        Self {
            account: account.into(),
            amount: amount.into(),
        }
    }
}

/// Balance input in either accepted shape.
///
/// Resolved once by the validator into [`BalanceRecord`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawInput {
    /// `[{ "account": "0x..", "amount": "0x.." }, ...]`
    RecordList(Vec<RawBalance>),
    /// Legacy `{ "0x..": amount, ... }`
    LegacyMap(BTreeMap<String, RawAmount>),
}

impl RawInput {
    /// Number of entries before validation.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::RecordList(records) => records.len(),
            Self::LegacyMap(map) => map.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten into record-list form.
    ///
    /// Legacy numeric amounts are rendered as `0x` + base-16 digits first.
    #[must_use]
    pub fn into_balances(self) -> Vec<RawBalance> {
        match self {
            Self::RecordList(records) => records,
            Self::LegacyMap(map) => map
                .into_iter()
                .map(|(account, amount)| {
                    let amount = match amount {
                        RawAmount::Number(n) => match n.as_u64() {
                            Some(v) => RawAmount::Text(format!("0x{v:x}")),
                            None => RawAmount::Number(n),
                        },
                        text @ RawAmount::Text(_) => text,
                    };
                    RawBalance { account, amount }
                })
                .collect(),
        }
    }
}

/// A validated balance: canonical account and a strictly positive amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BalanceRecord {
    /// Account address; ordering is by raw bytes
    pub account: Address,
    /// Allocation in token base units
    pub amount: U256,
}

impl BalanceRecord {
    /// EIP-55 checksummed form of the account.
    #[must_use]
    pub fn checksummed(&self) -> String {
        self.account.to_checksum(None)
    }
}

/// Everything one account needs to call `claim` on the distributor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// Leaf index, the account's position in address order
    pub index: u32,
    /// Allocation, `0x`-prefixed minimal hex
    #[serde(with = "hex_u256")]
    pub amount: U256,
    /// Sibling hashes from the leaf level upward
    #[serde(with = "proof_vec_serde")]
    pub proof: Vec<B256>,
}

/// The compiled distribution.
///
/// Sufficient on its own to rebuild the whole tree, so anyone can check
/// that every allocation is included and nothing else is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributorInfo {
    #[serde(with = "hex_b256")]
    pub merkle_root: B256,
    #[serde(with = "hex_u256")]
    pub token_total: U256,
    #[serde(with = "claims_serde")]
    pub claims: BTreeMap<Address, Claim>,
}

impl DistributorInfo {
    /// Look up the claim for an account.
    #[must_use]
    pub fn claim(&self, account: &Address) -> Option<&Claim> {
        self.claims.get(account)
    }
}

fn parse_hex_digits(s: &str) -> Option<&str> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    (!digits.is_empty()).then_some(digits)
}

// Hex encoding helpers for serde
mod hex_b256 {
    use alloy::primitives::B256;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(hash: &B256, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("0x{}", hex::encode(hash)))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<B256, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::decode_b256(&s).map_err(serde::de::Error::custom)
    }
}

fn decode_b256(s: &str) -> Result<B256, String> {
    let digits = parse_hex_digits(s).ok_or("empty hash")?;
    let bytes = hex::decode(digits).map_err(|e| e.to_string())?;
    B256::try_from(bytes.as_slice()).map_err(|_| "expected 32 bytes".to_string())
}

mod hex_u256 {
    use alloy::primitives::U256;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("0x{value:x}"))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let digits = super::parse_hex_digits(&s)
            .ok_or_else(|| serde::de::Error::custom("empty hex quantity"))?;
        U256::from_str_radix(digits, 16).map_err(serde::de::Error::custom)
    }
}

/// Custom serde for `Vec<B256>` as hex strings
mod proof_vec_serde {
    use alloy::primitives::B256;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[allow(clippy::ptr_arg)]
    pub fn serialize<S>(data: &Vec<B256>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let hex_strings: Vec<String> = data
            .iter()
            .map(|h| format!("0x{}", hex::encode(h)))
            .collect();
        hex_strings.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<B256>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_strings: Vec<String> = Vec::deserialize(deserializer)?;
        hex_strings
            .iter()
            .map(|s| super::decode_b256(s).map_err(serde::de::Error::custom))
            .collect()
    }
}

/// Claims keyed by checksummed address, emitted in address byte order.
mod claims_serde {
    use super::Claim;
    use alloy::primitives::Address;
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S>(claims: &BTreeMap<Address, Claim>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(claims.len()))?;
        for (account, claim) in claims {
            map.serialize_entry(&account.to_checksum(None), claim)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<Address, Claim>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: BTreeMap<String, Claim> = BTreeMap::deserialize(deserializer)?;
        let mut claims = BTreeMap::new();
        for (key, claim) in raw {
            let account = crate::balance::parse_account(&key).map_err(serde::de::Error::custom)?;
            if claims.insert(account, claim).is_some() {
                return Err(serde::de::Error::custom(format!(
                    "duplicate claim for {account}"
                )));
            }
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_input_record_list_json() {
        let json = r#"[{"account":"0x0000000000000000000000000000000000000001","amount":"0x64"},
                       {"account":"0x0000000000000000000000000000000000000002","amount":200}]"#;
        let input: RawInput = serde_json::from_str(json).unwrap();
        let RawInput::RecordList(records) = input else {
            panic!("expected record list");
        };
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].amount, RawAmount::from("0x64"));
        assert_eq!(records[1].amount, RawAmount::from(200));
    }

    #[test]
    fn test_raw_input_legacy_map_json() {
        let json = r#"{"0x0000000000000000000000000000000000000001": 255}"#;
        let input: RawInput = serde_json::from_str(json).unwrap();
        assert!(matches!(input, RawInput::LegacyMap(_)));
        assert_eq!(input.len(), 1);

        let balances = input.into_balances();
        assert_eq!(balances[0].amount, RawAmount::from("0xff"));
    }

    #[test]
    fn test_legacy_string_amount_kept() {
        let mut map = BTreeMap::new();
        map.insert("0xabc".to_string(), RawAmount::from("12"));
        let balances = RawInput::LegacyMap(map).into_balances();
        assert_eq!(balances[0].amount, RawAmount::from("12"));
    }

    #[test]
    fn test_distributor_info_json_shape() {
        let account = Address::with_last_byte(0xab);
        let mut claims = BTreeMap::new();
        claims.insert(
            account,
            Claim {
                index: 0,
                amount: U256::from(300),
                proof: vec![B256::repeat_byte(0xcc)],
            },
        );
        let info = DistributorInfo {
            merkle_root: B256::repeat_byte(0xaa),
            token_total: U256::from(300),
            claims,
        };

        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["merkleRoot"], format!("0x{}", "aa".repeat(32)));
        assert_eq!(value["tokenTotal"], "0x12c");

        let claim = &value["claims"][account.to_checksum(None)];
        assert_eq!(claim["index"], 0);
        assert_eq!(claim["amount"], "0x12c");
        assert_eq!(claim["proof"][0], format!("0x{}", "cc".repeat(32)));

        let decoded: DistributorInfo = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, info);
    }

    #[test]
    fn test_zero_total_serializes_as_0x0() {
        let info = DistributorInfo {
            merkle_root: B256::ZERO,
            token_total: U256::ZERO,
            claims: BTreeMap::new(),
        };
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["tokenTotal"], "0x0");
    }

    #[test]
    fn test_proof_hash_wrong_length_rejected() {
        let json = r#"{"index":0,"amount":"0x1","proof":["0xabcd"]}"#;
        assert!(serde_json::from_str::<Claim>(json).is_err());
    }
}
