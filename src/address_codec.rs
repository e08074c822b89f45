//! Address Encoding for Both Sides of the Link
//!
//! - Ethereum addresses as `0x`-prefixed hex (20 bytes)
//! - CENNZnet addresses in SS58 format
//!
//! ## SS58 Format
//!
//! ```text
//! base58( prefix (1 or 2 bytes) | account id (32 bytes) | checksum (2 bytes) )
//! ```
//!
//! The checksum is the first two bytes of
//! `blake2b-512("SS58PRE" | prefix | account id)`. Formats `0..=63` take a
//! single prefix byte, formats `64..=16383` take two.

use eyre::{eyre, Result};
use std::fmt;
use std::str::FromStr;

use crate::hash::blake2_512;
use crate::types::AccountId;

/// Generic Substrate SS58 format, the default of `@polkadot/keyring`
pub const DEFAULT_SS58_FORMAT: u16 = 42;

/// Largest format that fits the two-byte prefix
pub const MAX_SS58_FORMAT: u16 = 0b0011_1111_1111_1111;

const SS58_CHECKSUM_PREFIX: &[u8] = b"SS58PRE";
const SS58_CHECKSUM_LENGTH: usize = 2;

// ============================================================================
// Target Address
// ============================================================================

/// CENNZnet account address: an account id plus the SS58 format it renders with
///
/// Derived from a recovered public key and never stored as ground truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetAddress {
    pub account_id: AccountId,
    pub ss58_format: u16,
}

impl TargetAddress {
    /// Create with an explicit SS58 format
    pub fn new(account_id: AccountId, ss58_format: u16) -> Result<Self> {
        if ss58_format > MAX_SS58_FORMAT {
            return Err(eyre!("SS58 format out of range: {}", ss58_format));
        }
        Ok(Self {
            account_id,
            ss58_format,
        })
    }

    /// Render as an SS58 string
    pub fn to_ss58(&self) -> String {
        encode_ss58(&self.account_id.0, self.ss58_format)
    }

    /// Parse an SS58 string, validating prefix and checksum
    pub fn from_ss58(s: &str) -> Result<Self> {
        let (account, ss58_format) = decode_ss58(s)?;
        Self::new(AccountId(account), ss58_format)
    }
}

impl fmt::Display for TargetAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ss58())
    }
}

impl FromStr for TargetAddress {
    type Err = eyre::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_ss58(s)
    }
}

// ============================================================================
// SS58 Helpers
// ============================================================================

fn ss58_prefix(ss58_format: u16) -> Vec<u8> {
    let ident = ss58_format & MAX_SS58_FORMAT;
    match ident {
        0..=63 => vec![ident as u8],
        _ => {
            let first = ((ident & 0b0000_0000_1111_1100) as u8) >> 2;
            let second = ((ident >> 8) as u8) | (((ident & 0b0000_0000_0000_0011) as u8) << 6);
            vec![first | 0b0100_0000, second]
        }
    }
}

fn ss58_checksum(data: &[u8]) -> [u8; SS58_CHECKSUM_LENGTH] {
    let mut preimage = Vec::with_capacity(SS58_CHECKSUM_PREFIX.len() + data.len());
    preimage.extend_from_slice(SS58_CHECKSUM_PREFIX);
    preimage.extend_from_slice(data);
    let hash = blake2_512(&preimage);
    [hash[0], hash[1]]
}

/// Encode a 32-byte account id as SS58 with the given format
///
/// Formats above [`MAX_SS58_FORMAT`] are masked to 14 bits;
/// [`TargetAddress::new`] rejects them up front.
pub fn encode_ss58(account: &[u8; 32], ss58_format: u16) -> String {
    let mut data = ss58_prefix(ss58_format);
    data.extend_from_slice(account);
    let checksum = ss58_checksum(&data);
    data.extend_from_slice(&checksum);
    bs58::encode(data).into_string()
}

/// Decode an SS58 string to a 32-byte account id and its format
pub fn decode_ss58(s: &str) -> Result<([u8; 32], u16)> {
    let data = bs58::decode(s)
        .into_vec()
        .map_err(|e| eyre!("Invalid base58: {}", e))?;

    if data.is_empty() {
        return Err(eyre!("Empty SS58 address"));
    }

    let (prefix_len, ss58_format) = match data[0] {
        0..=63 => (1, data[0] as u16),
        64..=127 => {
            if data.len() < 2 {
                return Err(eyre!("Truncated SS58 prefix"));
            }
            let lower = (data[0] << 2) | (data[1] >> 6);
            let upper = data[1] & 0b0011_1111;
            (2, (lower as u16) | ((upper as u16) << 8))
        }
        other => return Err(eyre!("Unsupported SS58 prefix byte: {}", other)),
    };

    let expected_len = prefix_len + 32 + SS58_CHECKSUM_LENGTH;
    if data.len() != expected_len {
        return Err(eyre!(
            "Invalid SS58 length: expected {} bytes, got {}",
            expected_len,
            data.len()
        ));
    }

    let body_end = prefix_len + 32;
    let checksum = ss58_checksum(&data[..body_end]);
    if checksum[..] != data[body_end..] {
        return Err(eyre!("Invalid SS58 checksum"));
    }

    let mut account = [0u8; 32];
    account.copy_from_slice(&data[prefix_len..body_end]);
    Ok((account, ss58_format))
}

// ============================================================================
// EVM Helpers
// ============================================================================

/// Parse a 0x-prefixed hex EVM address to 20 bytes
pub fn parse_evm_address(addr: &str) -> Result<[u8; 20]> {
    let hex_str = addr.strip_prefix("0x").unwrap_or(addr);

    if hex_str.len() != 40 {
        return Err(eyre!(
            "Invalid EVM address length: expected 40 hex chars, got {}",
            hex_str.len()
        ));
    }

    let bytes = hex::decode(hex_str)?;

    let mut result = [0u8; 20];
    result.copy_from_slice(&bytes);
    Ok(result)
}

/// Encode 20 bytes to EVM hex string with 0x prefix
pub fn encode_evm_address(bytes: &[u8; 20]) -> String {
    format!("0x{}", hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANVIL0_ACCOUNT: &str = "61d50346eed10404dbbf5854e7f0ce6d23c8f2aec63503283a190a4c330bbccf";

    fn anvil0_account() -> [u8; 32] {
        let mut account = [0u8; 32];
        account.copy_from_slice(&hex::decode(ANVIL0_ACCOUNT).unwrap());
        account
    }

    #[test]
    fn test_encode_ss58_generic_format() {
        assert_eq!(
            encode_ss58(&anvil0_account(), DEFAULT_SS58_FORMAT),
            "5EGynCAEvv8NLeHx8vDMvb8hTcEcMYUMWCDQEEncNEfNWB2W"
        );
    }

    #[test]
    fn test_encode_ss58_zero_account() {
        assert_eq!(
            encode_ss58(&[0u8; 32], 42),
            "5C4hrfjw9DjXZTzV3MwzrrAr9P1MJhSrvWGWqi1eSuyUpnhM"
        );
    }

    #[test]
    fn test_encode_ss58_formats() {
        let account = anvil0_account();
        assert_eq!(
            encode_ss58(&account, 0),
            "13DGvXRJnhPqnBJU6ZGN4jxrKEEG3r2VagwtPXmxvKgtgMtS"
        );
        assert_eq!(
            encode_ss58(&account, 255),
            "yGEwnPxUqoeL7dshb8Td9HXVxozvryWYiZcZpxnShUqwieurW"
        );
    }

    #[test]
    fn test_decode_ss58_two_byte_prefix() {
        let (account, format) =
            decode_ss58("yGEwnPxUqoeL7dshb8Td9HXVxozvryWYiZcZpxnShUqwieurW").unwrap();
        assert_eq!(account, anvil0_account());
        assert_eq!(format, 255);
    }

    #[test]
    fn test_target_address_parse() {
        let addr: TargetAddress = "5EGynCAEvv8NLeHx8vDMvb8hTcEcMYUMWCDQEEncNEfNWB2W"
            .parse()
            .unwrap();
        assert_eq!(addr.account_id.0, anvil0_account());
        assert_eq!(addr.ss58_format, 42);
        assert_eq!(
            addr.to_string(),
            "5EGynCAEvv8NLeHx8vDMvb8hTcEcMYUMWCDQEEncNEfNWB2W"
        );
    }

    #[test]
    fn test_decode_ss58_rejects_bad_checksum() {
        // Last character changed
        let result = decode_ss58("5EGynCAEvv8NLeHx8vDMvb8hTcEcMYUMWCDQEEncNEfNWB2X");
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_ss58_rejects_garbage() {
        assert!(decode_ss58("").is_err());
        assert!(decode_ss58("0OIl").is_err());
        assert!(decode_ss58("5C4hrf").is_err());
    }

    #[test]
    fn test_target_address_format_range() {
        assert!(TargetAddress::new(AccountId([0u8; 32]), MAX_SS58_FORMAT).is_ok());
        assert!(TargetAddress::new(AccountId([0u8; 32]), MAX_SS58_FORMAT + 1).is_err());
    }

    #[test]
    fn test_evm_address_encode_decode() {
        let evm_addr = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
        let raw = parse_evm_address(evm_addr).unwrap();
        assert_eq!(encode_evm_address(&raw), evm_addr.to_lowercase());
        assert!(parse_evm_address("0x1234").is_err());
        assert!(parse_evm_address("0xzz9Fd6e51aad88F6F4ce6aB8827279cffFb92266").is_err());
    }
}
