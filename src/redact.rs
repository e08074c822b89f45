//! Key material that stays out of logs.
//!
//! [`SecretKey`] holds the Ethereum private key the local oracle signs with.
//! It is validated once at load time and prints as `<redacted>` through both
//! `Debug` and `Display`, so it can sit inside a logged config.

use eyre::{eyre, Result};
use std::fmt;
use std::str::FromStr;

const REDACTED: &str = "<redacted>";

/// Length of a secp256k1 private key in bytes
pub const SECRET_KEY_LENGTH: usize = 32;

/// A secp256k1 private key in hex, with or without `0x`
///
/// # Example
///
/// ```
/// use eth_wallet_link::redact::SecretKey;
///
/// let key: SecretKey = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
///     .parse()
///     .unwrap();
/// assert_eq!(format!("{:?}", key), "<redacted>");
/// assert_eq!(key.expose().len(), 66);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(String);

impl SecretKey {
    /// Validate `hex` as a 32-byte key. The error never echoes the input.
    pub fn parse(hex: &str) -> Result<Self> {
        let trimmed = hex.trim();
        let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);

        if digits.len() != SECRET_KEY_LENGTH * 2 {
            return Err(eyre!(
                "Private key must be {} hex characters, got {}",
                SECRET_KEY_LENGTH * 2,
                digits.len()
            ));
        }
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(eyre!("Private key must be hex"));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// The key text, for the one call site that builds a signer
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl FromStr for SecretKey {
    type Err = eyre::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl fmt::Display for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}
