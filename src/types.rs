//! Common types for the wallet linking flow
//!
//! Identifiers on both sides of the link: the Ethereum source address, the
//! replay nonce, the 65-byte recoverable signature, and the CENNZnet account id.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RecoveryError;

/// Replay-protection counter kept by the `ethWallet` pallet for each source address
pub type Nonce = u32;

// ============================================================================
// Source Address (20 bytes)
// ============================================================================

/// Ethereum EOA address (20 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceAddress(pub [u8; 20]);

impl SourceAddress {
    /// Create from hex string (with or without 0x prefix)
    pub fn from_hex(hex: &str) -> Result<Self, eyre::Error> {
        let raw = crate::address_codec::parse_evm_address(hex)?;
        Ok(SourceAddress(raw))
    }

    /// Convert to lowercase hex string with 0x prefix
    pub fn to_hex(&self) -> String {
        crate::address_codec::encode_evm_address(&self.0)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for SourceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for SourceAddress {
    type Err = eyre::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; 20]> for SourceAddress {
    fn from(bytes: [u8; 20]) -> Self {
        SourceAddress(bytes)
    }
}

impl From<alloy::primitives::Address> for SourceAddress {
    fn from(address: alloy::primitives::Address) -> Self {
        SourceAddress(address.0 .0)
    }
}

// ============================================================================
// Recoverable Signature (65 bytes)
// ============================================================================

/// Length of an `r || s || v` recoverable signature
pub const SIGNATURE_LENGTH: usize = 65;

/// secp256k1 recoverable signature as returned by `personal_sign`
///
/// Layout: `r (32) || s (32) || v (1)`. The bytes are kept exactly as the
/// oracle produced them; `v` is interpreted during recovery.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature(pub [u8; SIGNATURE_LENGTH]);

impl Signature {
    /// Create from a slice, which must be exactly 65 bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, RecoveryError> {
        let raw: [u8; SIGNATURE_LENGTH] = bytes
            .try_into()
            .map_err(|_| RecoveryError::InvalidLength(bytes.len()))?;
        Ok(Signature(raw))
    }

    /// Create from hex string (with or without 0x prefix)
    pub fn from_hex(hex: &str) -> Result<Self, RecoveryError> {
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        let bytes = hex::decode(hex).map_err(|e| RecoveryError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Convert to hex string with 0x prefix
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// The 64-byte `r || s` part
    pub fn rs(&self) -> &[u8] {
        &self.0[..64]
    }

    /// The trailing recovery byte
    pub fn v(&self) -> u8 {
        self.0[64]
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.to_hex())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Signature {
    type Err = RecoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

// ============================================================================
// CENNZnet Account Id (32 bytes)
// ============================================================================

/// CENNZnet account id: blake2-256 of the compressed secp256k1 public key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub [u8; 32]);

impl AccountId {
    /// Convert to hex string with 0x prefix
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<[u8; 32]> for AccountId {
    fn from(bytes: [u8; 32]) -> Self {
        AccountId(bytes)
    }
}

// ============================================================================
// Submission Handle
// ============================================================================

/// Extrinsic hash returned by the node after `author_submitExtrinsic`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmissionHandle {
    pub tx_hash: [u8; 32],
}

impl SubmissionHandle {
    /// Convert the hash to hex string with 0x prefix
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.tx_hash))
    }
}

impl fmt::Display for SubmissionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
