//! Runtime calls issued through the `ethWallet` pallet
//!
//! The set of calls is closed: each variant knows its own byte encoding, so no
//! metadata registry is needed to build a payload.

use eyre::{eyre, Result};
use std::fmt;
use std::str::FromStr;

use crate::codec::encode_bytes_to;

// ============================================================================
// Call Index
// ============================================================================

/// Dispatch index of a call: pallet index followed by call index within the pallet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallIndex {
    pub pallet: u8,
    pub call: u8,
}

impl CallIndex {
    /// `system.remark` on CENNZnet
    pub const SYSTEM_REMARK: CallIndex = CallIndex::new(0, 1);

    pub const fn new(pallet: u8, call: u8) -> Self {
        Self { pallet, call }
    }

    pub fn to_bytes(&self) -> [u8; 2] {
        [self.pallet, self.call]
    }

    /// Parse from a 2-byte hex string such as `0x0001`
    pub fn from_hex(hex: &str) -> Result<Self> {
        let hex = hex.trim().strip_prefix("0x").unwrap_or(hex.trim());
        let bytes = hex::decode(hex).map_err(|e| eyre!("Invalid call index hex: {}", e))?;
        match bytes.as_slice() {
            [pallet, call] => Ok(Self::new(*pallet, *call)),
            _ => Err(eyre!(
                "Call index must be 2 bytes (pallet, call), got {}",
                bytes.len()
            )),
        }
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }
}

impl fmt::Display for CallIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for CallIndex {
    type Err = eyre::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

// ============================================================================
// Call
// ============================================================================

/// A runtime call wrapped by `ethWallet.call`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// `system.remark(Vec<u8>)`
    Remark { index: CallIndex, message: Vec<u8> },
    /// A call that is already SCALE-encoded, passed through verbatim
    Encoded(Vec<u8>),
}

impl Call {
    /// `system.remark` with the default CENNZnet dispatch index
    pub fn remark(message: impl Into<Vec<u8>>) -> Self {
        Self::remark_with_index(CallIndex::SYSTEM_REMARK, message)
    }

    pub fn remark_with_index(index: CallIndex, message: impl Into<Vec<u8>>) -> Self {
        Call::Remark {
            index,
            message: message.into(),
        }
    }

    /// Append the SCALE encoding of this call
    pub fn encode_to(&self, out: &mut Vec<u8>) {
        match self {
            Call::Remark { index, message } => {
                out.extend_from_slice(&index.to_bytes());
                encode_bytes_to(message, out);
            }
            Call::Encoded(bytes) => out.extend_from_slice(bytes),
        }
    }

    /// SCALE encoding of this call
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_to(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remark_encoding() {
        let call = Call::remark("hello world");
        assert_eq!(
            hex::encode(call.encode()),
            "00012c68656c6c6f20776f726c64"
        );
    }

    #[test]
    fn test_remark_custom_index() {
        let call = Call::remark_with_index(CallIndex::new(0, 0), vec![0xaa]);
        assert_eq!(call.encode(), vec![0x00, 0x00, 0x04, 0xaa]);
    }

    #[test]
    fn test_encoded_passthrough() {
        let call = Call::Encoded(vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(call.encode(), vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn test_call_index_hex() {
        let index = CallIndex::from_hex("0x1600").unwrap();
        assert_eq!(index, CallIndex::new(0x16, 0x00));
        assert_eq!(index.to_hex(), "0x1600");
        assert_eq!("0001".parse::<CallIndex>().unwrap(), CallIndex::SYSTEM_REMARK);
    }

    #[test]
    fn test_call_index_rejects_wrong_length() {
        assert!(CallIndex::from_hex("0x01").is_err());
        assert!(CallIndex::from_hex("0x010203").is_err());
        assert!(CallIndex::from_hex("0xgg00").is_err());
    }
}
