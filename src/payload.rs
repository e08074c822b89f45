//! Signable payload construction
//!
//! The `ethWallet` pallet verifies a signature over the SCALE encoding of
//!
//! ```text
//! ethWalletCall { call: Call, nonce: u32 }
//! ```
//!
//! Field order is call then nonce. A single byte of difference makes the
//! on-chain signature check fail, or worse, verify against a different call.

use crate::call::Call;
use crate::codec::encode_u32_to;
use crate::types::Nonce;

/// The `{call, nonce}` tuple bound into a signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignablePayload {
    pub call: Call,
    pub nonce: Nonce,
}

impl SignablePayload {
    pub fn new(call: Call, nonce: Nonce) -> Self {
        Self { call, nonce }
    }

    /// Canonical byte form, identical to what the chain's verifier rebuilds
    pub fn encode(&self) -> Vec<u8> {
        build_payload(&self.call, self.nonce)
    }
}

/// Serialize `{call, nonce}` into the bytes the signing oracle must sign
pub fn build_payload(call: &Call, nonce: Nonce) -> Vec<u8> {
    let mut out = Vec::new();
    call.encode_to(&mut out);
    encode_u32_to(nonce, &mut out);
    out
}
