//! Linked call submission
//!
//! Forwards `ethWallet.call(call, eth_address, signature)` to the target
//! chain. The pallet checks the signature against `{call, nonce}` itself, so
//! the extrinsic is unsigned. No retries and no waiting for inclusion happen
//! here.
//!
//! ## Unsigned Extrinsic Layout (version 4)
//!
//! ```text
//! compact(len) | 0x04 | eth_wallet_call_index (2) | call | eth_address (20) | signature (65)
//! ```

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::call::{Call, CallIndex};
use crate::codec::encode_compact_to;
use crate::error::SubmissionError;
use crate::types::{Signature, SourceAddress, SubmissionHandle};

/// Transaction format version 4, no signature bit
pub const UNSIGNED_EXTRINSIC_VERSION: u8 = 0x04;

/// Write access to the target chain
#[async_trait]
pub trait ChainSubmission: Send + Sync {
    async fn submit_signed_call(
        &self,
        call: &Call,
        address: &SourceAddress,
        signature: &Signature,
    ) -> Result<SubmissionHandle, SubmissionError>;
}

/// Encode the arguments of `ethWallet.call` behind its dispatch index
pub fn encode_eth_wallet_call(
    eth_wallet_call: CallIndex,
    call: &Call,
    address: &SourceAddress,
    signature: &Signature,
) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&eth_wallet_call.to_bytes());
    call.encode_to(&mut out);
    out.extend_from_slice(address.as_bytes());
    out.extend_from_slice(signature.as_bytes());
    out
}

/// Wrap an encoded call into a length-prefixed unsigned extrinsic
pub fn encode_unsigned_extrinsic(encoded_call: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(1 + encoded_call.len());
    body.push(UNSIGNED_EXTRINSIC_VERSION);
    body.extend_from_slice(encoded_call);

    let mut out = Vec::with_capacity(body.len() + 4);
    encode_compact_to(body.len() as u128, &mut out);
    out.extend_from_slice(&body);
    out
}

/// Forwards signed calls to the chain's submission interface
#[derive(Clone)]
pub struct CallSubmitter {
    chain: Arc<dyn ChainSubmission>,
}

impl CallSubmitter {
    pub fn new(chain: Arc<dyn ChainSubmission>) -> Self {
        Self { chain }
    }

    /// Submit once and return the node's handle; rejections are surfaced as-is
    pub async fn submit(
        &self,
        call: &Call,
        address: &SourceAddress,
        signature: &Signature,
    ) -> Result<SubmissionHandle, SubmissionError> {
        match self.chain.submit_signed_call(call, address, signature).await {
            Ok(handle) => {
                info!(address = %address, tx_hash = %handle, "Linked call submitted");
                Ok(handle)
            }
            Err(e) => {
                warn!(address = %address, error = %e, "Linked call submission failed");
                Err(e)
            }
        }
    }
}
