//! Linking flow
//!
//! One attempt runs:
//!
//! 1. Resolve the source account from the oracle (or take a known one)
//! 2. Read the current nonce for it
//! 3. Build the payload `encode(call) ‖ nonce_le`
//! 4. Ask the oracle to sign the payload
//! 5. Derive the target address from the signature
//! 6. Submit `ethWallet.call(call, address, signature)`
//!
//! Steps 1-5 produce a [`SignedCall`], which step 6 consumes. No step retries.
//! An oracle rejection ends the attempt before anything reaches the chain.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::address_codec::TargetAddress;
use crate::call::Call;
use crate::derive::{AddressDeriver, DerivedIdentity};
use crate::error::{LinkError, OracleError};
use crate::nonce::NonceTracker;
use crate::oracle::SigningOracle;
use crate::payload::build_payload;
use crate::submit::CallSubmitter;
use crate::types::{Nonce, Signature, SourceAddress, SubmissionHandle};

/// A call authorized by the source account for exactly one nonce.
///
/// Not `Clone`. Submitting consumes it.
#[derive(Debug)]
pub struct SignedCall {
    source: SourceAddress,
    call: Call,
    nonce: Nonce,
    payload: Vec<u8>,
    signature: Signature,
    identity: DerivedIdentity,
}

impl SignedCall {
    pub fn source(&self) -> SourceAddress {
        self.source
    }

    pub fn call(&self) -> &Call {
        &self.call
    }

    pub fn nonce(&self) -> Nonce {
        self.nonce
    }

    /// The exact bytes the oracle signed
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn identity(&self) -> &DerivedIdentity {
        &self.identity
    }

    pub fn target(&self) -> TargetAddress {
        self.identity.address
    }
}

/// Result of a submitted link attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOutcome {
    pub source: SourceAddress,
    pub target: TargetAddress,
    pub nonce: Nonce,
    pub signature: Signature,
    pub public_key: [u8; 33],
    pub tx: SubmissionHandle,
}

/// Orchestrates nonce lookup, signing, derivation and submission
#[derive(Clone)]
pub struct Linker {
    nonces: NonceTracker,
    oracle: Arc<dyn SigningOracle>,
    deriver: AddressDeriver,
    submitter: CallSubmitter,
}

impl Linker {
    pub fn new(
        nonces: NonceTracker,
        oracle: Arc<dyn SigningOracle>,
        deriver: AddressDeriver,
        submitter: CallSubmitter,
    ) -> Self {
        Self {
            nonces,
            oracle,
            deriver,
            submitter,
        }
    }

    /// Authorize `call` for the account the oracle exposes
    pub async fn authorize(&self, call: Call) -> Result<SignedCall, LinkError> {
        let source = self.oracle.account().await?;
        self.authorize_as(source, call).await
    }

    /// Authorize `call` for a known source account
    pub async fn authorize_as(
        &self,
        source: SourceAddress,
        call: Call,
    ) -> Result<SignedCall, LinkError> {
        // Read right before signing so the payload binds the live nonce
        let nonce = self.nonces.current_nonce(&source).await?;
        let payload = build_payload(&call, nonce);

        debug!(
            address = %source,
            nonce,
            payload = %hex::encode(&payload),
            "Requesting signature"
        );

        let signature = match self.oracle.sign(&source, &payload).await {
            Ok(signature) => signature,
            Err(e) => {
                if e == OracleError::UserRejected {
                    warn!(address = %source, nonce, "Signature request rejected");
                } else {
                    warn!(address = %source, nonce, error = %e, "Signature request failed");
                }
                return Err(e.into());
            }
        };

        let identity = self.deriver.derive_identity(&payload, &signature)?;

        info!(
            address = %source,
            nonce,
            target = %identity.address,
            "Call authorized"
        );

        Ok(SignedCall {
            source,
            call,
            nonce,
            payload,
            signature,
            identity,
        })
    }

    /// Submit an authorized call
    pub async fn submit(&self, signed: SignedCall) -> Result<LinkOutcome, LinkError> {
        let tx = self
            .submitter
            .submit(&signed.call, &signed.source, &signed.signature)
            .await?;

        Ok(LinkOutcome {
            source: signed.source,
            target: signed.identity.address,
            nonce: signed.nonce,
            signature: signed.signature,
            public_key: signed.identity.public_key,
            tx,
        })
    }

    /// Authorize then submit `call` for the oracle's account
    pub async fn link(&self, call: Call) -> Result<LinkOutcome, LinkError> {
        let signed = self.authorize(call).await?;
        self.submit(signed).await
    }
}
