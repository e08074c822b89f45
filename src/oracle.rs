//! Signing Oracle Interface
//!
//! The wallet that owns the Ethereum key is external and possibly
//! interactive: a request may wait on a user for an arbitrarily long time, or
//! be rejected. This module defines the interface the linking flow consumes
//! and two implementations.
//!
//! - [`LocalKeyOracle`] - signs with an in-process private key (tooling, tests)
//! - [`ChannelOracle`] - forwards requests over a tokio channel to whatever
//!   task fronts the real wallet, and awaits the reply
//!
//! The message handed to [`SigningOracle::sign`] is the exact payload. The
//! oracle applies its own digest convention (`personal_sign` for wallets), and
//! recovery must use the same one.

use alloy::signers::{local::PrivateKeySigner, Signer};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::error::OracleError;
use crate::redact::SecretKey;
use crate::types::{Signature, SourceAddress};

/// External signer of linking payloads
#[async_trait]
pub trait SigningOracle: Send + Sync {
    /// The account the wallet exposes (`eth_requestAccounts`)
    async fn account(&self) -> Result<SourceAddress, OracleError>;

    /// Sign `message` with the key of `address` (`personal_sign`)
    async fn sign(&self, address: &SourceAddress, message: &[u8])
        -> Result<Signature, OracleError>;
}

// ============================================================================
// Local Key Oracle
// ============================================================================

/// Oracle backed by a local private key, signing with the EIP-191 convention
pub struct LocalKeyOracle {
    signer: PrivateKeySigner,
    address: SourceAddress,
}

impl std::fmt::Debug for LocalKeyOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalKeyOracle")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl LocalKeyOracle {
    /// Create from a hex private key (with or without 0x prefix)
    pub fn from_private_key(private_key: &str) -> eyre::Result<Self> {
        let signer: PrivateKeySigner = private_key
            .parse()
            .map_err(|e| eyre::eyre!("Invalid private key: {}", e))?;
        Ok(Self::from_signer(signer))
    }

    pub fn from_secret_key(key: &SecretKey) -> eyre::Result<Self> {
        Self::from_private_key(key.expose())
    }

    pub fn from_signer(signer: PrivateKeySigner) -> Self {
        let address = SourceAddress::from(signer.address());
        info!(address = %address, "Local signing oracle initialized");
        Self { signer, address }
    }

    pub fn address(&self) -> SourceAddress {
        self.address
    }

    /// Answer requests arriving on a [`ChannelOracle`] until the channel closes
    pub async fn serve(self, mut requests: mpsc::Receiver<OracleRequest>) {
        while let Some(request) = requests.recv().await {
            match request {
                OracleRequest::Account { respond_to } => {
                    let _ = respond_to.send(self.account().await);
                }
                OracleRequest::Sign(request) => {
                    let result = self.sign(&request.address, &request.message).await;
                    request.respond(result);
                }
            }
        }
        debug!(address = %self.address, "Signing oracle channel closed");
    }
}

#[async_trait]
impl SigningOracle for LocalKeyOracle {
    async fn account(&self) -> Result<SourceAddress, OracleError> {
        Ok(self.address)
    }

    async fn sign(
        &self,
        address: &SourceAddress,
        message: &[u8],
    ) -> Result<Signature, OracleError> {
        if *address != self.address {
            return Err(OracleError::Unavailable(format!(
                "no key for account {}",
                address
            )));
        }

        let signature = self
            .signer
            .sign_message(message)
            .await
            .map_err(|e| OracleError::Unavailable(format!("signing failed: {}", e)))?;

        Ok(Signature(signature.as_bytes()))
    }
}

// ============================================================================
// Channel Oracle
// ============================================================================

/// A request travelling from a [`ChannelOracle`] to the wallet front-end
#[derive(Debug)]
pub enum OracleRequest {
    Account {
        respond_to: oneshot::Sender<Result<SourceAddress, OracleError>>,
    },
    Sign(SignRequest),
}

/// A pending signature request. Dropping it without answering cancels the request.
#[derive(Debug)]
pub struct SignRequest {
    pub address: SourceAddress,
    pub message: Vec<u8>,
    respond_to: oneshot::Sender<Result<Signature, OracleError>>,
}

impl SignRequest {
    pub fn approve(self, signature: Signature) {
        self.respond(Ok(signature));
    }

    pub fn reject(self) {
        self.respond(Err(OracleError::UserRejected));
    }

    pub fn respond(self, result: Result<Signature, OracleError>) {
        // The requesting task may have timed out and gone away
        let _ = self.respond_to.send(result);
    }
}

/// Oracle that sends each request over a channel and awaits the reply
#[derive(Debug, Clone)]
pub struct ChannelOracle {
    requests: mpsc::Sender<OracleRequest>,
    timeout: Option<Duration>,
}

/// Create a [`ChannelOracle`] and the receiving end the wallet front-end serves
pub fn channel(buffer: usize) -> (ChannelOracle, mpsc::Receiver<OracleRequest>) {
    let (tx, rx) = mpsc::channel(buffer);
    (
        ChannelOracle {
            requests: tx,
            timeout: None,
        },
        rx,
    )
}

impl ChannelOracle {
    /// Fail requests that get no reply within `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    async fn roundtrip<T>(
        &self,
        request: OracleRequest,
        reply: oneshot::Receiver<Result<T, OracleError>>,
    ) -> Result<T, OracleError> {
        // One deadline covers queueing behind a full channel and the reply
        let exchange = async {
            self.requests
                .send(request)
                .await
                .map_err(|_| OracleError::Unavailable("oracle channel closed".to_string()))?;

            reply
                .await
                .map_err(|_| OracleError::Unavailable("oracle dropped the request".to_string()))?
        };

        match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, exchange)
                .await
                .map_err(|_| OracleError::TimedOut(timeout))?,
            None => exchange.await,
        }
    }
}

#[async_trait]
impl SigningOracle for ChannelOracle {
    async fn account(&self) -> Result<SourceAddress, OracleError> {
        let (tx, rx) = oneshot::channel();
        self.roundtrip(OracleRequest::Account { respond_to: tx }, rx)
            .await
    }

    async fn sign(
        &self,
        address: &SourceAddress,
        message: &[u8],
    ) -> Result<Signature, OracleError> {
        let (tx, rx) = oneshot::channel();
        let request = SignRequest {
            address: *address,
            message: message.to_vec(),
            respond_to: tx,
        };
        self.roundtrip(OracleRequest::Sign(request), rx).await
    }
}
