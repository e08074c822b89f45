//! Replay nonce lookup
//!
//! The `ethWallet` pallet owns one `u32` counter per Ethereum address and
//! bumps it when a linked call executes. The counter is read fresh before every
//! signing attempt and never incremented or cached here.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::ChainQueryError;
use crate::types::{Nonce, SourceAddress};

/// Read access to the target chain's nonce state
#[async_trait]
pub trait ChainQuery: Send + Sync {
    /// Current nonce for `address`, or `None` when the chain has no state for it
    async fn query_nonce(&self, address: &SourceAddress) -> Result<Option<Nonce>, ChainQueryError>;
}

/// Fetches the replay nonce for a source address
#[derive(Clone)]
pub struct NonceTracker {
    chain: Arc<dyn ChainQuery>,
}

impl NonceTracker {
    pub fn new(chain: Arc<dyn ChainQuery>) -> Self {
        Self { chain }
    }

    /// Current nonce for `address`.
    ///
    /// An address the chain has never seen has nonce `0`. A failed or
    /// malformed query is an error, never `0`.
    pub async fn current_nonce(&self, address: &SourceAddress) -> Result<Nonce, ChainQueryError> {
        match self.chain.query_nonce(address).await {
            Ok(Some(nonce)) => {
                debug!(address = %address, nonce, "Fetched nonce");
                Ok(nonce)
            }
            Ok(None) => {
                debug!(address = %address, "No nonce state on chain, using 0");
                Ok(0)
            }
            Err(e) => {
                warn!(address = %address, error = %e, "Nonce query failed");
                Err(e)
            }
        }
    }
}
