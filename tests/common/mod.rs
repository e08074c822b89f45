//! Shared fixtures and mocks for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use eth_wallet_link::derive::{recover_public_key, DigestConvention};
use eth_wallet_link::{
    build_payload, AddressDeriver, Call, CallSubmitter, ChainQuery, ChainQueryError,
    ChainSubmission, Linker, LocalKeyOracle, Nonce, NonceTracker, Signature, SigningOracle,
    SourceAddress, SubmissionError, SubmissionHandle,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Anvil default account 0
pub const ANVIL0_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const ANVIL0_ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";
pub const ANVIL0_PUBLIC_KEY: &str =
    "0x038318535b54105d4a7aae60c08fc45f9687181b4fdfc625bd1a753fa7397fed75";
pub const ANVIL0_ACCOUNT_ID: &str =
    "0x61d50346eed10404dbbf5854e7f0ce6d23c8f2aec63503283a190a4c330bbccf";
pub const ANVIL0_SS58: &str = "5EGynCAEvv8NLeHx8vDMvb8hTcEcMYUMWCDQEEncNEfNWB2W";
pub const ANVIL0_SS58_FORMAT_0: &str = "13DGvXRJnhPqnBJU6ZGN4jxrKEEG3r2VagwtPXmxvKgtgMtS";

/// Anvil default account 1
pub const ANVIL1_KEY: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
pub const ANVIL1_ADDRESS: &str = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8";
pub const ANVIL1_SS58: &str = "5GnEe8MrUCL7LMLqrQbCRYys7WVhsgboNHRH67jLNyFXCamW";

/// `system.remark("hello world")` with nonce 0
pub const HELLO_WORLD_PAYLOAD_NONCE_0: &str = "00012c68656c6c6f20776f726c6400000000";

/// In-memory chain holding `ethWallet` nonces.
///
/// Submission checks the signature the way the pallet does: it must recover to
/// the submitting address over `encode(call) ‖ current_nonce`. Accepted calls
/// bump the nonce.
#[derive(Default)]
pub struct MockChain {
    nonces: Mutex<HashMap<SourceAddress, Nonce>>,
    submissions: Mutex<Vec<(Call, SourceAddress, Signature)>>,
    queries: Mutex<u32>,
    query_error: Mutex<Option<ChainQueryError>>,
}

impl MockChain {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_nonce(&self, address: SourceAddress, nonce: Nonce) {
        self.nonces.lock().unwrap().insert(address, nonce);
    }

    pub fn nonce_of(&self, address: &SourceAddress) -> Option<Nonce> {
        self.nonces.lock().unwrap().get(address).copied()
    }

    pub fn fail_queries_with(&self, error: ChainQueryError) {
        *self.query_error.lock().unwrap() = Some(error);
    }

    pub fn submissions(&self) -> Vec<(Call, SourceAddress, Signature)> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn query_count(&self) -> u32 {
        *self.queries.lock().unwrap()
    }
}

#[async_trait]
impl ChainQuery for MockChain {
    async fn query_nonce(&self, address: &SourceAddress) -> Result<Option<Nonce>, ChainQueryError> {
        *self.queries.lock().unwrap() += 1;
        if let Some(error) = self.query_error.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(self.nonce_of(address))
    }
}

#[async_trait]
impl ChainSubmission for MockChain {
    async fn submit_signed_call(
        &self,
        call: &Call,
        address: &SourceAddress,
        signature: &Signature,
    ) -> Result<SubmissionHandle, SubmissionError> {
        self.submissions
            .lock()
            .unwrap()
            .push((call.clone(), *address, *signature));

        let mut nonces = self.nonces.lock().unwrap();
        let nonce = nonces.get(address).copied().unwrap_or(0);
        let digest = DigestConvention::PersonalMessage.digest(&build_payload(call, nonce));

        let signer = recover_public_key(&digest, signature)
            .map(|key| key.eth_address())
            .ok();
        if signer != Some(*address) {
            return Err(SubmissionError::Rejected {
                code: 1010,
                message: "Invalid Transaction: Transaction has a bad signature".into(),
            });
        }

        nonces.insert(*address, nonce + 1);

        let mut tx_hash = [0u8; 32];
        tx_hash[..20].copy_from_slice(address.as_bytes());
        tx_hash[28..].copy_from_slice(&nonce.to_be_bytes());
        Ok(SubmissionHandle { tx_hash })
    }
}

/// Linker wired to `chain` and a local key
pub fn linker_with(chain: Arc<MockChain>, oracle: Arc<dyn SigningOracle>) -> Linker {
    Linker::new(
        NonceTracker::new(chain.clone()),
        oracle,
        AddressDeriver::default(),
        CallSubmitter::new(chain),
    )
}

pub fn local_oracle(key: &str) -> Arc<LocalKeyOracle> {
    Arc::new(LocalKeyOracle::from_private_key(key).expect("valid test key"))
}

pub fn address(hex: &str) -> SourceAddress {
    hex.parse().expect("valid test address")
}
