//! eth-wallet-link: Ethereum Wallet to CENNZnet Account Linking
//!
//! Lets an Ethereum account authorize calls on CENNZnet without holding a
//! CENNZnet key:
//!
//! - **Nonce** - replay nonce lookup through the `ChainQuery` trait
//! - **Payload** - `encode(call) ‖ nonce_le`, the exact bytes the wallet signs
//! - **Oracle** - the wallet as a `SigningOracle` (local key or channel-fronted)
//! - **Derive** - signature recovery to a compressed key, blake2 account id and SS58 address
//! - **Submit** - unsigned `ethWallet.call` extrinsics through the `ChainSubmission` trait
//! - **Link** - the flow tying these together
//! - **Client** - HTTP JSON-RPC client implementing both chain traits
//!
//! ## Usage
//!
//! ```ignore
//! let client = Arc::new(CennznetClient::new(&url, eth_wallet_call, DEFAULT_RPC_TIMEOUT)?);
//! let linker = Linker::new(
//!     NonceTracker::new(client.clone()),
//!     Arc::new(LocalKeyOracle::from_private_key(&key)?),
//!     AddressDeriver::default(),
//!     CallSubmitter::new(client),
//! );
//! let outcome = linker.link(Call::remark("hello world")).await?;
//! println!("{}", outcome.target);
//! ```

// Core modules
pub mod address_codec;
pub mod call;
pub mod codec;
pub mod error;
pub mod hash;
pub mod redact;
pub mod types;

// Flow components
pub mod derive;
pub mod link;
pub mod nonce;
pub mod oracle;
pub mod payload;
pub mod submit;

// Outer surface
pub mod client;
pub mod config;

// Re-export commonly used items at the crate root
pub use address_codec::{decode_ss58, encode_ss58, TargetAddress, DEFAULT_SS58_FORMAT};
pub use call::{Call, CallIndex};
pub use client::{CennznetClient, DEFAULT_RPC_TIMEOUT};
pub use derive::{AddressDeriver, DerivedIdentity, DigestConvention};
pub use error::{
    ChainQueryError, ErrorKind, LinkError, OracleError, RecoveryError, SubmissionError,
};
pub use link::{LinkOutcome, Linker, SignedCall};
pub use nonce::{ChainQuery, NonceTracker};
pub use oracle::{ChannelOracle, LocalKeyOracle, OracleRequest, SignRequest, SigningOracle};
pub use payload::{build_payload, SignablePayload};
pub use redact::SecretKey;
pub use submit::{CallSubmitter, ChainSubmission};
pub use types::{AccountId, Nonce, Signature, SourceAddress, SubmissionHandle};
