//! Hash functions used on both sides of the link
//!
//! - keccak-256 and the EIP-191 personal message digest, which is what a
//!   wallet hashes before it signs a `personal_sign` request
//! - blake2b-256, which CENNZnet applies to a compressed public key to obtain
//!   the account id
//! - blake2b-512, used for the SS58 checksum

use blake2::digest::consts::U32;
use blake2::{Blake2b, Blake2b512, Digest};
use tiny_keccak::{Hasher, Keccak};

type Blake2b256 = Blake2b<U32>;

/// Prefix of the EIP-191 version 0x45 ("E") personal message
pub const PERSONAL_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n";

/// Compute keccak256 hash of data
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}

/// Compute the EIP-191 personal message digest
///
/// ```text
/// keccak256("\x19Ethereum Signed Message:\n" || len(message) as decimal || message)
/// ```
///
/// Matches `ethers.utils.hashMessage` and the wallet `personal_sign` method.
pub fn personal_message_hash(message: &[u8]) -> [u8; 32] {
    let len = message.len().to_string();
    let mut hasher = Keccak::v256();
    hasher.update(PERSONAL_MESSAGE_PREFIX);
    hasher.update(len.as_bytes());
    hasher.update(message);
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}

/// Compute blake2b hash with a 32-byte output
pub fn blake2_256(data: &[u8]) -> [u8; 32] {
    Blake2b256::digest(data).into()
}

/// Compute blake2b hash with a 64-byte output
pub fn blake2_512(data: &[u8]) -> [u8; 64] {
    let digest = Blake2b512::digest(data);
    let mut output = [0u8; 64];
    output.copy_from_slice(&digest);
    output
}
