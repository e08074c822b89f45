//! Signature-derived CENNZnet Addresses
//!
//! CENNZnet maps an Ethereum key to an account without the key ever being
//! transmitted: the public key is recovered from a `personal_sign` signature.
//!
//! ## Derivation
//!
//! 1. Digest the signed bytes with the wallet's convention (EIP-191 by default)
//! 2. Recover the secp256k1 public key from `(digest, r, s, v)`
//! 3. Compress it to 33 bytes (parity byte + x coordinate)
//! 4. `blake2b-256` of the compressed key is the account id
//! 5. SS58-encode the account id
//!
//! The chain only ever computes the compressed form, so step 3 is load-bearing.
//!
//! ## Known Limitation
//!
//! A signature that is valid for a *different* message still recovers a key,
//! just not the signer's. No error is raised here; the chain's verifier is
//! the component that detects the mismatch.

use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use tracing::debug;

use crate::address_codec::{TargetAddress, MAX_SS58_FORMAT};
use crate::error::RecoveryError;
use crate::hash::{blake2_256, keccak256, personal_message_hash};
use crate::types::{AccountId, Signature, SourceAddress};

/// Length of a SEC1 compressed secp256k1 point
pub const COMPRESSED_PUBLIC_KEY_LENGTH: usize = 33;

// ============================================================================
// Digest Convention
// ============================================================================

/// How the signing oracle hashes a message before signing it.
///
/// Recovery must use the same convention the oracle used, otherwise it yields
/// an unrelated (but valid-looking) key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DigestConvention {
    /// EIP-191 `personal_sign`: keccak256 over the prefixed message
    #[default]
    PersonalMessage,
    /// keccak256 over the raw message, as `eth_sign` on a pre-hashed payload
    Keccak256,
}

impl DigestConvention {
    pub fn digest(&self, message: &[u8]) -> [u8; 32] {
        match self {
            DigestConvention::PersonalMessage => personal_message_hash(message),
            DigestConvention::Keccak256 => keccak256(message),
        }
    }
}

// ============================================================================
// Public Key Recovery
// ============================================================================

/// Public key recovered from a signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredPublicKey(VerifyingKey);

impl RecoveredPublicKey {
    /// 33-byte SEC1 compressed encoding
    pub fn compressed(&self) -> [u8; COMPRESSED_PUBLIC_KEY_LENGTH] {
        let point = self.0.as_affine().to_encoded_point(true);
        let mut out = [0u8; COMPRESSED_PUBLIC_KEY_LENGTH];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Ethereum address of this key (last 20 bytes of keccak256 of the uncompressed point)
    pub fn eth_address(&self) -> SourceAddress {
        let point = self.0.as_affine().to_encoded_point(false);
        let hash = keccak256(&point.as_bytes()[1..]);
        let mut address = [0u8; 20];
        address.copy_from_slice(&hash[12..]);
        SourceAddress(address)
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.0
    }
}

impl From<VerifyingKey> for RecoveredPublicKey {
    fn from(key: VerifyingKey) -> Self {
        RecoveredPublicKey(key)
    }
}

/// Map the signature's `v` byte to a recovery id.
///
/// Accepts raw parity (`0`, `1`) and Electrum notation (`27`, `28`).
pub fn recovery_id_from_v(v: u8) -> Result<RecoveryId, RecoveryError> {
    let is_y_odd = match v {
        0 | 27 => false,
        1 | 28 => true,
        other => return Err(RecoveryError::InvalidRecoveryId(other)),
    };
    Ok(RecoveryId::new(is_y_odd, false))
}

/// Recover the signer's public key from a 32-byte digest and a 65-byte signature
pub fn recover_public_key(
    digest: &[u8; 32],
    signature: &Signature,
) -> Result<RecoveredPublicKey, RecoveryError> {
    let mut recovery_id = recovery_id_from_v(signature.v())?;

    // Rejects r or s equal to zero or not below the curve order
    let mut ecdsa_sig = EcdsaSignature::from_slice(signature.rs())
        .map_err(|e| RecoveryError::InvalidSignature(e.to_string()))?;

    // k256 only verifies low-s; (r, n - s) is the same signature with R negated
    if let Some(normalized) = ecdsa_sig.normalize_s() {
        ecdsa_sig = normalized;
        recovery_id = RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced());
    }

    let key = VerifyingKey::recover_from_prehash(digest, &ecdsa_sig, recovery_id)
        .map_err(|e| RecoveryError::RecoveryFailed(e.to_string()))?;

    Ok(RecoveredPublicKey(key))
}

/// CENNZnet account id of a compressed public key
pub fn account_id_from_public_key(compressed: &[u8; COMPRESSED_PUBLIC_KEY_LENGTH]) -> AccountId {
    AccountId(blake2_256(compressed))
}

// ============================================================================
// Address Deriver
// ============================================================================

/// Everything derived from one `(message, signature)` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedIdentity {
    pub public_key: [u8; COMPRESSED_PUBLIC_KEY_LENGTH],
    pub account_id: AccountId,
    pub address: TargetAddress,
}

impl DerivedIdentity {
    pub fn public_key_hex(&self) -> String {
        format!("0x{}", hex::encode(self.public_key))
    }
}

/// Derives CENNZnet addresses from Ethereum signatures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressDeriver {
    ss58_format: u16,
    convention: DigestConvention,
}

impl Default for AddressDeriver {
    fn default() -> Self {
        Self {
            ss58_format: crate::address_codec::DEFAULT_SS58_FORMAT,
            convention: DigestConvention::default(),
        }
    }
}

impl AddressDeriver {
    /// Create a deriver rendering addresses with the given SS58 format
    pub fn new(ss58_format: u16) -> eyre::Result<Self> {
        if ss58_format > MAX_SS58_FORMAT {
            return Err(eyre::eyre!("SS58 format out of range: {}", ss58_format));
        }
        Ok(Self {
            ss58_format,
            ..Self::default()
        })
    }

    /// Use a different message digest convention
    pub fn with_convention(mut self, convention: DigestConvention) -> Self {
        self.convention = convention;
        self
    }

    /// Derive the target address for the signer of `message`
    pub fn derive(
        &self,
        message: &[u8],
        signature: &Signature,
    ) -> Result<TargetAddress, RecoveryError> {
        self.derive_identity(message, signature)
            .map(|identity| identity.address)
    }

    /// Derive the compressed key, account id and address for the signer of `message`
    pub fn derive_identity(
        &self,
        message: &[u8],
        signature: &Signature,
    ) -> Result<DerivedIdentity, RecoveryError> {
        let digest = self.convention.digest(message);
        let public_key = recover_public_key(&digest, signature)?.compressed();
        let account_id = account_id_from_public_key(&public_key);
        let address = TargetAddress {
            account_id,
            ss58_format: self.ss58_format,
        };

        debug!(
            digest = %hex::encode(digest),
            public_key = %hex::encode(public_key),
            account_id = %account_id,
            address = %address,
            "Derived target address from signature"
        );

        Ok(DerivedIdentity {
            public_key,
            account_id,
            address,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::SigningKey;

    const ANVIL0_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const ANVIL0_COMPRESSED: &str =
        "038318535b54105d4a7aae60c08fc45f9687181b4fdfc625bd1a753fa7397fed75";
    const ANVIL0_SS58: &str = "5EGynCAEvv8NLeHx8vDMvb8hTcEcMYUMWCDQEEncNEfNWB2W";

    fn anvil0() -> SigningKey {
        SigningKey::from_slice(&hex::decode(ANVIL0_KEY).unwrap()).unwrap()
    }

    fn sign_digest(key: &SigningKey, digest: &[u8; 32], v_offset: u8) -> Signature {
        let (sig, recid) = key.sign_prehash_recoverable(digest).unwrap();
        let mut raw = [0u8; 65];
        raw[..64].copy_from_slice(&sig.to_bytes());
        raw[64] = recid.to_byte() + v_offset;
        Signature(raw)
    }

    fn sign_message(key: &SigningKey, message: &[u8]) -> Signature {
        sign_digest(key, &personal_message_hash(message), 27)
    }

    #[test]
    fn test_recovered_key_matches_signer() {
        let key = anvil0();
        let digest = personal_message_hash(b"hello world");
        let sig = sign_digest(&key, &digest, 27);

        let recovered = recover_public_key(&digest, &sig).unwrap();
        assert_eq!(hex::encode(recovered.compressed()), ANVIL0_COMPRESSED);
        assert_eq!(recovered.verifying_key(), key.verifying_key());
        assert_eq!(
            recovered.eth_address().to_hex(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn test_eth_address_matches_alloy() {
        let key = anvil0();
        let recovered = RecoveredPublicKey::from(key.verifying_key().clone());
        let alloy_addr = alloy::primitives::Address::from_public_key(key.verifying_key());
        assert_eq!(recovered.eth_address(), SourceAddress::from(alloy_addr));
    }

    #[test]
    fn test_derive_pinned_address() {
        let message = hex::decode("00012c68656c6c6f20776f726c6400000000").unwrap();
        let sig = sign_message(&anvil0(), &message);

        let identity = AddressDeriver::default()
            .derive_identity(&message, &sig)
            .unwrap();
        assert_eq!(hex::encode(identity.public_key), ANVIL0_COMPRESSED);
        assert_eq!(
            identity.account_id.to_hex(),
            "0x61d50346eed10404dbbf5854e7f0ce6d23c8f2aec63503283a190a4c330bbccf"
        );
        assert_eq!(identity.address.to_ss58(), ANVIL0_SS58);
    }

    #[test]
    fn test_derive_is_deterministic() {
        let sig = sign_message(&anvil0(), b"hello world");
        let deriver = AddressDeriver::default();
        let first = deriver.derive(b"hello world", &sig).unwrap();
        let second = deriver.derive(b"hello world", &sig).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_v_notations_are_equivalent() {
        let key = anvil0();
        let digest = personal_message_hash(b"hello world");
        let electrum = sign_digest(&key, &digest, 27);
        let raw = sign_digest(&key, &digest, 0);

        let a = recover_public_key(&digest, &electrum).unwrap();
        let b = recover_public_key(&digest, &raw).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_out_of_range_v_rejected() {
        let mut sig = sign_message(&anvil0(), b"hello world");
        for v in [2u8, 3, 26, 29, 35, 36, 255] {
            sig.0[64] = v;
            assert_eq!(
                AddressDeriver::default().derive(b"hello world", &sig),
                Err(RecoveryError::InvalidRecoveryId(v))
            );
        }
    }

    #[test]
    fn test_zero_scalars_rejected() {
        let mut raw = [0u8; 65];
        raw[64] = 27;
        let result = AddressDeriver::default().derive(b"hello world", &Signature(raw));
        assert!(matches!(result, Err(RecoveryError::InvalidSignature(_))));
    }

    #[test]
    fn test_scalar_above_order_rejected() {
        let mut sig = sign_message(&anvil0(), b"hello world");
        sig.0[..32].copy_from_slice(&[0xff; 32]);
        let result = AddressDeriver::default().derive(b"hello world", &sig);
        assert!(matches!(result, Err(RecoveryError::InvalidSignature(_))));
    }

    #[test]
    fn test_high_s_signature_is_normalized() {
        let key = anvil0();
        let digest = personal_message_hash(b"hello world");
        let (sig, recid) = key.sign_prehash_recoverable(&digest).unwrap();

        let (r, s) = sig.split_scalars();
        let high = EcdsaSignature::from_scalars(r, -s).unwrap();
        assert!(high.normalize_s().is_some());

        let mut raw = [0u8; 65];
        raw[..64].copy_from_slice(&high.to_bytes());
        raw[64] = 27 + (1 - recid.to_byte());

        let recovered = recover_public_key(&digest, &Signature(raw)).unwrap();
        assert_eq!(hex::encode(recovered.compressed()), ANVIL0_COMPRESSED);
    }

    #[test]
    fn test_wrong_message_gives_different_address() {
        let sig = sign_message(&anvil0(), b"message one");
        let deriver = AddressDeriver::default();

        let right = deriver.derive(b"message one", &sig).unwrap();
        let wrong = deriver.derive(b"message two", &sig).unwrap();
        assert_eq!(right.to_ss58(), ANVIL0_SS58);
        assert_ne!(right, wrong);
    }

    #[test]
    fn test_wrong_convention_gives_different_address() {
        let sig = sign_message(&anvil0(), b"hello world");
        let deriver = AddressDeriver::default().with_convention(DigestConvention::Keccak256);
        let derived = deriver.derive(b"hello world", &sig).unwrap();
        assert_ne!(derived.to_ss58(), ANVIL0_SS58);
    }

    #[test]
    fn test_keccak_convention_roundtrip() {
        let key = anvil0();
        let sig = sign_digest(&key, &keccak256(b"hello world"), 27);
        let deriver = AddressDeriver::default().with_convention(DigestConvention::Keccak256);
        assert_eq!(
            deriver.derive(b"hello world", &sig).unwrap().to_ss58(),
            ANVIL0_SS58
        );
    }

    #[test]
    fn test_ss58_format_applied() {
        let sig = sign_message(&anvil0(), b"hello world");
        let deriver = AddressDeriver::new(0).unwrap();
        assert_eq!(
            deriver.derive(b"hello world", &sig).unwrap().to_ss58(),
            "13DGvXRJnhPqnBJU6ZGN4jxrKEEG3r2VagwtPXmxvKgtgMtS"
        );
        assert!(AddressDeriver::new(MAX_SS58_FORMAT + 1).is_err());
    }

    #[test]
    fn test_recovery_id_from_v() {
        assert!(!recovery_id_from_v(0).unwrap().is_y_odd());
        assert!(recovery_id_from_v(1).unwrap().is_y_odd());
        assert!(!recovery_id_from_v(27).unwrap().is_y_odd());
        assert!(recovery_id_from_v(28).unwrap().is_y_odd());
        assert_eq!(
            recovery_id_from_v(4),
            Err(RecoveryError::InvalidRecoveryId(4))
        );
    }
}
