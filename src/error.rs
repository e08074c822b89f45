//! Error types for the wallet linking flow
//!
//! Every failure is returned to the caller with its kind. Nothing in this
//! crate retries on its own: fetching a new nonce and re-signing is a new
//! attempt, and that decision belongs to the caller.

use std::time::Duration;
use thiserror::Error;

/// Failure reading state from the target chain
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChainQueryError {
    #[error("chain query transport error: {0}")]
    Transport(String),

    #[error("malformed chain query response: {0}")]
    Malformed(String),

    #[error("chain query rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
}

/// Failure obtaining a signature (or account) from the signing oracle
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OracleError {
    #[error("signature request rejected by user")]
    UserRejected,

    #[error("signature request timed out after {0:?}")]
    TimedOut(Duration),

    #[error("signing oracle unavailable: {0}")]
    Unavailable(String),
}

/// Malformed signature input to public key recovery
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecoveryError {
    #[error("invalid signature length: expected 65 bytes, got {0}")]
    InvalidLength(usize),

    #[error("invalid recovery id: v = {0}")]
    InvalidRecoveryId(u8),

    #[error("invalid signature scalars: {0}")]
    InvalidSignature(String),

    #[error("public key recovery failed: {0}")]
    RecoveryFailed(String),

    #[error("invalid signature hex: {0}")]
    InvalidHex(String),
}

/// Failure forwarding the signed call to the target chain
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmissionError {
    #[error("extrinsic rejected {code}: {message}")]
    Rejected { code: i64, message: String },

    #[error("submission transport error: {0}")]
    Transport(String),

    #[error("malformed submission response: {0}")]
    Malformed(String),
}

/// Coarse classification of a [`LinkError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ChainQuery,
    UserRejected,
    SigningTimedOut,
    OracleUnavailable,
    Recovery,
    Submission,
}

/// Any failure of a link attempt
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinkError {
    #[error(transparent)]
    ChainQuery(#[from] ChainQueryError),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Recovery(#[from] RecoveryError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

impl LinkError {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            LinkError::ChainQuery(_) => ErrorKind::ChainQuery,
            LinkError::Oracle(OracleError::UserRejected) => ErrorKind::UserRejected,
            LinkError::Oracle(OracleError::TimedOut(_)) => ErrorKind::SigningTimedOut,
            LinkError::Oracle(OracleError::Unavailable(_)) => ErrorKind::OracleUnavailable,
            LinkError::Recovery(_) => ErrorKind::Recovery,
            LinkError::Submission(_) => ErrorKind::Submission,
        }
    }

    /// Whether the caller may start a new attempt after backing off.
    ///
    /// Only chain query failures are transient. A new attempt always fetches
    /// a new nonce and asks for a new signature.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LinkError::ChainQuery(_))
    }
}
