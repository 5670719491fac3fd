//! Error types shared by the wallet, verifier and miner.

use std::fmt::Display;

use crate::pow::PowError;

/// Errors surfaced by the library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The ECDSA equation did not hold. Only returned by
    /// [`verify_signature_strict`](crate::verify_signature_strict).
    #[error("invalid signature")]
    InvalidSignature,

    /// Input that could not be decoded at all (bad hex, bad PEM, bad r/s).
    #[error("malformed {what}: {reason}")]
    MalformedInput { what: &'static str, reason: String },

    /// The RNG or the curve implementation failed.
    #[error("crypto backend failure: {0}")]
    CryptoBackend(String),

    #[error(transparent)]
    ProofOfWork(#[from] PowError),

    #[cfg(feature = "parallel")]
    #[error("failed to build search thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl Error {
    pub(crate) fn malformed(what: &'static str, reason: impl Display) -> Self {
        Error::MalformedInput {
            what,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn backend(reason: impl Display) -> Self {
        Error::CryptoBackend(reason.to_string())
    }

    /// Whether this error means the caller passed undecodable input.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::MalformedInput { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
