//! Configured proof-of-work search and the work-stamped signing flow.
//!
//! `mine` picks the sequential, bounded or parallel search from a
//! [`MinerConfig`]. `stamp` runs the search over a message, appends the nonce
//! and signs the result with a wallet.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::pow::{verify_proof, Proof, ProofOfWork, MAX_DIFFICULTY};
use crate::verify::verify_signature;
use crate::wallet::{PublicKeyPem, Wallet};

/// Default number of leading zero hex characters
pub const DEFAULT_DIFFICULTY: u32 = 4;

/// Search configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinerConfig {
    /// Required leading `'0'` hex characters
    pub difficulty: u32,
    /// Worker threads; `None` or `Some(1)` searches sequentially
    pub threads: Option<usize>,
    /// Give up after this many nonces
    pub max_attempts: Option<u64>,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            threads: None,
            max_attempts: None,
        }
    }
}

impl MinerConfig {
    /// Sequential, unbounded search at `difficulty`.
    pub fn with_difficulty(difficulty: u32) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }
}

/// Find the smallest nonce for `seed` under `config`.
pub fn mine(seed: &str, config: &MinerConfig) -> Result<Proof> {
    let pow = ProofOfWork::new(seed.as_bytes());
    let difficulty = config.difficulty;

    if difficulty > MAX_DIFFICULTY && config.max_attempts.is_none() {
        warn!(difficulty, "difficulty can never be met; search will not terminate");
    }
    debug!(
        seed,
        difficulty,
        threads = ?config.threads,
        max_attempts = ?config.max_attempts,
        "starting proof-of-work search"
    );

    let proof = match config.threads {
        #[cfg(feature = "parallel")]
        Some(threads) if threads > 1 => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()?;
            pool.install(|| match config.max_attempts {
                Some(max) => pow.find_parallel_bounded(difficulty, max),
                None => Ok(pow.find_parallel(difficulty)),
            })?
        }
        _ => match config.max_attempts {
            Some(max) => pow.find_bounded(difficulty, max)?,
            None => pow.find(difficulty),
        },
    };

    debug!(nonce = proof.nonce, digest = %proof.digest_hex(), "proof-of-work found");
    Ok(proof)
}

/// A message carrying proof of work and a signature over the stamped text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StampedMessage {
    /// Unstamped message, used as the proof-of-work seed
    pub message: String,
    /// Difficulty the proof was mined at
    pub difficulty: u32,
    /// Nonce and digest for `message`
    pub proof: Proof,
    /// Hex signature over [`signed_text`](Self::signed_text)
    pub signature: String,
}

impl StampedMessage {
    /// The text that was signed: the message followed by the decimal nonce.
    ///
    /// Unlike the search candidates, nonce 0 is appended as `"0"` too.
    pub fn signed_text(&self) -> String {
        format!("{}{}", self.message, self.proof.nonce)
    }

    /// Check the proof of work and the signature.
    pub fn verify(&self, public_key: &PublicKeyPem) -> Result<bool> {
        if !verify_proof(self.message.as_bytes(), self.difficulty, &self.proof) {
            return Ok(false);
        }
        verify_signature(public_key, &self.signed_text(), &self.signature)
    }
}

/// Mine `message`, append the nonce and sign the result with `wallet`.
pub fn stamp(wallet: &Wallet, message: &str, config: &MinerConfig) -> Result<StampedMessage> {
    let proof = mine(message, config)?;
    let mut stamped = StampedMessage {
        message: message.to_string(),
        difficulty: config.difficulty,
        proof,
        signature: String::new(),
    };
    stamped.signature = wallet.sign(&stamped.signed_text())?;
    Ok(stamped)
}
