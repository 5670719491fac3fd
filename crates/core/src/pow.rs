//! Leading-zero SHA-256 nonce search.
//!
//! The searcher absorbs the seed once and clones the SHA-256 state for every
//! candidate, so each probe only hashes the nonce text and the final padding.

use alloc::string::String;
use core::fmt;

use sha2::{Digest, Sha256};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::params::*;

/// A nonce together with the digest it produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Proof {
    /// SHA-256 of the candidate for `nonce`
    #[cfg_attr(feature = "serde", serde(with = "digest_hex"))]
    pub digest: [u8; DIGEST_SIZE],
    /// Nonce that produced the digest
    pub nonce: u64,
}

impl Proof {
    /// Lowercase hex rendering of the digest (64 characters).
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }

    /// Number of leading `'0'` characters in the hex digest.
    pub fn leading_zeros(&self) -> u32 {
        leading_zero_nibbles(&self.digest)
    }
}

impl fmt::Display for Proof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.digest {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, " {}", self.nonce)
    }
}

/// Result of searching a window of nonces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOutcome {
    /// First qualifying proof in the window, if any.
    pub proof: Option<Proof>,
    /// Number of digests computed in this window.
    pub hashes_computed: u64,
}

impl SearchOutcome {
    fn not_found(hashes: u64) -> Self {
        Self {
            proof: None,
            hashes_computed: hashes,
        }
    }

    fn found(proof: Proof, hashes: u64) -> Self {
        Self {
            proof: Some(proof),
            hashes_computed: hashes,
        }
    }

    /// Whether the window contained a qualifying nonce.
    pub fn is_found(&self) -> bool {
        self.proof.is_some()
    }
}

/// Errors from the bounded search.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PowError {
    #[error("no nonce met the difficulty within {attempts} attempts")]
    NotFound { attempts: u64 },
}

/// Reusable nonce searcher for one seed.
#[derive(Clone)]
pub struct ProofOfWork {
    /// SHA-256 state after absorbing the seed
    prefix: Sha256,
}

impl ProofOfWork {
    /// Create a searcher for `seed`.
    pub fn new(seed: &[u8]) -> Self {
        Self {
            prefix: Sha256::new_with_prefix(seed),
        }
    }

    /// Digest of the candidate for `nonce`.
    ///
    /// Nonce 0 hashes the seed alone; any other nonce appends its decimal text.
    pub fn digest(&self, nonce: u64) -> [u8; DIGEST_SIZE] {
        let mut hasher = self.prefix.clone();
        if nonce != 0 {
            let mut buf = [0u8; MAX_NONCE_DIGITS];
            hasher.update(decimal(nonce, &mut buf));
        }
        let mut result = [0u8; DIGEST_SIZE];
        result.copy_from_slice(&hasher.finalize());
        result
    }

    /// Search from nonce 0 until a digest meets `difficulty`.
    ///
    /// Runs for ~16^difficulty attempts on average and never returns when
    /// `difficulty` exceeds [`MAX_DIFFICULTY`].
    pub fn find(&self, difficulty: u32) -> Proof {
        let mut nonce = 0u64;
        loop {
            let digest = self.digest(nonce);
            if meets_difficulty(&digest, difficulty) {
                return Proof { digest, nonce };
            }
            nonce += 1;
        }
    }

    /// Like [`find`](Self::find) but gives up after `max_attempts` digests.
    pub fn find_bounded(&self, difficulty: u32, max_attempts: u64) -> Result<Proof, PowError> {
        let outcome = self.search(difficulty, 0, max_attempts);
        outcome.proof.ok_or(PowError::NotFound {
            attempts: outcome.hashes_computed,
        })
    }

    /// Try the nonces `start..start + count` (saturating at `u64::MAX`).
    ///
    /// Returns the first qualifying nonce of the window. Searching consecutive
    /// windows from 0 yields the same proof as [`find`](Self::find).
    pub fn search(&self, difficulty: u32, start: u64, count: u64) -> SearchOutcome {
        let end = start.saturating_add(count);

        for nonce in start..end {
            let digest = self.digest(nonce);
            if meets_difficulty(&digest, difficulty) {
                return SearchOutcome::found(Proof { digest, nonce }, nonce - start + 1);
            }
        }

        SearchOutcome::not_found(end - start)
    }

    /// Search on the rayon pool in batches of [`PARALLEL_BATCH`] nonces.
    ///
    /// Each batch keeps the lowest qualifying nonce, so the result is the same
    /// proof the sequential search returns.
    #[cfg(feature = "parallel")]
    pub fn find_parallel(&self, difficulty: u32) -> Proof {
        let mut start = 0u64;
        loop {
            let end = start.saturating_add(PARALLEL_BATCH);
            if let Some(proof) = self.par_window(difficulty, start, end) {
                return proof;
            }
            start = end;
        }
    }

    /// Parallel search limited to the first `max_attempts` nonces.
    #[cfg(feature = "parallel")]
    pub fn find_parallel_bounded(
        &self,
        difficulty: u32,
        max_attempts: u64,
    ) -> Result<Proof, PowError> {
        let mut start = 0u64;
        while start < max_attempts {
            let end = start.saturating_add(PARALLEL_BATCH).min(max_attempts);
            if let Some(proof) = self.par_window(difficulty, start, end) {
                return Ok(proof);
            }
            start = end;
        }
        Err(PowError::NotFound {
            attempts: max_attempts,
        })
    }

    #[cfg(feature = "parallel")]
    fn par_window(&self, difficulty: u32, start: u64, end: u64) -> Option<Proof> {
        (start..end)
            .into_par_iter()
            .map(|nonce| Proof {
                digest: self.digest(nonce),
                nonce,
            })
            .find_first(|proof| meets_difficulty(&proof.digest, difficulty))
    }
}

/// Find the smallest nonce whose candidate digest meets `difficulty`.
pub fn find(seed: &[u8], difficulty: u32) -> Proof {
    ProofOfWork::new(seed).find(difficulty)
}

/// Digest of the candidate for `nonce` under `seed`.
pub fn digest(seed: &[u8], nonce: u64) -> [u8; DIGEST_SIZE] {
    ProofOfWork::new(seed).digest(nonce)
}

/// Check a proof against a seed: the digest must match the nonce and meet
/// the difficulty.
pub fn verify_proof(seed: &[u8], difficulty: u32, proof: &Proof) -> bool {
    digest(seed, proof.nonce) == proof.digest && meets_difficulty(&proof.digest, difficulty)
}

/// Check if a digest starts with at least `difficulty` zero hex characters.
///
/// # Example
///
/// ```rust
/// use powallet_core::meets_difficulty;
///
/// let mut digest = [0xFF; 32];
/// digest[0] = 0x00;
/// digest[1] = 0x0A;
/// assert!(meets_difficulty(&digest, 3));
/// assert!(!meets_difficulty(&digest, 4));
/// ```
#[inline]
pub fn meets_difficulty(digest: &[u8; DIGEST_SIZE], difficulty: u32) -> bool {
    leading_zero_nibbles(digest) >= difficulty
}

/// Count leading zero nibbles (the `'0'` prefix of the hex form).
pub fn leading_zero_nibbles(digest: &[u8; DIGEST_SIZE]) -> u32 {
    let mut zeros = 0u32;
    for byte in digest {
        if *byte == 0 {
            zeros += 2;
            continue;
        }
        if *byte >> 4 == 0 {
            zeros += 1;
        }
        break;
    }
    zeros
}

/// Write `n` in decimal into `buf`, returning the used tail.
fn decimal(mut n: u64, buf: &mut [u8; MAX_NONCE_DIGITS]) -> &[u8] {
    let mut pos = MAX_NONCE_DIGITS;
    loop {
        pos -= 1;
        buf[pos] = b'0' + (n % 10) as u8;
        n /= 10;
        if n == 0 {
            break;
        }
    }
    &buf[pos..]
}

#[cfg(feature = "serde")]
mod digest_hex {
    use alloc::string::String;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::params::DIGEST_SIZE;

    pub fn serialize<S>(digest: &[u8; DIGEST_SIZE], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(digest))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; DIGEST_SIZE], D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        let mut digest = [0u8; DIGEST_SIZE];
        hex::decode_to_slice(&text, &mut digest).map_err(serde::de::Error::custom)?;
        Ok(digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_rendering() {
        let mut buf = [0u8; MAX_NONCE_DIGITS];
        assert_eq!(decimal(0, &mut buf), b"0");
        assert_eq!(decimal(7, &mut buf), b"7");
        assert_eq!(decimal(304, &mut buf), b"304");
        assert_eq!(decimal(u64::MAX, &mut buf), b"18446744073709551615");
    }

    #[test]
    fn leading_nibbles() {
        let mut digest = [0xFF; DIGEST_SIZE];
        assert_eq!(leading_zero_nibbles(&digest), 0);

        digest[0] = 0x0F;
        assert_eq!(leading_zero_nibbles(&digest), 1);

        digest[0] = 0x00;
        digest[1] = 0x10;
        assert_eq!(leading_zero_nibbles(&digest), 2);

        assert_eq!(leading_zero_nibbles(&[0u8; DIGEST_SIZE]), MAX_DIFFICULTY);
    }

    #[test]
    fn display_is_hex_then_nonce() {
        let proof = Proof {
            digest: [0xAB; DIGEST_SIZE],
            nonce: 42,
        };
        let text = alloc::format!("{}", proof);
        assert_eq!(text.len(), DIGEST_HEX_LEN + 3);
        assert!(text.starts_with("abab"));
        assert!(text.ends_with(" 42"));
    }
}
