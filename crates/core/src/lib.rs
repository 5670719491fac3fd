//! # powallet proof-of-work core
//!
//! A brute-force search for a nonce that makes a SHA-256 digest start with a
//! given number of zero hex characters.
//!
//! ## Candidate format
//!
//! The first probe hashes the seed alone; every later probe appends the
//! decimal text of the nonce:
//!
//! ```text
//! nonce == 0  ->  SHA256(seed)
//! nonce  > 0  ->  SHA256(seed || decimal(nonce))
//! ```
//!
//! Difficulty counts leading `'0'` characters of the lowercase hex digest,
//! i.e. leading zero nibbles. The search always returns the smallest
//! qualifying nonce.
//!
//! ## Example
//!
//! ```rust
//! use powallet_core::{find, meets_difficulty, ProofOfWork};
//!
//! // Single-shot search
//! let proof = find(b"test", 2);
//! assert!(proof.digest_hex().starts_with("00"));
//! assert!(meets_difficulty(&proof.digest, 2));
//!
//! // Reusable searcher (keeps the seed midstate)
//! let pow = ProofOfWork::new(b"test");
//! assert_eq!(pow.find(2), proof);
//! ```
//!
//! ## no_std Support
//!
//! ```toml
//! [dependencies]
//! powallet-core = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod params;
mod pow;

pub use params::*;
pub use pow::{
    PowError, Proof, ProofOfWork, SearchOutcome, digest, find, leading_zero_nibbles,
    meets_difficulty, verify_proof,
};
