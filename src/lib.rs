//! powallet: proof-of-work and secp256k1 wallet primitives
//!
//! Two building blocks for a blockchain-style account system.
//!
//! # Overview
//!
//! - **Proof of work**: find the smallest nonce such that
//!   `SHA256(seed || decimal(nonce))` starts with `difficulty` zero hex
//!   characters (nonce 0 hashes the seed alone).
//! - **Wallet**: a secp256k1 keypair whose address is the base64 SHA-256 of
//!   its PEM public key, signing SHA-256 message digests with ECDSA.
//! - **Verification**: a total boolean check over well-formed input;
//!   undecodable input is an error.
//!
//! # Example
//!
//! ```rust
//! use powallet::{find, verify_signature, Wallet};
//!
//! let proof = find(b"hello world", 2);
//! let message = format!("hello world{}", proof.nonce);
//!
//! let wallet = Wallet::new()?;
//! let signature = wallet.sign(&message)?;
//!
//! assert!(verify_signature(wallet.public_key(), &message, &signature)?);
//! assert!(!verify_signature(wallet.public_key(), "hello world", &signature)?);
//! # Ok::<(), powallet::Error>(())
//! ```

// Re-export the search core
pub use powallet_core as pow;

pub mod error;
pub mod miner;
pub mod verify;
pub mod wallet;

// Convenience re-exports
pub use error::{Error, Result};
pub use miner::{mine, stamp, MinerConfig, StampedMessage};
pub use pow::{find, meets_difficulty, Proof, ProofOfWork};
pub use verify::{verify_signature, verify_signature_strict};
pub use wallet::{Address, PublicKeyPem, Wallet};
