//! Proof-of-work parameters

/// SHA-256 output size
pub const DIGEST_SIZE: usize = 32;

/// Length of a digest rendered as hex
pub const DIGEST_HEX_LEN: usize = DIGEST_SIZE * 2;

/// Highest difficulty a digest can satisfy (every hex character zero).
/// Larger values are accepted but never met.
pub const MAX_DIFFICULTY: u32 = DIGEST_HEX_LEN as u32;

/// Decimal digits in `u64::MAX`
pub const MAX_NONCE_DIGITS: usize = 20;

/// Nonces handed to the thread pool per round of the parallel search
pub const PARALLEL_BATCH: u64 = 1 << 16;
