//! Browser bindings: batched proof-of-work search for Web Workers and
//! signature verification.

use powallet_core::ProofOfWork;
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct Benchmark {
    pow: ProofOfWork,
}

impl Default for Benchmark {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl Benchmark {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            pow: ProofOfWork::new(b"benchmark input data for powallet"),
        }
    }

    /// Run benchmark with specified number of digests
    /// Returns hashrate in H/s
    #[wasm_bindgen]
    pub fn run(&self, num_hashes: u32) -> Result<f64, JsValue> {
        let performance = web_sys::window()
            .and_then(|window| window.performance())
            .ok_or_else(|| JsValue::from_str("performance timer unavailable"))?;

        let start = performance.now();
        for nonce in 0..num_hashes {
            std::hint::black_box(self.pow.digest(nonce as u64));
        }
        let elapsed_s = (performance.now() - start) / 1000.0;

        Ok(hashrate(num_hashes as u64, elapsed_s))
    }
}

/// Digests per second; zero when the timer did not advance
fn hashrate(count: u64, elapsed_s: f64) -> f64 {
    if elapsed_s > 0.0 {
        count as f64 / elapsed_s
    } else {
        0.0
    }
}

/// Hex digest of the candidate for `nonce` (nonce 0 hashes the seed alone)
#[wasm_bindgen]
pub fn digest_once(seed: &str, nonce: f64) -> String {
    hex::encode(powallet_core::digest(seed.as_bytes(), nonce as u64))
}

#[derive(Serialize)]
struct BatchResult {
    found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nonce: Option<u64>,
    count: u64,
}

/// Mining struct for Web Worker usage.
/// Keeps the seed midstate across batches.
#[wasm_bindgen]
pub struct Miner {
    pow: ProofOfWork,
    difficulty: u32,
}

#[wasm_bindgen]
impl Miner {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: &str, difficulty: u32) -> Miner {
        Miner {
            pow: ProofOfWork::new(seed.as_bytes()),
            difficulty,
        }
    }

    /// Mine a batch of consecutive nonces. Returns JSON string:
    /// `{"found":true,"hash":"...","nonce":N,"count":M}` or `{"found":false,"count":M}`
    ///
    /// - `start_nonce`: first nonce to try (as f64, safe up to 2^53)
    /// - `batch_size`: number of nonces to try in this batch
    ///
    /// Workers that take consecutive windows and keep the lowest hit reproduce
    /// the sequential result.
    pub fn mine_batch(&self, start_nonce: f64, batch_size: u32) -> String {
        let outcome = self
            .pow
            .search(self.difficulty, start_nonce as u64, batch_size as u64);

        let result = BatchResult {
            found: outcome.is_found(),
            hash: outcome.proof.map(|p| p.digest_hex()),
            nonce: outcome.proof.map(|p| p.nonce),
            count: outcome.hashes_computed,
        };

        serde_json::to_string(&result)
            .unwrap_or_else(|_| format!(r#"{{"found":false,"count":{}}}"#, result.count))
    }

    #[wasm_bindgen(getter)]
    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }
}

/// Verify a hex signature with a PEM public key.
/// Malformed input is thrown as an error string.
#[wasm_bindgen]
pub fn verify_signature(public_key: &str, message: &str, signature: &str) -> Result<bool, JsValue> {
    powallet::verify_signature(public_key, message, signature)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
