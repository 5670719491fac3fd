//! Wallet: secp256k1 keypair, address derivation and message signing.
//!
//! The address is the base64 SHA-256 of the PEM-encoded public key. Messages
//! are hashed with SHA-256 and the digest is signed with ECDSA.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use k256::pkcs8::{DecodePublicKey, EncodePublicKey, LineEnding};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{Error, Result};

/// The wallet's secret scalar.
///
/// Not `Clone`, never serialized, and has no accessor for its bytes. The
/// inner signing key zeroizes itself on drop.
pub struct PrivateKey(SigningKey);

impl PrivateKey {
    /// Draw a fresh scalar from the OS RNG.
    fn generate() -> Self {
        Self(SigningKey::random(&mut OsRng))
    }

    fn verifying_key(&self) -> &VerifyingKey {
        self.0.verifying_key()
    }

    fn sign_digest(&self, digest: &[u8; 32]) -> Result<Signature> {
        PrehashSigner::<Signature>::sign_prehash(&self.0, digest).map_err(Error::backend)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey(<redacted>)")
    }
}

/// Public key as SubjectPublicKeyInfo PEM text.
///
/// Always held in canonical form (LF line endings, uncompressed point), so
/// hashing it for the address is stable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PublicKeyPem(String);

impl PublicKeyPem {
    /// Encode a verifying key.
    pub fn from_verifying_key(key: &VerifyingKey) -> Result<Self> {
        key.to_public_key_pem(LineEnding::LF)
            .map(Self)
            .map_err(Error::backend)
    }

    /// Parse PEM text and re-encode it canonically.
    pub fn parse(text: &str) -> Result<Self> {
        let key = decode_public_key(text)?;
        Self::from_verifying_key(&key)
    }

    /// Decode back into a verifying key.
    pub fn verifying_key(&self) -> Result<VerifyingKey> {
        decode_public_key(&self.0)
    }

    /// The address derived from this key.
    pub fn address(&self) -> Address {
        Address::from_public_key(self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for PublicKeyPem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PublicKeyPem {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for PublicKeyPem {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PublicKeyPem {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<PublicKeyPem> for String {
    fn from(value: PublicKeyPem) -> Self {
        value.0
    }
}

pub(crate) fn decode_public_key(text: &str) -> Result<VerifyingKey> {
    VerifyingKey::from_public_key_pem(text).map_err(|e| Error::malformed("public key", e))
}

/// Account address: standard base64 (padded) of SHA-256 over the PEM text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Derive the address of a public key.
    pub fn from_public_key(public_key: &PublicKeyPem) -> Self {
        let digest = Sha256::digest(public_key.as_bytes());
        Self(STANDARD.encode(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// SHA-256 of the UTF-8 message bytes; this is what gets signed.
pub(crate) fn message_digest(message: &str) -> [u8; 32] {
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&Sha256::digest(message.as_bytes()));
    digest
}

/// A freshly generated account keypair with its derived address.
pub struct Wallet {
    private_key: PrivateKey,
    public_key: PublicKeyPem,
    address: Address,
}

impl Wallet {
    /// Create a wallet with a new random keypair.
    pub fn new() -> Result<Self> {
        Self::from_private_key(PrivateKey::generate())
    }

    fn from_private_key(private_key: PrivateKey) -> Result<Self> {
        let public_key = PublicKeyPem::from_verifying_key(private_key.verifying_key())?;
        let address = public_key.address();

        debug!(%address, "created wallet");

        Ok(Self {
            private_key,
            public_key,
            address,
        })
    }

    /// Get the address
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Get the PEM-encoded public key
    pub fn public_key(&self) -> &PublicKeyPem {
        &self.public_key
    }

    /// Get the public key for in-process verification
    pub fn verifying_key(&self) -> &VerifyingKey {
        self.private_key.verifying_key()
    }

    /// Sign a message, returning the 64-byte `r || s` signature as lowercase hex.
    pub fn sign(&self, message: &str) -> Result<String> {
        let digest = message_digest(message);
        let signature = self.private_key.sign_digest(&digest)?;
        Ok(hex::encode(signature.to_bytes()))
    }

    #[cfg(test)]
    pub(crate) fn from_secret_bytes(bytes: &[u8]) -> Result<Self> {
        let key = SigningKey::from_slice(bytes).map_err(|e| Error::malformed("secret key", e))?;
        Self::from_private_key(PrivateKey(key))
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify::verify_signature;
    use k256::ecdsa::signature::hazmat::PrehashVerifier;

    /// Secret scalar 1, whose public key is the curve generator.
    fn generator_secret() -> [u8; 32] {
        let mut secret = [0u8; 32];
        secret[31] = 1;
        secret
    }

    const GENERATOR_PEM: &str = "-----BEGIN PUBLIC KEY-----\n\
        MFYwEAYHKoZIzj0CAQYFK4EEAAoDQgAEeb5mfvncu6xVoGKVzocLBwKb/NstzijZ\n\
        WfKBWxb4F5hIOtp3JqPEZV2k+/wOEQio/Re0SKaFVBmcR9CP+xDUuA==\n\
        -----END PUBLIC KEY-----\n";

    const GENERATOR_ADDRESS: &str = "PNdoJ16S1K29RyrWI5BmbGtMqCADLzFn7eSofkH9OPw=";

    #[test]
    fn test_generate_draws_fresh_keys() {
        let a = PrivateKey::generate();
        let b = PrivateKey::generate();
        assert_ne!(a.verifying_key(), b.verifying_key());

        let digest = message_digest("msg");
        let signature = a.sign_digest(&digest).unwrap();
        assert!(a.verifying_key().verify_prehash(&digest, &signature).is_ok());
    }

    #[test]
    fn test_new_wallet() {
        let wallet = Wallet::new().unwrap();

        assert!(wallet
            .public_key()
            .as_str()
            .starts_with("-----BEGIN PUBLIC KEY-----\n"));
        assert!(wallet
            .public_key()
            .as_str()
            .ends_with("-----END PUBLIC KEY-----\n"));

        // base64 of 32 bytes
        assert_eq!(wallet.address().as_str().len(), 44);
        assert!(wallet.address().as_str().ends_with('='));
    }

    #[test]
    fn test_known_public_key_and_address() {
        let wallet = Wallet::from_secret_bytes(&generator_secret()).unwrap();
        assert_eq!(wallet.public_key().as_str(), GENERATOR_PEM);
        assert_eq!(wallet.address().as_str(), GENERATOR_ADDRESS);
    }

    #[test]
    fn test_address_is_stable() {
        let wallet = Wallet::new().unwrap();
        let first = wallet.address().clone();
        let second = wallet.address().clone();
        assert_eq!(first, second);
        assert_eq!(wallet.public_key().address(), first);
    }

    #[test]
    fn test_different_wallets_different_addresses() {
        let wallet1 = Wallet::new().unwrap();
        let wallet2 = Wallet::new().unwrap();
        assert_ne!(wallet1.address(), wallet2.address());
        assert_ne!(wallet1.public_key(), wallet2.public_key());
    }

    #[test]
    fn test_public_key_round_trip() {
        let wallet = Wallet::new().unwrap();
        let pem = wallet.public_key();

        let parsed = PublicKeyPem::parse(pem.as_str()).unwrap();
        assert_eq!(&parsed, pem);
        assert_eq!(&parsed.verifying_key().unwrap(), wallet.verifying_key());
    }

    #[test]
    fn test_parse_canonicalizes_line_endings() {
        let crlf = GENERATOR_PEM.replace('\n', "\r\n");
        let parsed: PublicKeyPem = crlf.parse().unwrap();
        assert_eq!(parsed.as_str(), GENERATOR_PEM);
        assert_eq!(parsed.address().as_str(), GENERATOR_ADDRESS);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = PublicKeyPem::parse("not a key").unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_signature_shape() {
        let wallet = Wallet::new().unwrap();
        let signature = wallet.sign("hello world").unwrap();

        assert_eq!(signature.len(), 128);
        assert!(signature
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_signing_is_deterministic() {
        // RFC 6979 nonces: same key and message give the same signature
        let wallet = Wallet::from_secret_bytes(&generator_secret()).unwrap();
        assert_eq!(wallet.sign("msg").unwrap(), wallet.sign("msg").unwrap());
        assert_ne!(wallet.sign("msg").unwrap(), wallet.sign("msg2").unwrap());
    }

    #[test]
    fn test_sign_and_verify() {
        let wallet = Wallet::new().unwrap();
        for message in ["hello world", "", "hello world49967", "ünïcödé ✓"] {
            let signature = wallet.sign(message).unwrap();
            assert!(verify_signature(wallet.public_key(), message, &signature).unwrap());
        }
    }

    #[test]
    fn test_signature_verifies_in_process() {
        let wallet = Wallet::new().unwrap();
        let signature = wallet.sign("msg").unwrap();
        let bytes = hex::decode(signature).unwrap();
        let signature = Signature::from_slice(&bytes).unwrap();

        assert!(wallet
            .verifying_key()
            .verify_prehash(&message_digest("msg"), &signature)
            .is_ok());
    }

    #[test]
    fn test_serde_forms() {
        let wallet = Wallet::from_secret_bytes(&generator_secret()).unwrap();

        let json = serde_json::to_string(wallet.address()).unwrap();
        assert_eq!(json, format!("\"{GENERATOR_ADDRESS}\""));

        let json = serde_json::to_string(wallet.public_key()).unwrap();
        let parsed: PublicKeyPem = serde_json::from_str(&json).unwrap();
        assert_eq!(&parsed, wallet.public_key());

        assert!(serde_json::from_str::<PublicKeyPem>("\"garbage\"").is_err());
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let wallet = Wallet::new().unwrap();
        let debug = format!("{wallet:?}");
        assert!(debug.contains(wallet.address().as_str()));

        let debug = format!("{:?}", wallet.private_key);
        assert!(debug.contains("redacted"));
    }
}
