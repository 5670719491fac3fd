//! Signature verification against a PEM public key.
//!
//! Undecodable input is an error; a signature that decodes but does not
//! verify is `Ok(false)`.

use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::Signature;
use tracing::debug;

use crate::error::{Error, Result};
use crate::wallet::{decode_public_key, message_digest};

/// Verify a hex signature over `message` with a PEM public key.
///
/// Returns `Ok(false)` for a wrong key, tampered message or corrupted
/// signature, and [`Error::MalformedInput`] when the key, the hex or the
/// signature bytes cannot be decoded.
pub fn verify_signature(
    public_key: impl AsRef<str>,
    message: &str,
    signature: &str,
) -> Result<bool> {
    match verify_signature_strict(public_key, message, signature) {
        Ok(()) => Ok(true),
        Err(Error::InvalidSignature) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Like [`verify_signature`] but reports a failed check as
/// [`Error::InvalidSignature`].
pub fn verify_signature_strict(
    public_key: impl AsRef<str>,
    message: &str,
    signature: &str,
) -> Result<()> {
    let key = decode_public_key(public_key.as_ref())?;
    let bytes = hex::decode(signature).map_err(|e| Error::malformed("signature hex", e))?;
    let signature = Signature::from_slice(&bytes).map_err(|e| Error::malformed("signature", e))?;
    // Both (r, s) and (r, n - s) satisfy the ECDSA equation; k256 only accepts low-S.
    let signature = signature.normalize_s().unwrap_or(signature);

    let digest = message_digest(message);
    let verified = key.verify_prehash(&digest, &signature).is_ok();
    debug!(verified, message_len = message.len(), "checked signature");

    if verified {
        Ok(())
    } else {
        Err(Error::InvalidSignature)
    }
}
