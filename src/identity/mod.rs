//! Helpers producing the values a log record carries: the sha256 fingerprint
//! of a log file and an ed25519 signature over that fingerprint. Keys travel
//! as hex, signatures as base64.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("invalid key material: {0}")]
    InvalidKey(String),
    #[error("malformed signature")]
    MalformedSignature,
    #[error("signature does not verify")]
    InvalidSignature,
}

pub struct Keypair {
    pub secret_hex: String,
    pub public_hex: String,
}

/// Random ed25519 keypair, hex-encoded.
pub fn generate_keypair() -> Keypair {
    let mut sk_bytes = [0u8; 32];
    OsRng.fill_bytes(&mut sk_bytes);
    let sk = SigningKey::from_bytes(&sk_bytes);
    Keypair {
        secret_hex: hex::encode(sk_bytes),
        public_hex: hex::encode(sk.verifying_key().as_bytes()),
    }
}

/// Hex sha256 digest of a payload, the `HashValue` of a log record.
pub fn fingerprint(payload: &[u8]) -> String {
    hex::encode(Sha256::digest(payload))
}

pub fn signing_key_from_hex(sk_hex: &str) -> Result<SigningKey, IdentityError> {
    let bytes = hex::decode(sk_hex.trim()).map_err(|e| IdentityError::InvalidKey(e.to_string()))?;
    let arr: [u8; 32] = bytes
        .try_into()
        .map_err(|_| IdentityError::InvalidKey("secret key must be 32 bytes".into()))?;
    Ok(SigningKey::from_bytes(&arr))
}

pub fn verifying_key_from_hex(pk_hex: &str) -> Result<VerifyingKey, IdentityError> {
    let bytes = hex::decode(pk_hex.trim()).map_err(|e| IdentityError::InvalidKey(e.to_string()))?;
    let arr: [u8; 32] = bytes
        .try_into()
        .map_err(|_| IdentityError::InvalidKey("public key must be 32 bytes".into()))?;
    VerifyingKey::from_bytes(&arr).map_err(|e| IdentityError::InvalidKey(e.to_string()))
}

/// Sign a fingerprint; the base64 text goes into the record's `Signature`.
pub fn sign_fingerprint(sk: &SigningKey, fingerprint: &str) -> String {
    BASE64.encode(sk.sign(fingerprint.as_bytes()).to_bytes())
}

pub fn verify_fingerprint(
    pk: &VerifyingKey,
    fingerprint: &str,
    signature_b64: &str,
) -> Result<(), IdentityError> {
    let sig_bytes = BASE64
        .decode(signature_b64)
        .map_err(|_| IdentityError::MalformedSignature)?;
    let signature =
        Signature::from_slice(&sig_bytes).map_err(|_| IdentityError::MalformedSignature)?;
    pk.verify_strict(fingerprint.as_bytes(), &signature)
        .map_err(|_| IdentityError::InvalidSignature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable_hex_sha256() {
        let fp = fingerprint(b"log line\n");
        assert_eq!(fp.len(), 64);
        assert_eq!(fp, fingerprint(b"log line\n"));
        assert_ne!(fp, fingerprint(b"other line\n"));
    }

    #[test]
    fn sign_verify_round_trip() {
        let pair = generate_keypair();
        let sk = signing_key_from_hex(&pair.secret_hex).unwrap();
        let pk = verifying_key_from_hex(&pair.public_hex).unwrap();
        let fp = fingerprint(b"payload");
        let sig = sign_fingerprint(&sk, &fp);
        verify_fingerprint(&pk, &fp, &sig).unwrap();
    }

    #[test]
    fn tampered_fingerprint_fails_verification() {
        let pair = generate_keypair();
        let sk = signing_key_from_hex(&pair.secret_hex).unwrap();
        let pk = verifying_key_from_hex(&pair.public_hex).unwrap();
        let sig = sign_fingerprint(&sk, "aaaa");
        assert!(matches!(
            verify_fingerprint(&pk, "bbbb", &sig),
            Err(IdentityError::InvalidSignature)
        ));
    }

    #[test]
    fn short_key_material_is_rejected() {
        assert!(matches!(
            signing_key_from_hex("abcd"),
            Err(IdentityError::InvalidKey(_))
        ));
        assert!(matches!(
            verifying_key_from_hex("zz"),
            Err(IdentityError::InvalidKey(_))
        ));
    }

    #[test]
    fn garbage_signature_is_malformed_not_invalid() {
        let pair = generate_keypair();
        let pk = verifying_key_from_hex(&pair.public_hex).unwrap();
        assert!(matches!(
            verify_fingerprint(&pk, "fp", "not-base64!!"),
            Err(IdentityError::MalformedSignature)
        ));
    }
}
