//! # Ed25519 Signing and Verification
//!
//! Provides Ed25519 key generation, checkpoint signing, and total signature
//! verification for the attestation pipeline.
//!
//! ## Security Invariant
//!
//! - Signing input MUST be `&CanonicalBytes` — you cannot sign raw bytes.
//!   The signed-payload builder is the only producer of those bytes, so
//!   every signature in the system covers a canonical preimage.
//! - Secret seeds are never serialized or logged. `Ed25519KeyPair` does not
//!   implement `Serialize`, its `Debug` output is redacted, and the
//!   underlying `ed25519-dalek` key zeroizes on drop.
//! - `verify_checkpoint_signature` is a total predicate: malformed base64,
//!   wrong-length signatures, and off-curve public keys all yield `false`,
//!   never an error. The declared payload string is verified byte-exact,
//!   not re-parsed.
//!
//! ## Serde
//!
//! - Public keys serialize/deserialize as 64-char hex strings.
//! - Signatures serialize/deserialize as standard padded base64.

use ed25519_dalek::{Signer, Verifier};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

use aip_core::{CanonicalBytes, CryptoError};

use crate::encoding::{base64_decode, base64_encode, bytes_to_hex, hex_to_bytes};

/// An Ed25519 public key (32 bytes) for signature verification.
///
/// Serializes as a hex-encoded string for JSON interoperability.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ed25519PublicKey(pub [u8; 32]);

/// An Ed25519 signature (64 bytes).
///
/// Serializes as standard base64 with `=` padding, the wire encoding of
/// `proofs.signature.value`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ed25519Signature(pub [u8; 64]);

/// An Ed25519 key pair for signing operations.
///
/// Does not implement `Serialize` — secret seeds must not be accidentally
/// serialized into logs, responses, or certificates.
pub struct Ed25519KeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

// ---------------------------------------------------------------------------
// Ed25519PublicKey impls
// ---------------------------------------------------------------------------

impl Ed25519PublicKey {
    /// Create a public key from raw 32 bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Return the raw 32-byte public key.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render the public key as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        bytes_to_hex(&self.0)
    }

    /// Parse a public key from a 64-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let bytes = hex_to_bytes(hex)?;
        let arr: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
            CryptoError::InvalidPublicKey(format!("expected 32 bytes, got {}", v.len()))
        })?;
        Ok(Self(arr))
    }

    /// Convert to an `ed25519_dalek::VerifyingKey` for verification.
    pub fn to_verifying_key(&self) -> Result<ed25519_dalek::VerifyingKey, CryptoError> {
        ed25519_dalek::VerifyingKey::from_bytes(&self.0)
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))
    }
}

impl Serialize for Ed25519PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Ed25519PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519PublicKey({}...)", bytes_to_hex(&self.0[..4]))
    }
}

impl std::fmt::Display for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// Ed25519Signature impls
// ---------------------------------------------------------------------------

impl Ed25519Signature {
    /// Create a signature from raw 64 bytes.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Return the raw 64-byte signature.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Render the signature as standard padded base64.
    pub fn to_base64(&self) -> String {
        base64_encode(&self.0)
    }

    /// Parse a signature from standard padded base64.
    pub fn from_base64(b64: &str) -> Result<Self, CryptoError> {
        let bytes = base64_decode(b64)?;
        let arr: [u8; 64] = bytes.try_into().map_err(|v: Vec<u8>| {
            CryptoError::Encoding(aip_core::EncodingError::InvalidLength {
                expected: 64,
                actual: v.len(),
            })
        })?;
        Ok(Self(arr))
    }
}

impl Serialize for Ed25519Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for Ed25519Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let b64 = String::deserialize(deserializer)?;
        Self::from_base64(&b64).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519Signature({}...)", bytes_to_hex(&self.0[..4]))
    }
}

impl std::fmt::Display for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_base64())
    }
}

// ---------------------------------------------------------------------------
// Ed25519KeyPair impls
// ---------------------------------------------------------------------------

impl Ed25519KeyPair {
    /// Generate a new random key pair from the OS CSPRNG.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        let signing_key = ed25519_dalek::SigningKey::generate(&mut csprng);
        Self { signing_key }
    }

    /// Create a key pair from a raw 32-byte secret seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = ed25519_dalek::SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Get the public key for this key pair.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign canonical bytes.
    ///
    /// Ed25519 is deterministic: re-signing the same bytes with the same
    /// key yields the same signature.
    pub fn sign(&self, data: &CanonicalBytes) -> Ed25519Signature {
        let sig = self.signing_key.sign(data.as_bytes());
        Ed25519Signature(sig.to_bytes())
    }
}

impl std::fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519KeyPair(<secret>)")
    }
}

/// Load a signing key pair from a 64-char hex seed.
///
/// The intermediate seed buffer is zeroized before returning.
pub fn load_signing_key_from_hex(hex: &str) -> Result<Ed25519KeyPair, CryptoError> {
    let mut bytes = hex_to_bytes(hex)?;
    if bytes.len() != 32 {
        let actual = bytes.len();
        bytes.zeroize();
        return Err(CryptoError::InvalidSecretKey(format!(
            "expected 32-byte seed (64 hex chars), got {actual} bytes"
        )));
    }
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&bytes);
    bytes.zeroize();
    let pair = Ed25519KeyPair::from_seed(&seed);
    seed.zeroize();
    Ok(pair)
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Verify an Ed25519 signature over a declared payload string.
///
/// Total predicate: returns `false` — never an error — when the base64
/// fails to decode, the signature has the wrong length, the public key is
/// not a valid curve point, or the signature does not verify. The payload
/// is taken byte-exact as handed in; it is never re-parsed or re-serialized.
pub fn verify_checkpoint_signature(
    signature_b64: &str,
    payload: &str,
    public_key: &Ed25519PublicKey,
) -> bool {
    let signature = match Ed25519Signature::from_base64(signature_b64) {
        Ok(sig) => sig,
        Err(_) => return false,
    };
    let verifying_key = match public_key.to_verifying_key() {
        Ok(vk) => vk,
        Err(_) => return false,
    };
    let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    verifying_key.verify(payload.as_bytes(), &sig).is_ok()
}
