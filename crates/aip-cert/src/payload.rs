//! # Signed Payload — The Signature Preimage
//!
//! Builds the canonical string an Ed25519 signature covers: a JSON object
//! with exactly seven fields, keys in lexicographic order. The *string* is
//! the preimage; verifiers must check the declared string byte-exact, never
//! a re-parse.

use serde::Serialize;

use aip_core::{CanonicalBytes, CanonicalizationError, CryptoError};
use aip_crypto::{Ed25519KeyPair, KeyProvider};

pub use aip_crypto::verify_checkpoint_signature;

/// The seven fields bound into a checkpoint signature.
///
/// Field names are already in lexicographic order; the canonical emitter
/// sorts regardless, so the wire order cannot drift from the declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedPayloadFields {
    /// The attested agent.
    pub agent_id: String,
    /// This checkpoint's chain hash.
    pub chain_hash: String,
    /// The checkpoint identifier.
    pub checkpoint_id: String,
    /// The combined input commitment.
    pub input_commitment: String,
    /// SHA-256 of the thinking block.
    pub thinking_block_hash: String,
    /// The signed timestamp string.
    pub timestamp: String,
    /// The verdict label.
    pub verdict: String,
}

/// A built signature preimage.
///
/// Only constructible through [`build_signed_payload`], so every signature
/// in the system covers canonical bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPayload {
    canonical: CanonicalBytes,
}

impl SignedPayload {
    /// The preimage string fed to Ed25519.
    pub fn as_str(&self) -> &str {
        self.canonical.as_str()
    }

    /// The underlying canonical bytes.
    pub fn canonical_bytes(&self) -> &CanonicalBytes {
        &self.canonical
    }
}

/// Assemble and canonicalize the signature preimage.
pub fn build_signed_payload(
    fields: &SignedPayloadFields,
) -> Result<SignedPayload, CanonicalizationError> {
    Ok(SignedPayload {
        canonical: CanonicalBytes::new(fields)?,
    })
}

/// Sign a built payload, returning the standard padded base64 signature.
///
/// Ed25519 is deterministic: re-signing the same payload with the same key
/// yields the same signature.
pub fn sign_checkpoint(payload: &SignedPayload, keypair: &Ed25519KeyPair) -> String {
    keypair.sign(payload.canonical_bytes()).to_base64()
}

/// Sign a built payload through a key-provider backend.
pub fn sign_checkpoint_with_provider(
    payload: &SignedPayload,
    provider: &dyn KeyProvider,
) -> Result<String, CryptoError> {
    Ok(provider.sign(payload.canonical_bytes())?.to_base64())
}
