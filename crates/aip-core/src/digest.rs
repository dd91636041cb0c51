//! # Content Digest — SHA-256 over Canonical Bytes
//!
//! Defines `ContentDigest`, the 32-byte SHA-256 digest that backs every hash
//! field in the pipeline (input commitments, chain hashes, leaf hashes).
//!
//! ## Security Invariant
//!
//! `ContentDigest::of()` accepts only `&CanonicalBytes`, making it a compile
//! error to digest raw bytes that skipped the canonicalization pipeline.

use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;

/// A 32-byte SHA-256 content digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    /// Digest canonical bytes.
    ///
    /// This is the only digest path for structured values; raw-preimage
    /// hashing (chain links, Merkle nodes) lives with the operations that
    /// define those preimages.
    pub fn of(data: &CanonicalBytes) -> Self {
        let hash = Sha256::digest(data.as_bytes());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hash);
        Self(bytes)
    }

    /// The raw 32-byte digest value.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render the digest as a lowercase 64-char hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Convenience: canonical bytes straight to lowercase hex.
pub fn sha256_hex(data: &CanonicalBytes) -> String {
    ContentDigest::of(data).to_hex()
}
