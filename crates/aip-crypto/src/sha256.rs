//! # SHA-256 Helpers
//!
//! Raw-preimage SHA-256 for the operations that define their own byte
//! layouts: the pipe-delimited chain preimage and Merkle node concatenation.
//! Structured values go through `aip_core::ContentDigest` instead, which
//! only accepts `CanonicalBytes`.

use sha2::{Digest, Sha256};

use crate::encoding::bytes_to_hex;

/// SHA-256 of raw bytes.
pub fn sha256_raw(bytes: &[u8]) -> [u8; 32] {
    let hash = Sha256::digest(bytes);
    let mut out = [0u8; 32];
    out.copy_from_slice(&hash);
    out
}

/// SHA-256 of raw bytes, rendered as lowercase hex.
pub fn sha256_hex_raw(bytes: &[u8]) -> String {
    bytes_to_hex(&sha256_raw(bytes))
}
