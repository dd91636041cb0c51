//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types used throughout the attestation pipeline. All
//! errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Design
//!
//! - Constructive operations (commitment, chain hash, payload building,
//!   signing, tree building, certificate assembly) fail fast with one of
//!   the kinds below; they never silently corrupt.
//! - Predicate operations (`verify_chain_link`, `verify_inclusion_proof`,
//!   `verify_checkpoint_signature`) never surface these errors — they
//!   return `false` on any structural problem.

use thiserror::Error;

/// Top-level error type for the attestation pipeline.
#[derive(Error, Debug)]
pub enum AttestError {
    /// Canonical serialization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// Hex or base64 decoding failed.
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// Key material was invalid.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Merkle tree operation failed.
    #[error("merkle error: {0}")]
    Merkle(#[from] MerkleError),

    /// A typed input was structurally broken.
    #[error("structural error: {0}")]
    Structural(#[from] StructuralError),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Non-finite numbers have no canonical JSON form.
    #[error("non-finite number has no canonical representation: {0}")]
    NonFiniteNumber(f64),

    /// JSON serialization failed (cycles, non-string mapping keys,
    /// unsupported value types).
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error decoding hex, base64, or UTF-8 input.
#[derive(Error, Debug)]
pub enum EncodingError {
    /// Hex input length must be even.
    #[error("hex string must have even length, got {0}")]
    OddHexLength(usize),

    /// Hex input contained a non-hex character.
    #[error("invalid hex at position {position}")]
    InvalidHexChar {
        /// Byte offset of the offending character.
        position: usize,
    },

    /// Decoded value had the wrong length.
    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Required byte length.
        expected: usize,
        /// Actual decoded length.
        actual: usize,
    },

    /// Base64 input could not be decoded.
    #[error("invalid base64: {0}")]
    InvalidBase64(String),

    /// Timestamp string was not ISO-8601 UTC.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

/// Error in cryptographic key handling.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Secret key seed was malformed.
    #[error("invalid secret key: {0}")]
    InvalidSecretKey(String),

    /// Public key bytes did not describe a valid curve point.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Underlying encoding failure (hex-encoded key material).
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// No key is registered under the requested key id.
    #[error("unknown key id: {0}")]
    UnknownKeyId(String),
}

/// Error in Merkle tree operations.
#[derive(Error, Debug)]
pub enum MerkleError {
    /// Requested leaf index does not exist in the tree.
    #[error("leaf index {index} out of range for tree of {leaf_count} leaves")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of leaves in the tree.
        leaf_count: usize,
    },

    /// A leaf hash was not a valid 64-char hex digest.
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

/// Error for structurally broken typed inputs.
#[derive(Error, Debug)]
pub enum StructuralError {
    /// A required field was missing when building a certificate.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A chain preimage field contained the `|` delimiter.
    #[error("field {0} must not contain '|'")]
    ForbiddenPipe(&'static str),

    /// An identifier failed its format validation.
    #[error("invalid {kind}: {reason}")]
    InvalidIdentifier {
        /// Which identifier kind was being constructed.
        kind: &'static str,
        /// Why validation rejected it.
        reason: String,
    },

    /// A hash field was not a lowercase 64-char hex digest.
    #[error("field {0} must be a lowercase 64-char hex digest")]
    MalformedDigest(&'static str),

    /// Claims confidence must be a finite number.
    #[error("confidence must be finite, got {0}")]
    NonFiniteConfidence(f64),
}
