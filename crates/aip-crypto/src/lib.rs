//! # aip-crypto — Cryptographic Primitives
//!
//! Provides the cryptographic building blocks for the attestation pipeline:
//!
//! - **Ed25519** signing and verification for checkpoint signatures.
//!   Signing input MUST be `&CanonicalBytes` — you cannot sign raw bytes.
//! - **SHA-256** helpers for raw preimages (chain links, Merkle nodes);
//!   structured values digest through `aip_core::ContentDigest`.
//! - **Merkle log**: binary SHA-256 tree over 64-hex leaves with
//!   duplicate-last-node odd levels, inclusion-proof generation, and total
//!   proof verification.
//! - **Encodings**: hand-rolled hex plus standard padded base64, with
//!   round-trip guarantees for every buffer length.
//! - **Key providers**: signing backends and a `KeyRing` that models key
//!   rotation as selection policy.
//!
//! ## Crate Policy
//!
//! - Depends only on `aip-core` internally.
//! - No mocking of cryptographic operations in tests — all tests use real
//!   `CanonicalBytes`, real SHA-256, real Ed25519.
//! - Predicate operations (`verify_checkpoint_signature`,
//!   `verify_inclusion_proof`) return `false` on malformed input; they
//!   never propagate errors.

pub mod encoding;
pub mod ed25519;
pub mod key_provider;
pub mod merkle;
pub mod sha256;

pub use ed25519::{
    load_signing_key_from_hex, verify_checkpoint_signature, Ed25519KeyPair, Ed25519PublicKey,
    Ed25519Signature,
};
pub use encoding::is_hex_digest;
pub use key_provider::{KeyProvider, KeyRing, LocalKeyProvider};
pub use merkle::{
    build_tree_state, compute_merkle_root, empty_tree_root, generate_inclusion_proof,
    verify_inclusion_proof, InclusionProof, ProofStep, SiblingPosition, TreeState,
};
pub use sha256::{sha256_hex_raw, sha256_raw};
