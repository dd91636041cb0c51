//! # aip-core — Foundational Types for the AIP Attestation Pipeline
//!
//! This crate is the bedrock of the integrity-certificate stack. It defines
//! the type-system primitives that enforce correctness guarantees at compile
//! time. Every other crate in the workspace depends on `aip-core`; it depends
//! on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `CheckpointId`, `AgentId`,
//!    `SessionId`, `CertificateId`, `KeyId`, `Verdict` — all newtypes with
//!    validated constructors. No bare strings for identifiers on the issue
//!    path.
//!
//! 2. **`CanonicalBytes` newtype.** ALL structured digest computation flows
//!    through `CanonicalBytes::new()`. No raw `serde_json::to_vec()` for
//!    digests. Ever. This prevents the canonicalization split defect class
//!    by construction.
//!
//! 3. **UTC-only timestamps.** The `Timestamp` type enforces UTC with a `Z`
//!    suffix and millisecond precision; wire structures carry the rendered
//!    string exactly as signed.
//!
//! 4. **`ContentDigest::of()` accepts only `&CanonicalBytes`.** Compile-time
//!    enforcement that structured digest paths flow through canonicalization.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `aip-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use digest::{sha256_hex, ContentDigest};
pub use error::{
    AttestError, CanonicalizationError, CryptoError, EncodingError, MerkleError, StructuralError,
};
pub use identity::{AgentId, CertificateId, CheckpointId, KeyId, SessionId, Verdict};
pub use temporal::Timestamp;
