//! # aip-cert — Attestation Semantics
//!
//! The attestation layer of the AIP pipeline: everything between the
//! analyzer's output and a self-describing certificate any third party can
//! verify offline.
//!
//! - **inputs** — commit to the policy context (card, conscience values,
//!   window context, model/template versions).
//! - **chain** — the per-session SHA-256 hash chain linking each checkpoint
//!   to its predecessor.
//! - **payload** — the canonical signed-payload string, the Ed25519
//!   signature's exact preimage.
//! - **leaf** — the record a checkpoint contributes to a Merkle tree epoch.
//! - **certificate** — the envelope packaging commitments, chain link,
//!   signature, and inclusion proof.
//! - **verify** — the five offline checks.
//! - **provider / issuer** — collaborator traits and the issue pipeline
//!   that threads one clock reading through every artifact.
//!
//! ## Crate Policy
//!
//! - Constructive operations fail fast; predicates are total and never
//!   propagate errors.
//! - The crate holds no state: stores, clocks, and keys are collaborator
//!   traits; everything else is a pure function of its inputs.

pub mod certificate;
pub mod chain;
pub mod inputs;
pub mod issuer;
pub mod leaf;
pub mod payload;
pub mod provider;
pub mod verify;

pub use certificate::{
    CertificateBuilder, ChainProof, Claims, Concern, IntegrityCertificate, Proofs, SignatureProof,
    Subject, VerificationEndpoints, CERTIFICATE_CONTEXT, CERTIFICATE_TYPE, CERTIFICATE_VERSION,
    SIGNATURE_ALGORITHM,
};
pub use chain::{
    compute_chain_hash, verify_chain_link, verify_chain_sequence, ChainInput, ChainSequenceReport,
    ChainedCheckpoint, GENESIS,
};
pub use inputs::{compute_input_commitment, CheckpointInputs, InputCommitments};
pub use issuer::{CheckpointIssuer, IssueRequest, IssuerConfig};
pub use leaf::{compute_leaf_hash, MerkleLeaf};
pub use payload::{
    build_signed_payload, sign_checkpoint, sign_checkpoint_with_provider,
    verify_checkpoint_signature, SignedPayload, SignedPayloadFields,
};
pub use provider::{
    CertificateIdSource, ChainStore, Clock, FixedClock, FixedIdSource, LeafStore,
    MemoryChainStore, MemoryLeafStore, RandomIdSource, SystemClock,
};
pub use verify::{reconstruct_chain_input, verify_certificate, VerificationReport};
