//! # Offline Verification
//!
//! Verifies a certificate using only its own contents and the issuer's
//! public key: no network, no store, no clock. Every check is total — a
//! malformed document produces failed checks, never an error — which is
//! what lets a verifier accept arbitrary input from anyone.

use serde::{Deserialize, Serialize};

use aip_crypto::{verify_checkpoint_signature, verify_inclusion_proof, Ed25519PublicKey};
use aip_crypto::is_hex_digest;

use crate::certificate::IntegrityCertificate;
use crate::chain::{verify_chain_link, ChainInput};

/// Per-check outcome of offline verification.
///
/// The certificate is accepted iff every check holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Ed25519 signature verifies over the declared payload string.
    pub signature_valid: bool,
    /// Chain hash matches recomputation from the envelope fields.
    pub chain_valid: bool,
    /// Merkle proof verifies against its declared root (vacuously true
    /// when the certificate carries no proof).
    pub merkle_valid: bool,
    /// Combined commitment is a lowercase 64-hex digest.
    pub commitment_well_formed: bool,
    /// The reserved verdict-derivation slot is `null`, as v1 requires.
    pub verdict_derivation_ok: bool,
}

impl VerificationReport {
    /// Whether every check held.
    pub fn accepted(&self) -> bool {
        self.signature_valid
            && self.chain_valid
            && self.merkle_valid
            && self.commitment_well_formed
            && self.verdict_derivation_ok
    }
}

/// Rebuild the chain input a certificate claims to have been linked from.
///
/// `issued_at` doubles as the signed chain timestamp (v1 convention), so a
/// certificate whose `issued_at` was altered after signing fails the chain
/// check here.
pub fn reconstruct_chain_input(certificate: &IntegrityCertificate) -> ChainInput {
    ChainInput {
        prev_chain_hash: certificate.proofs.chain.prev_chain_hash.clone(),
        checkpoint_id: certificate.subject.checkpoint_id.0.clone(),
        verdict: certificate.claims.verdict.0.clone(),
        thinking_block_hash: certificate.input_commitments.thinking_block_hash.clone(),
        input_commitment: certificate.input_commitments.combined_commitment.clone(),
        timestamp: certificate.issued_at.clone(),
    }
}

/// Run the five offline checks against a certificate.
pub fn verify_certificate(
    certificate: &IntegrityCertificate,
    public_key: &Ed25519PublicKey,
) -> VerificationReport {
    let signature_valid = verify_checkpoint_signature(
        &certificate.proofs.signature.value,
        &certificate.proofs.signature.signed_payload,
        public_key,
    );

    let chain_valid = verify_chain_link(
        &reconstruct_chain_input(certificate),
        &certificate.proofs.chain.chain_hash,
    );

    let merkle_valid = match &certificate.proofs.merkle {
        None => true,
        Some(proof) => verify_inclusion_proof(proof, &proof.leaf_hash, &proof.root),
    };

    let commitment_well_formed =
        is_hex_digest(&certificate.input_commitments.combined_commitment);

    let verdict_derivation_ok = certificate.proofs.verdict_derivation.is_none();

    let report = VerificationReport {
        signature_valid,
        chain_valid,
        merkle_valid,
        commitment_well_formed,
        verdict_derivation_ok,
    };

    if !report.accepted() {
        tracing::debug!(
            certificate_id = %certificate.certificate_id,
            signature_valid,
            chain_valid,
            merkle_valid,
            commitment_well_formed,
            verdict_derivation_ok,
            "certificate failed offline verification"
        );
    }

    report
}
