//! # Checkpoint Issuer — The Issue Pipeline
//!
//! Wires the pipeline together in issue order: canonicalize → commit →
//! chain-link → sign → leaf/tree/proof → envelope. The clock is read
//! exactly once per issuance; the same rendered timestamp is bound into the
//! chain hash, the signed payload, the Merkle leaf, and `issued_at`.
//!
//! The issuer only *reads* its collaborators. Recording the new chain tip
//! and leaf is the surrounding service's job — and so is serializing
//! issuance per session, without which two checkpoints can legitimately
//! fork the chain.

use aip_core::{AgentId, AttestError, CheckpointId, SessionId, StructuralError, Verdict};
use aip_crypto::{generate_inclusion_proof, is_hex_digest, KeyProvider};

use crate::certificate::{
    CertificateBuilder, ChainProof, Claims, Concern, IntegrityCertificate, VerificationEndpoints,
};
use crate::chain::{compute_chain_hash, ChainInput};
use crate::inputs::{CheckpointInputs, InputCommitments};
use crate::leaf::{compute_leaf_hash, MerkleLeaf};
use crate::payload::{build_signed_payload, sign_checkpoint_with_provider, SignedPayloadFields};
use crate::provider::{CertificateIdSource, ChainStore, Clock, FixedIdSource, LeafStore};

/// Issuer configuration: where relying parties can reach the verification
/// surface.
#[derive(Debug, Clone)]
pub struct IssuerConfig {
    base_url: String,
}

impl IssuerConfig {
    /// Create a config from the service base URL (trailing slash ignored).
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    /// The endpoints block for a certificate.
    pub fn endpoints_for(&self, certificate_id: &aip_core::CertificateId) -> VerificationEndpoints {
        VerificationEndpoints {
            keys_url: format!("{}/keys", self.base_url),
            certificate_url: format!("{}/certificates/{}", self.base_url, certificate_id),
            verify_url: format!("{}/verify", self.base_url),
        }
    }
}

/// Everything the analyzer hands over for one checkpoint.
#[derive(Debug, Clone)]
pub struct IssueRequest {
    /// The checkpoint identifier.
    pub checkpoint_id: CheckpointId,
    /// The attested agent.
    pub agent_id: AgentId,
    /// The session whose chain this extends.
    pub session_id: SessionId,
    /// The policy card in force.
    pub card_id: String,
    /// The verdict label.
    pub verdict: Verdict,
    /// SHA-256 of the thinking block, computed upstream.
    pub thinking_block_hash: String,
    /// The policy inputs to commit to.
    pub inputs: CheckpointInputs,
    /// Concerns raised during analysis.
    pub concerns: Vec<Concern>,
    /// Analyzer confidence in `[0, 1]`.
    pub confidence: f64,
    /// One-paragraph reasoning summary.
    pub reasoning_summary: String,
    /// Model that performed the analysis.
    pub analysis_model: String,
    /// Wall-clock analysis duration.
    pub analysis_duration_ms: u64,
    /// Tree epoch to include the checkpoint in, if one is open.
    pub tree_epoch: Option<String>,
}

/// The issuance pipeline, parameterized over its collaborators.
pub struct CheckpointIssuer<'a> {
    key: &'a dyn KeyProvider,
    clock: &'a dyn Clock,
    ids: &'a dyn CertificateIdSource,
    chain_store: &'a dyn ChainStore,
    leaf_store: Option<&'a dyn LeafStore>,
    config: IssuerConfig,
}

impl<'a> CheckpointIssuer<'a> {
    /// Assemble an issuer over its collaborators.
    pub fn new(
        key: &'a dyn KeyProvider,
        clock: &'a dyn Clock,
        ids: &'a dyn CertificateIdSource,
        chain_store: &'a dyn ChainStore,
        config: IssuerConfig,
    ) -> Self {
        Self {
            key,
            clock,
            ids,
            chain_store,
            leaf_store: None,
            config,
        }
    }

    /// Attach a leaf store so issued checkpoints receive inclusion proofs.
    pub fn with_leaf_store(mut self, leaf_store: &'a dyn LeafStore) -> Self {
        self.leaf_store = Some(leaf_store);
        self
    }

    /// Issue a certificate for one checkpoint.
    ///
    /// Fails fast on structurally broken input; never signs a partially
    /// constructed record.
    pub fn issue(&self, request: IssueRequest) -> Result<IntegrityCertificate, AttestError> {
        if !is_hex_digest(&request.thinking_block_hash) {
            return Err(StructuralError::MalformedDigest("thinking_block_hash").into());
        }

        // One clock reading feeds the chain hash, payload, leaf, and
        // issued_at: they must bind the identical string.
        let issued_at = self.clock.now().to_iso8601();

        let commitments =
            InputCommitments::from_inputs(request.thinking_block_hash.clone(), &request.inputs)?;

        let prev_chain_hash = self.chain_store.prev_chain_hash_for(&request.session_id);
        let position = self.chain_store.chain_length_for(&request.session_id);

        let chain_input = ChainInput {
            prev_chain_hash: prev_chain_hash.clone(),
            checkpoint_id: request.checkpoint_id.as_str().to_string(),
            verdict: request.verdict.as_str().to_string(),
            thinking_block_hash: request.thinking_block_hash.clone(),
            input_commitment: commitments.combined_commitment.clone(),
            timestamp: issued_at.clone(),
        };
        let chain_hash = compute_chain_hash(&chain_input)?;

        let payload = build_signed_payload(&SignedPayloadFields {
            agent_id: request.agent_id.as_str().to_string(),
            chain_hash: chain_hash.clone(),
            checkpoint_id: request.checkpoint_id.as_str().to_string(),
            input_commitment: commitments.combined_commitment.clone(),
            thinking_block_hash: request.thinking_block_hash.clone(),
            timestamp: issued_at.clone(),
            verdict: request.verdict.as_str().to_string(),
        })?;
        let signature = sign_checkpoint_with_provider(&payload, self.key)?;

        let merkle = match (self.leaf_store, &request.tree_epoch) {
            (Some(store), Some(epoch)) => {
                let leaf = MerkleLeaf {
                    checkpoint_id: request.checkpoint_id.as_str().to_string(),
                    verdict: request.verdict.as_str().to_string(),
                    thinking_block_hash: request.thinking_block_hash.clone(),
                    chain_hash: chain_hash.clone(),
                    timestamp: issued_at.clone(),
                };
                let leaf_hash = compute_leaf_hash(&leaf)?;
                let mut leaves = store.leaf_hashes_for_epoch(epoch);
                leaves.push(leaf_hash);
                Some(generate_inclusion_proof(&leaves, leaves.len() - 1)?)
            }
            _ => None,
        };

        let certificate_id = self.ids.certificate_id();
        let endpoints = self.config.endpoints_for(&certificate_id);

        let mut builder = CertificateBuilder::new()
            .subject(crate::certificate::Subject {
                checkpoint_id: request.checkpoint_id.clone(),
                agent_id: request.agent_id,
                session_id: request.session_id,
                card_id: request.card_id,
            })
            .claims(Claims {
                verdict: request.verdict,
                concerns: request.concerns,
                confidence: request.confidence,
                reasoning_summary: request.reasoning_summary,
                analysis_model: request.analysis_model,
                analysis_duration_ms: request.analysis_duration_ms,
            })
            .input_commitments(commitments)
            .signature(self.key.key_id().clone(), signature, payload.as_str().to_string())
            .chain(ChainProof {
                chain_hash,
                prev_chain_hash,
                position,
            })
            .verification(endpoints)
            .issued_at(issued_at);
        if let Some(proof) = merkle {
            builder = builder.merkle(proof);
        }

        let certificate = builder.build(&FixedIdSource(certificate_id), self.clock)?;

        tracing::info!(
            certificate_id = %certificate.certificate_id,
            checkpoint_id = %request.checkpoint_id,
            position = certificate.proofs.chain.position,
            in_tree = certificate.proofs.merkle.is_some(),
            "issued integrity certificate"
        );

        Ok(certificate)
    }
}
