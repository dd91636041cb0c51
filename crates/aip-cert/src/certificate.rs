//! # Integrity Certificate — The Envelope
//!
//! The self-describing document that packages the input commitments, chain
//! link, Ed25519 signature, and optional Merkle inclusion proof with enough
//! metadata for any third party to verify the checkpoint offline.
//!
//! ## Structure
//!
//! The envelope is rigid; `claims` carries the analyzer's output verbatim.
//! `proofs.merkle` is `null` until the checkpoint is included in a tree
//! epoch, and `proofs.verdict_derivation` is a reserved slot that stays
//! `null` in v1.

use serde::{Deserialize, Serialize};

use aip_core::{
    AgentId, AttestError, CertificateId, CheckpointId, KeyId, SessionId, StructuralError, Verdict,
};
use aip_crypto::{is_hex_digest, InclusionProof};

use crate::inputs::InputCommitments;
use crate::provider::{CertificateIdSource, Clock};

/// JSON-LD context of every v1 certificate.
pub const CERTIFICATE_CONTEXT: &str = "https://mnemom.ai/aip/v1";
/// Document type of every certificate.
pub const CERTIFICATE_TYPE: &str = "IntegrityCertificate";
/// Envelope schema version.
pub const CERTIFICATE_VERSION: &str = "1.0.0";
/// The only signature algorithm issued in v1.
pub const SIGNATURE_ALGORITHM: &str = "Ed25519";

/// Who and what the certificate attests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// The attested checkpoint.
    pub checkpoint_id: CheckpointId,
    /// The agent that produced the reasoning.
    pub agent_id: AgentId,
    /// The session whose chain the checkpoint extends.
    pub session_id: SessionId,
    /// The policy card in force.
    pub card_id: String,
}

/// One concern raised by the analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concern {
    /// Concern category label.
    pub category: String,
    /// Severity label.
    pub severity: String,
    /// Free-form description.
    pub description: String,
}

/// The analyzer's output, carried verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// The verdict label.
    pub verdict: Verdict,
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
}

/// The Ed25519 signature proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureProof {
    /// Always `"Ed25519"` in v1.
    pub algorithm: String,
    /// Which key signed; verification selects the public key by this id.
    pub key_id: KeyId,
    /// The signature, standard padded base64.
    pub value: String,
    /// The exact canonical string that was signed.
    pub signed_payload: String,
}

/// The hash-chain proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainProof {
    /// This checkpoint's chain hash.
    pub chain_hash: String,
    /// Predecessor chain hash, `null` at the session genesis.
    pub prev_chain_hash: Option<String>,
    /// 0-based position in the session chain.
    pub position: u64,
}

/// The proof bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proofs {
    /// Ed25519 signature over the canonical payload.
    pub signature: SignatureProof,
    /// Per-session chain link.
    pub chain: ChainProof,
    /// Merkle inclusion proof; `null` before the first tree epoch.
    #[serde(default)]
    pub merkle: Option<InclusionProof>,
    /// Reserved for the verdict-derivation proof; always `null` in v1.
    #[serde(default)]
    pub verdict_derivation: Option<serde_json::Value>,
}

/// Where a relying party can fetch keys and re-check this certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationEndpoints {
    /// Public-key listing endpoint.
    pub keys_url: String,
    /// Canonical location of this certificate.
    pub certificate_url: String,
    /// Online verification endpoint.
    pub verify_url: String,
}

/// A complete, immutable integrity certificate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrityCertificate {
    /// JSON-LD context.
    #[serde(rename = "@context")]
    pub context: String,
    /// Document type.
    #[serde(rename = "type")]
    pub certificate_type: String,
    /// Envelope schema version.
    pub version: String,
    /// This certificate's identifier.
    pub certificate_id: CertificateId,
    /// Issuance timestamp — also the signed chain timestamp (v1
    /// convention: they are the same field).
    pub issued_at: String,
    /// Who and what is attested.
    pub subject: Subject,
    /// The analyzer's output.
    pub claims: Claims,
    /// Input commitment section.
    pub input_commitments: InputCommitments,
    /// The proof bundle.
    pub proofs: Proofs,
    /// Verification endpoints.
    pub verification: VerificationEndpoints,
}

impl IntegrityCertificate {
    /// Serialize to compact JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a certificate from JSON.
    ///
    /// Parsing is lenient about identifier contents — verification of a
    /// hostile document must report failed checks, not refuse to parse.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Builder for assembling a certificate from the pipeline's artifacts.
///
/// `certificate_id` and `issued_at` come from collaborators at `build()`;
/// every other field is a copy of its input. The `issued_at` override
/// exists because the chain hash already binds the issuance timestamp —
/// the issuer reads the clock once and threads the same string through
/// chain, payload, leaf, and envelope.
#[derive(Default)]
pub struct CertificateBuilder {
    subject: Option<Subject>,
    claims: Option<Claims>,
    input_commitments: Option<InputCommitments>,
    signature: Option<SignatureProof>,
    chain: Option<ChainProof>,
    merkle: Option<InclusionProof>,
    verification: Option<VerificationEndpoints>,
    issued_at: Option<String>,
}

impl CertificateBuilder {
    /// Start an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the subject block.
    pub fn subject(mut self, subject: Subject) -> Self {
        self.subject = Some(subject);
        self
    }

    /// Set the claims block.
    pub fn claims(mut self, claims: Claims) -> Self {
        self.claims = Some(claims);
        self
    }

    /// Set the input-commitment section.
    pub fn input_commitments(mut self, commitments: InputCommitments) -> Self {
        self.input_commitments = Some(commitments);
        self
    }

    /// Set the signature proof.
    pub fn signature(mut self, key_id: KeyId, value: String, signed_payload: String) -> Self {
        self.signature = Some(SignatureProof {
            algorithm: SIGNATURE_ALGORITHM.to_string(),
            key_id,
            value,
            signed_payload,
        });
        self
    }

    /// Set the chain proof.
    pub fn chain(mut self, chain: ChainProof) -> Self {
        self.chain = Some(chain);
        self
    }

    /// Attach a Merkle inclusion proof.
    pub fn merkle(mut self, proof: InclusionProof) -> Self {
        self.merkle = Some(proof);
        self
    }

    /// Set the verification endpoints.
    pub fn verification(mut self, endpoints: VerificationEndpoints) -> Self {
        self.verification = Some(endpoints);
        self
    }

    /// Pin `issued_at` instead of reading the clock at `build()`.
    pub fn issued_at(mut self, issued_at: impl Into<String>) -> Self {
        self.issued_at = Some(issued_at.into());
        self
    }

    /// Assemble the certificate, failing fast on structural problems.
    pub fn build(
        self,
        ids: &dyn CertificateIdSource,
        clock: &dyn Clock,
    ) -> Result<IntegrityCertificate, AttestError> {
        let subject = self.subject.ok_or(StructuralError::MissingField("subject"))?;
        let claims = self.claims.ok_or(StructuralError::MissingField("claims"))?;
        let input_commitments = self
            .input_commitments
            .ok_or(StructuralError::MissingField("input_commitments"))?;
        let signature = self
            .signature
            .ok_or(StructuralError::MissingField("signature"))?;
        let chain = self.chain.ok_or(StructuralError::MissingField("chain"))?;
        let verification = self
            .verification
            .ok_or(StructuralError::MissingField("verification"))?;

        if signature.value.is_empty() {
            return Err(StructuralError::MissingField("signature.value").into());
        }
        if signature.signed_payload.is_empty() {
            return Err(StructuralError::MissingField("signature.signed_payload").into());
        }
        if !is_hex_digest(&input_commitments.combined_commitment) {
            return Err(StructuralError::MalformedDigest("combined_commitment").into());
        }
        if !is_hex_digest(&chain.chain_hash) {
            return Err(StructuralError::MalformedDigest("chain_hash").into());
        }
        if let Some(prev) = &chain.prev_chain_hash {
            if !is_hex_digest(prev) {
                return Err(StructuralError::MalformedDigest("prev_chain_hash").into());
            }
        }
        if !claims.confidence.is_finite() {
            return Err(StructuralError::NonFiniteConfidence(claims.confidence).into());
        }

        let certificate_id = ids.certificate_id();
        let issued_at = self
            .issued_at
            .unwrap_or_else(|| clock.now().to_iso8601());

        tracing::debug!(
            certificate_id = %certificate_id,
            checkpoint_id = %subject.checkpoint_id,
            verdict = %claims.verdict,
            "assembled integrity certificate"
        );

        Ok(IntegrityCertificate {
            context: CERTIFICATE_CONTEXT.to_string(),
            certificate_type: CERTIFICATE_TYPE.to_string(),
            version: CERTIFICATE_VERSION.to_string(),
            certificate_id,
            issued_at,
            subject,
            claims,
            input_commitments,
            proofs: Proofs {
                signature,
                chain,
                merkle: self.merkle,
                verdict_derivation: None,
            },
            verification,
        })
    }
}
