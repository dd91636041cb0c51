//! # Input Commitments
//!
//! Hash-binds the policy inputs a verdict was produced under: the card, the
//! ordered conscience values, the window context, and the model/template
//! versions. The combined commitment is what the chain hash and signed
//! payload carry, so any change to any input — at any nesting depth —
//! changes every downstream artifact.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use aip_core::{sha256_hex, CanonicalBytes, CanonicalizationError};

/// The free-form policy context consumed by the analyzer.
///
/// `card` is an object carrying at least `card_id` and a `values` array;
/// `conscience_values` and `window_context` are ordered sequences. The
/// pipeline never interprets these — it only commits to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointInputs {
    /// The policy card the verdict was evaluated against.
    pub card: Value,
    /// Ordered sequence of conscience value objects.
    #[serde(rename = "conscienceValues")]
    pub conscience_values: Vec<Value>,
    /// Ordered sequence of prior checkpoint summaries.
    #[serde(rename = "windowContext")]
    pub window_context: Vec<Value>,
    /// Analysis model version string.
    #[serde(rename = "modelVersion")]
    pub model_version: String,
    /// Prompt template version string.
    #[serde(rename = "promptTemplateVersion")]
    pub prompt_template_version: String,
}

/// Commit to the full policy context: canonical JSON → SHA-256 → hex.
///
/// Deterministic for semantically equal inputs; mapping-key insertion order
/// is irrelevant at every level. Always 64 lowercase hex characters.
pub fn compute_input_commitment(
    inputs: &CheckpointInputs,
) -> Result<String, CanonicalizationError> {
    Ok(sha256_hex(&CanonicalBytes::new(inputs)?))
}

/// The `input_commitments` section of a certificate.
///
/// The three sub-hashes commit to the card, conscience values, and window
/// context individually so a verifier holding one input can check it without
/// the others; `combined_commitment` covers the whole context and is the
/// value bound into the chain and the signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputCommitments {
    /// SHA-256 of the raw thinking block (computed upstream).
    pub thinking_block_hash: String,
    /// Commitment to the policy card.
    pub card_hash: String,
    /// Commitment to the conscience value sequence.
    pub values_hash: String,
    /// Commitment to the window context sequence.
    pub context_hash: String,
    /// Analysis model version, carried in the clear.
    pub model_version: String,
    /// Commitment to the full `CheckpointInputs`.
    pub combined_commitment: String,
}

impl InputCommitments {
    /// Compute the full commitment section from the policy inputs.
    pub fn from_inputs(
        thinking_block_hash: impl Into<String>,
        inputs: &CheckpointInputs,
    ) -> Result<Self, CanonicalizationError> {
        Ok(Self {
            thinking_block_hash: thinking_block_hash.into(),
            card_hash: sha256_hex(&CanonicalBytes::from_value(&inputs.card)?),
            values_hash: sha256_hex(&CanonicalBytes::new(&inputs.conscience_values)?),
            context_hash: sha256_hex(&CanonicalBytes::new(&inputs.window_context)?),
            model_version: inputs.model_version.clone(),
            combined_commitment: compute_input_commitment(inputs)?,
        })
    }
}
