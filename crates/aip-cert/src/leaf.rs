//! # Merkle Leaf — Checkpoint Entry into the Log
//!
//! The leaf record a checkpoint contributes to a tree epoch, and its hash:
//! SHA-256 over the canonical JSON of the five leaf fields.

use serde::{Deserialize, Serialize};

use aip_core::{sha256_hex, CanonicalBytes, CanonicalizationError};

/// The fields a checkpoint contributes to the Merkle log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleLeaf {
    /// The checkpoint identifier.
    #[serde(rename = "checkpointId")]
    pub checkpoint_id: String,
    /// The verdict label.
    pub verdict: String,
    /// SHA-256 of the thinking block.
    #[serde(rename = "thinkingBlockHash")]
    pub thinking_block_hash: String,
    /// This checkpoint's chain hash.
    #[serde(rename = "chainHash")]
    pub chain_hash: String,
    /// The signed timestamp string.
    pub timestamp: String,
}

/// Hash a leaf: canonical JSON → SHA-256 → lowercase hex.
pub fn compute_leaf_hash(leaf: &MerkleLeaf) -> Result<String, CanonicalizationError> {
    Ok(sha256_hex(&CanonicalBytes::new(leaf)?))
}
