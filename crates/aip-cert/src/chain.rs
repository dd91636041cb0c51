//! # Chain Linker — Per-Session Hash Chain
//!
//! Binds each checkpoint to its predecessor through a SHA-256 link over a
//! pipe-delimited preimage, forming an append-only per-session history.
//!
//! ## Preimage
//!
//! ```text
//! <prev>|<checkpointId>|<verdict>|<thinkingBlockHash>|<inputCommitment>|<timestamp>
//! ```
//!
//! `<prev>` is the literal `genesis` for the first checkpoint of a session,
//! else the predecessor's 64-hex chain hash. Fields are raw ASCII, never
//! JSON-encoded; pipes inside fields are rejected at hash computation.
//!
//! ## Failure model
//!
//! `compute_chain_hash` fails fast on pipe-bearing fields.
//! `verify_chain_link` and `verify_chain_sequence` are total: malformed
//! input is a failed verification, never an error.

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use aip_core::StructuralError;
use aip_crypto::sha256_hex_raw;

/// Sentinel used where no previous chain hash exists.
pub const GENESIS: &str = "genesis";

/// The fields bound into one chain link.
///
/// `timestamp` is the exact rendered string that was signed; callers that
/// round-trip through storage must not reformat it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainInput {
    /// Predecessor chain hash, or `None` at the session genesis.
    pub prev_chain_hash: Option<String>,
    /// The checkpoint being linked.
    pub checkpoint_id: String,
    /// The verdict label.
    pub verdict: String,
    /// SHA-256 of the thinking block.
    pub thinking_block_hash: String,
    /// The combined input commitment.
    pub input_commitment: String,
    /// The signed timestamp string.
    pub timestamp: String,
}

fn require_pipe_free(
    field: &'static str,
    value: &str,
) -> Result<(), StructuralError> {
    if value.contains('|') {
        return Err(StructuralError::ForbiddenPipe(field));
    }
    Ok(())
}

/// Assemble the pipe-delimited preimage, rejecting pipe-bearing fields.
fn chain_preimage(input: &ChainInput) -> Result<String, StructuralError> {
    let prev = match &input.prev_chain_hash {
        Some(hash) => {
            require_pipe_free("prev_chain_hash", hash)?;
            hash.as_str()
        }
        None => GENESIS,
    };
    require_pipe_free("checkpoint_id", &input.checkpoint_id)?;
    require_pipe_free("verdict", &input.verdict)?;
    require_pipe_free("thinking_block_hash", &input.thinking_block_hash)?;
    require_pipe_free("input_commitment", &input.input_commitment)?;
    require_pipe_free("timestamp", &input.timestamp)?;
    Ok(format!(
        "{prev}|{}|{}|{}|{}|{}",
        input.checkpoint_id,
        input.verdict,
        input.thinking_block_hash,
        input.input_commitment,
        input.timestamp
    ))
}

/// Compute the chain hash: SHA-256 of the UTF-8 preimage bytes, lowercase
/// hex.
pub fn compute_chain_hash(input: &ChainInput) -> Result<String, StructuralError> {
    Ok(sha256_hex_raw(chain_preimage(input)?.as_bytes()))
}

/// Verify one chain link against an expected hash.
///
/// Recomputes the link and compares in constant time. Total: a preimage
/// that cannot be computed (pipes in fields) is a failed verification.
pub fn verify_chain_link(input: &ChainInput, expected_hex: &str) -> bool {
    let recomputed = match compute_chain_hash(input) {
        Ok(hash) => hash,
        Err(_) => return false,
    };
    let a = recomputed.as_bytes();
    let b = expected_hex.as_bytes();
    a.len() == b.len() && bool::from(a.ct_eq(b))
}

/// A checkpoint paired with its stored chain hash, as replayed from a
/// session history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainedCheckpoint {
    /// The link's input fields.
    #[serde(flatten)]
    pub input: ChainInput,
    /// The chain hash recorded for this checkpoint.
    pub chain_hash: String,
}

/// The outcome of replaying a session chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSequenceReport {
    /// Whether every link verified.
    pub valid: bool,
    /// Number of links fully verified before the first break.
    pub links_verified: usize,
    /// Index of the first broken checkpoint, if any.
    pub broken_at: Option<usize>,
    /// Human-readable description of the outcome.
    pub details: String,
}

impl ChainSequenceReport {
    fn broken(at: usize, details: String) -> Self {
        Self {
            valid: false,
            links_verified: at,
            broken_at: Some(at),
            details,
        }
    }
}

/// Replay an ordered session history and verify every link.
///
/// - `C₀` must be the session genesis (`prev_chain_hash == None`).
/// - For `i ≥ 1`, `Cᵢ.prev_chain_hash` must equal `Cᵢ₋₁.chain_hash`.
/// - Every stored hash must match recomputation.
///
/// Reports the first broken index and stops. The empty sequence is valid
/// with zero links verified.
pub fn verify_chain_sequence(checkpoints: &[ChainedCheckpoint]) -> ChainSequenceReport {
    if checkpoints.is_empty() {
        return ChainSequenceReport {
            valid: true,
            links_verified: 0,
            broken_at: None,
            details: "empty chain".to_string(),
        };
    }

    for (i, checkpoint) in checkpoints.iter().enumerate() {
        if i == 0 {
            if checkpoint.input.prev_chain_hash.is_some() {
                return ChainSequenceReport::broken(
                    0,
                    "checkpoint 0 must be the session genesis".to_string(),
                );
            }
        } else {
            let expected_prev = &checkpoints[i - 1].chain_hash;
            if checkpoint.input.prev_chain_hash.as_ref() != Some(expected_prev) {
                return ChainSequenceReport::broken(
                    i,
                    format!("checkpoint {i} does not link to its predecessor"),
                );
            }
        }
        if !verify_chain_link(&checkpoint.input, &checkpoint.chain_hash) {
            return ChainSequenceReport::broken(
                i,
                format!("stored chain hash at {i} does not match recomputation"),
            );
        }
    }

    ChainSequenceReport {
        valid: true,
        links_verified: checkpoints.len(),
        broken_at: None,
        details: format!("verified {} links", checkpoints.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genesis_input() -> ChainInput {
        ChainInput {
            prev_chain_hash: None,
            checkpoint_id: "ic-chain-001".to_string(),
            verdict: "clear".to_string(),
            thinking_block_hash: "ab".repeat(32),
            input_commitment: "cd".repeat(32),
            timestamp: "2025-01-15T10:00:00.000Z".to_string(),
        }
    }

    fn link(prev: Option<String>, n: u32) -> ChainedCheckpoint {
        let input = ChainInput {
            prev_chain_hash: prev,
            checkpoint_id: format!("ic-chain-{n:03}"),
            verdict: "clear".to_string(),
            thinking_block_hash: "ab".repeat(32),
            input_commitment: "cd".repeat(32),
            timestamp: format!("2025-01-15T10:00:0{}.000Z", n % 10),
        };
        let chain_hash = compute_chain_hash(&input).unwrap();
        ChainedCheckpoint { input, chain_hash }
    }

    fn build_chain(len: usize) -> Vec<ChainedCheckpoint> {
        let mut chain: Vec<ChainedCheckpoint> = Vec::with_capacity(len);
        for i in 0..len {
            let prev = chain.last().map(|c| c.chain_hash.clone());
            chain.push(link(prev, i as u32));
        }
        chain
    }

    #[test]
    fn genesis_preimage_uses_sentinel() {
        let preimage = chain_preimage(&genesis_input()).unwrap();
        assert!(preimage.starts_with("genesis|ic-chain-001|clear|"));
        assert!(!preimage.ends_with('\n'));
        assert_eq!(preimage.matches('|').count(), 5);
    }

    #[test]
    fn chain_hash_is_64_hex_and_stable() {
        let input = genesis_input();
        let a = compute_chain_hash(&input).unwrap();
        let b = compute_chain_hash(&input).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn pipe_in_field_fails_fast() {
        let mut input = genesis_input();
        input.verdict = "clear|fake".to_string();
        assert!(matches!(
            compute_chain_hash(&input),
            Err(StructuralError::ForbiddenPipe("verdict"))
        ));
        // The predicate swallows the same condition.
        assert!(!verify_chain_link(&input, &"00".repeat(32)));
    }

    #[test]
    fn verify_link_round_trip() {
        let input = genesis_input();
        let hash = compute_chain_hash(&input).unwrap();
        assert!(verify_chain_link(&input, &hash));
        assert!(!verify_chain_link(&input, &"00".repeat(32)));
        assert!(!verify_chain_link(&input, "short"));
    }

    #[test]
    fn verdict_tamper_detected() {
        let honest = genesis_input();
        let hash = compute_chain_hash(&honest).unwrap();
        let mut tampered = honest.clone();
        tampered.verdict = "boundary_violation".to_string();
        assert!(!verify_chain_link(&tampered, &hash));
    }

    #[test]
    fn timestamp_reformat_breaks_verification() {
        let input = genesis_input();
        let hash = compute_chain_hash(&input).unwrap();
        let mut reformatted = input.clone();
        // Stripping milliseconds is exactly the storage bug this guards.
        reformatted.timestamp = "2025-01-15T10:00:00Z".to_string();
        assert!(!verify_chain_link(&reformatted, &hash));
    }

    #[test]
    fn empty_sequence_is_valid() {
        let report = verify_chain_sequence(&[]);
        assert!(report.valid);
        assert_eq!(report.links_verified, 0);
        assert_eq!(report.broken_at, None);
    }

    #[test]
    fn correct_chain_verifies_fully() {
        let chain = build_chain(5);
        let report = verify_chain_sequence(&chain);
        assert!(report.valid, "{}", report.details);
        assert_eq!(report.links_verified, 5);
        assert_eq!(report.broken_at, None);
    }

    #[test]
    fn non_genesis_head_breaks_at_zero() {
        let mut chain = build_chain(3);
        chain[0].input.prev_chain_hash = Some("ee".repeat(32));
        chain[0].chain_hash = compute_chain_hash(&chain[0].input).unwrap();
        let report = verify_chain_sequence(&chain);
        assert!(!report.valid);
        assert_eq!(report.broken_at, Some(0));
        assert_eq!(report.links_verified, 0);
    }

    #[test]
    fn broken_middle_link_reports_first_break() {
        let mut chain = build_chain(5);
        chain[2].input.prev_chain_hash = Some("ee".repeat(32));
        chain[2].chain_hash = compute_chain_hash(&chain[2].input).unwrap();
        let report = verify_chain_sequence(&chain);
        assert!(!report.valid);
        assert_eq!(report.broken_at, Some(2));
        assert_eq!(report.links_verified, 2);
    }

    #[test]
    fn stored_hash_mismatch_detected() {
        let mut chain = build_chain(4);
        chain[3].chain_hash = "00".repeat(32);
        let report = verify_chain_sequence(&chain);
        assert!(!report.valid);
        assert_eq!(report.broken_at, Some(3));
        assert_eq!(report.links_verified, 3);
    }

    #[test]
    fn retroactive_edit_breaks_the_suffix() {
        let mut chain = build_chain(4);
        // Rewrite checkpoint 1's verdict and recompute only its own hash.
        chain[1].input.verdict = "review_needed".to_string();
        chain[1].chain_hash = compute_chain_hash(&chain[1].input).unwrap();
        let report = verify_chain_sequence(&chain);
        assert!(!report.valid);
        // Checkpoint 2 no longer links to the rewritten hash.
        assert_eq!(report.broken_at, Some(2));
    }
}
