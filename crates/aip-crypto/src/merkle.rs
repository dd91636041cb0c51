//! # Merkle Log — Binary Tree with Inclusion Proofs
//!
//! A binary SHA-256 Merkle tree over 64-hex leaf hashes, used to aggregate
//! checkpoint leaves into a tamper-evident epoch root.
//!
//! ## Algorithm
//!
//! - Leaves enter as 64-char hex digests and are decoded to raw 32-byte
//!   values once, at tree entry. All internal hashing operates on raw bytes.
//! - Internal node = `SHA-256(left ∥ right)` with no domain-separation
//!   prefix.
//! - **Odd levels duplicate the last node** (it is paired with itself).
//!   This deviates from RFC 6962's lone-node promotion and is load-bearing:
//!   changing it would invalidate every historical proof.
//! - The empty tree's root is `SHA-256("")`; a one-leaf tree's root is that
//!   leaf hash itself.
//!
//! ## Failure model
//!
//! Constructive operations (`compute_merkle_root`, `build_tree_state`,
//! `generate_inclusion_proof`) fail fast on malformed hex or out-of-range
//! indices. `verify_inclusion_proof` is a total predicate: any structural
//! problem yields `false`.

use serde::{Deserialize, Serialize};

use aip_core::MerkleError;

use crate::encoding::{bytes_to_hex, hex_to_digest};
use crate::sha256::{sha256_hex_raw, sha256_raw};

/// Which side a proof sibling sits on relative to the current node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiblingPosition {
    /// Sibling is the left child; current node is the right.
    Left,
    /// Sibling is the right child; current node is the left.
    Right,
}

/// One step of an inclusion proof: a sibling hash and its side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofStep {
    /// The sibling hash (64 hex chars).
    pub hash: String,
    /// The sibling's side relative to the current node.
    pub position: SiblingPosition,
}

/// Summary of a built tree: root, size, and depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeState {
    /// The epoch root (64 hex chars).
    pub root: String,
    /// Number of leaves in the tree.
    pub leaf_count: usize,
    /// `⌈log₂ max(n, 1)⌉`.
    pub depth: u32,
}

/// An inclusion proof binding one leaf to an epoch root.
///
/// Siblings are ordered from the leaf upward; the serialized field name is
/// `inclusion_proof`, matching the certificate wire format. A proof verifies
/// only against the tree size and root it was generated from — proofs do
/// not transfer across epochs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusionProof {
    /// The proven leaf hash (64 hex chars).
    pub leaf_hash: String,
    /// 0-based index of the proven leaf.
    pub leaf_index: usize,
    /// The epoch root this proof was generated against.
    pub root: String,
    /// Number of leaves in the tree at proof generation.
    pub tree_size: usize,
    /// Sibling path from leaf to root.
    #[serde(rename = "inclusion_proof")]
    pub siblings: Vec<ProofStep>,
}

/// The root of the empty tree: `SHA-256` of the empty byte string.
pub fn empty_tree_root() -> String {
    sha256_hex_raw(b"")
}

/// Hash two raw 32-byte nodes into their parent.
fn hash_node(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    let mut preimage = [0u8; 64];
    preimage[..32].copy_from_slice(left);
    preimage[32..].copy_from_slice(right);
    sha256_raw(&preimage)
}

/// Decode leaf hex digests to raw bytes, failing fast on malformed input.
fn decode_leaves(leaf_hashes: &[String]) -> Result<Vec<[u8; 32]>, MerkleError> {
    leaf_hashes
        .iter()
        .map(|h| hex_to_digest(h).map_err(MerkleError::from))
        .collect()
}

/// Reduce one level to the next, duplicating the last node of odd levels.
fn next_level(level: &[[u8; 32]]) -> Vec<[u8; 32]> {
    let mut next = Vec::with_capacity(level.len().div_ceil(2));
    let mut i = 0;
    while i < level.len() {
        let left = &level[i];
        let right = if i + 1 < level.len() {
            &level[i + 1]
        } else {
            &level[i]
        };
        next.push(hash_node(left, right));
        i += 2;
    }
    next
}

/// Compute the epoch root over an ordered leaf sequence.
///
/// The empty sequence yields `empty_tree_root()`; a single leaf is its own
/// root.
pub fn compute_merkle_root(leaf_hashes: &[String]) -> Result<String, MerkleError> {
    if leaf_hashes.is_empty() {
        return Ok(empty_tree_root());
    }
    let mut level = decode_leaves(leaf_hashes)?;
    while level.len() > 1 {
        level = next_level(&level);
    }
    Ok(bytes_to_hex(&level[0]))
}

/// `⌈log₂ max(n, 1)⌉` — the number of reduction levels above the leaves.
fn tree_depth(leaf_count: usize) -> u32 {
    if leaf_count <= 1 {
        0
    } else {
        usize::BITS - (leaf_count - 1).leading_zeros()
    }
}

/// Build the tree summary for an ordered leaf sequence.
pub fn build_tree_state(leaf_hashes: &[String]) -> Result<TreeState, MerkleError> {
    Ok(TreeState {
        root: compute_merkle_root(leaf_hashes)?,
        leaf_count: leaf_hashes.len(),
        depth: tree_depth(leaf_hashes.len()),
    })
}

/// Generate an inclusion proof for the leaf at `leaf_index`.
///
/// Siblings are appended level by level from the leaf upward. When the
/// current node closes an odd-length level, its sibling is itself and the
/// recorded position is `right`, mirroring the duplication rule used to
/// build the tree.
///
/// # Errors
///
/// `MerkleError::IndexOutOfRange` when `leaf_index >= leaf_hashes.len()`
/// (including the empty tree); `MerkleError::Encoding` on malformed hex.
pub fn generate_inclusion_proof(
    leaf_hashes: &[String],
    leaf_index: usize,
) -> Result<InclusionProof, MerkleError> {
    if leaf_index >= leaf_hashes.len() {
        return Err(MerkleError::IndexOutOfRange {
            index: leaf_index,
            leaf_count: leaf_hashes.len(),
        });
    }

    let mut level = decode_leaves(leaf_hashes)?;
    let leaf_hash = bytes_to_hex(&level[leaf_index]);
    let tree_size = level.len();

    let mut siblings = Vec::with_capacity(tree_depth(tree_size) as usize);
    let mut index = leaf_index;
    while level.len() > 1 {
        let sibling_index = index ^ 1;
        if sibling_index < level.len() {
            let position = if sibling_index < index {
                SiblingPosition::Left
            } else {
                SiblingPosition::Right
            };
            siblings.push(ProofStep {
                hash: bytes_to_hex(&level[sibling_index]),
                position,
            });
        } else {
            // Last node of an odd level: paired with itself.
            siblings.push(ProofStep {
                hash: bytes_to_hex(&level[index]),
                position: SiblingPosition::Right,
            });
        }
        level = next_level(&level);
        index /= 2;
    }

    Ok(InclusionProof {
        leaf_hash,
        leaf_index,
        root: bytes_to_hex(&level[0]),
        tree_size,
        siblings,
    })
}

/// Verify an inclusion proof against an expected root.
///
/// Total predicate: folds the sibling path from the given leaf and compares
/// the result to `expected_root`. Malformed hex anywhere, or a mismatched
/// final hash, yields `false` — never an error.
pub fn verify_inclusion_proof(
    proof: &InclusionProof,
    leaf_hash: &str,
    expected_root: &str,
) -> bool {
    let mut current = match hex_to_digest(leaf_hash) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    for step in &proof.siblings {
        let sibling = match hex_to_digest(&step.hash) {
            Ok(bytes) => bytes,
            Err(_) => return false,
        };
        current = match step.position {
            SiblingPosition::Left => hash_node(&sibling, &current),
            SiblingPosition::Right => hash_node(&current, &sibling),
        };
    }
    bytes_to_hex(&current) == expected_root.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic synthetic leaf digests.
    fn h(i: usize) -> String {
        sha256_hex_raw(format!("leaf-{i}").as_bytes())
    }

    fn leaves(n: usize) -> Vec<String> {
        (0..n).map(h).collect()
    }

    #[test]
    fn empty_tree_root_is_hash_of_empty_string() {
        assert_eq!(
            compute_merkle_root(&[]).unwrap(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn single_leaf_root_is_the_leaf() {
        let l = leaves(1);
        assert_eq!(compute_merkle_root(&l).unwrap(), l[0]);
    }

    #[test]
    fn two_leaf_root_is_node_hash() {
        let l = leaves(2);
        let root = compute_merkle_root(&l).unwrap();
        let left = hex_to_digest(&l[0]).unwrap();
        let right = hex_to_digest(&l[1]).unwrap();
        assert_eq!(root, bytes_to_hex(&hash_node(&left, &right)));
    }

    #[test]
    fn odd_level_duplicates_last_node() {
        // With 3 leaves the second pair is (c, c), not a promoted c.
        let l = leaves(3);
        let a = hex_to_digest(&l[0]).unwrap();
        let b = hex_to_digest(&l[1]).unwrap();
        let c = hex_to_digest(&l[2]).unwrap();
        let expected = hash_node(&hash_node(&a, &b), &hash_node(&c, &c));
        assert_eq!(compute_merkle_root(&l).unwrap(), bytes_to_hex(&expected));
    }

    #[test]
    fn malformed_leaf_hex_rejected() {
        let bad = vec!["zz".repeat(32)];
        assert!(compute_merkle_root(&bad).is_err());
        let short = vec!["abcd".to_string()];
        assert!(compute_merkle_root(&short).is_err());
    }

    #[test]
    fn tree_depth_follows_ceil_log2() {
        for (n, d) in [(0, 0), (1, 0), (2, 1), (3, 2), (4, 2), (5, 3), (8, 3), (9, 4)] {
            assert_eq!(tree_depth(n), d, "depth wrong for n={n}");
        }
    }

    #[test]
    fn build_tree_state_summary() {
        let l = leaves(5);
        let state = build_tree_state(&l).unwrap();
        assert_eq!(state.leaf_count, 5);
        assert_eq!(state.depth, 3);
        assert_eq!(state.root, compute_merkle_root(&l).unwrap());
    }

    #[test]
    fn proofs_verify_for_all_indices_across_sizes() {
        for size in [1usize, 2, 3, 4, 5, 6, 7, 8, 9, 15, 16, 17, 31, 32, 33] {
            let l = leaves(size);
            let root = compute_merkle_root(&l).unwrap();
            for idx in 0..size {
                let proof = generate_inclusion_proof(&l, idx).unwrap();
                assert_eq!(proof.root, root, "root mismatch size={size} idx={idx}");
                assert_eq!(proof.tree_size, size);
                assert_eq!(proof.leaf_index, idx);
                assert!(
                    verify_inclusion_proof(&proof, &l[idx], &root),
                    "proof failed size={size} idx={idx}"
                );
            }
        }
    }

    #[test]
    fn single_leaf_proof_has_no_siblings() {
        let l = leaves(1);
        let proof = generate_inclusion_proof(&l, 0).unwrap();
        assert!(proof.siblings.is_empty());
        assert_eq!(proof.root, l[0]);
        assert!(verify_inclusion_proof(&proof, &l[0], &proof.root));
    }

    #[test]
    fn odd_tail_sibling_is_self_on_the_right() {
        let l = leaves(5);
        let proof = generate_inclusion_proof(&l, 4).unwrap();
        assert_eq!(proof.siblings[0].hash, l[4]);
        assert_eq!(proof.siblings[0].position, SiblingPosition::Right);
        assert!(verify_inclusion_proof(
            &proof,
            &l[4],
            &compute_merkle_root(&l).unwrap()
        ));
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let l = leaves(5);
        assert!(matches!(
            generate_inclusion_proof(&l, 5),
            Err(MerkleError::IndexOutOfRange {
                index: 5,
                leaf_count: 5
            })
        ));
        assert!(generate_inclusion_proof(&[], 0).is_err());
    }

    #[test]
    fn tampered_sibling_fails_verification() {
        let l = leaves(9);
        let root = compute_merkle_root(&l).unwrap();
        let mut proof = generate_inclusion_proof(&l, 3).unwrap();
        proof.siblings[0].hash = "00".repeat(32);
        assert!(!verify_inclusion_proof(&proof, &l[3], &root));
    }

    #[test]
    fn wrong_leaf_fails_verification() {
        let l = leaves(8);
        let root = compute_merkle_root(&l).unwrap();
        let proof = generate_inclusion_proof(&l, 2).unwrap();
        assert!(!verify_inclusion_proof(&proof, &l[3], &root));
    }

    #[test]
    fn malformed_inputs_are_false_not_errors() {
        let l = leaves(4);
        let root = compute_merkle_root(&l).unwrap();
        let mut proof = generate_inclusion_proof(&l, 1).unwrap();
        assert!(!verify_inclusion_proof(&proof, "not-hex", &root));
        proof.siblings[0].hash = "garbage".to_string();
        assert!(!verify_inclusion_proof(&proof, &l[1], &root));
    }

    #[test]
    fn growth_changes_root_and_stales_proofs() {
        let five = leaves(5);
        let ten = leaves(10);
        let root5 = compute_merkle_root(&five).unwrap();
        let root10 = compute_merkle_root(&ten).unwrap();
        assert_ne!(root5, root10);

        let proof5 = generate_inclusion_proof(&five, 2).unwrap();
        assert!(verify_inclusion_proof(&proof5, &five[2], &root5));
        assert!(!verify_inclusion_proof(&proof5, &five[2], &root10));

        let proof10 = generate_inclusion_proof(&ten, 2).unwrap();
        assert!(verify_inclusion_proof(&proof10, &ten[2], &root10));
    }

    #[test]
    fn deletion_changes_root_and_stales_proofs() {
        let six = leaves(6);
        let root6 = compute_merkle_root(&six).unwrap();
        let proof = generate_inclusion_proof(&six, 3).unwrap();
        assert!(verify_inclusion_proof(&proof, &six[3], &root6));

        let mut five = six.clone();
        five.remove(3);
        let root5 = compute_merkle_root(&five).unwrap();
        assert_ne!(root5, root6);
        assert!(!verify_inclusion_proof(&proof, &six[3], &root5));
    }

    #[test]
    fn reordering_changes_root() {
        let l = leaves(4);
        let mut swapped = l.clone();
        swapped.swap(1, 2);
        assert_ne!(
            compute_merkle_root(&l).unwrap(),
            compute_merkle_root(&swapped).unwrap()
        );
    }

    #[test]
    fn proof_serde_uses_wire_field_name() {
        let l = leaves(2);
        let proof = generate_inclusion_proof(&l, 0).unwrap();
        let json = serde_json::to_value(&proof).unwrap();
        assert!(json.get("inclusion_proof").is_some());
        assert!(json.get("siblings").is_none());
        assert_eq!(json["inclusion_proof"][0]["position"], "right");
        let back: InclusionProof = serde_json::from_value(json).unwrap();
        assert_eq!(back, proof);
    }
}
