//! End-to-end attestation scenarios: issue a checkpoint through the whole
//! pipeline by hand and verify the resulting certificate fully offline, plus
//! the key-rotation, tree-growth, deletion, and tamper cases a relying party
//! depends on.

use aip_core::{AgentId, CertificateId, CheckpointId, KeyId, SessionId, Timestamp, Verdict};
use aip_crypto::{
    compute_merkle_root, generate_inclusion_proof, verify_checkpoint_signature,
    verify_inclusion_proof, Ed25519KeyPair, KeyRing, LocalKeyProvider,
};

use aip_cert::{
    build_signed_payload, compute_chain_hash, compute_leaf_hash, sign_checkpoint,
    verify_certificate, verify_chain_link, CertificateBuilder, ChainInput, ChainProof,
    CheckpointInputs, Claims, FixedClock, FixedIdSource, InputCommitments, IntegrityCertificate,
    MerkleLeaf, SignedPayloadFields, Subject, VerificationEndpoints,
};
use aip_crypto::KeyProvider;

const TIMESTAMP: &str = "2025-01-15T10:00:00.000Z";

fn offline_inputs() -> CheckpointInputs {
    CheckpointInputs {
        card: serde_json::json!({
            "card_id": "card-offline-001",
            "values": [{"name": "honesty", "weight": 5}]
        }),
        conscience_values: vec![serde_json::json!({"name": "honesty", "weight": 5})],
        window_context: vec![],
        model_version: "claude-3-opus-20240229".to_string(),
        prompt_template_version: "2.1.0".to_string(),
    }
}

fn endpoints(certificate_id: &str) -> VerificationEndpoints {
    VerificationEndpoints {
        keys_url: "https://attest.example/keys".to_string(),
        certificate_url: format!("https://attest.example/certificates/{certificate_id}"),
        verify_url: "https://attest.example/verify".to_string(),
    }
}

/// Drive the full issue flow by hand and return the certificate with its key.
fn issue_offline_certificate() -> (IntegrityCertificate, Ed25519KeyPair) {
    let keypair = Ed25519KeyPair::generate();
    let thinking_block_hash = "ff00ff00".repeat(8);

    let commitments =
        InputCommitments::from_inputs(thinking_block_hash.clone(), &offline_inputs()).unwrap();

    let chain_input = ChainInput {
        prev_chain_hash: None,
        checkpoint_id: "ic-offline-001".to_string(),
        verdict: "review_needed".to_string(),
        thinking_block_hash: thinking_block_hash.clone(),
        input_commitment: commitments.combined_commitment.clone(),
        timestamp: TIMESTAMP.to_string(),
    };
    let chain_hash = compute_chain_hash(&chain_input).unwrap();

    let payload = build_signed_payload(&SignedPayloadFields {
        agent_id: "agent-offline-001".to_string(),
        chain_hash: chain_hash.clone(),
        checkpoint_id: "ic-offline-001".to_string(),
        input_commitment: commitments.combined_commitment.clone(),
        thinking_block_hash: thinking_block_hash.clone(),
        timestamp: TIMESTAMP.to_string(),
        verdict: "review_needed".to_string(),
    })
    .unwrap();
    let signature = sign_checkpoint(&payload, &keypair);

    let leaf = MerkleLeaf {
        checkpoint_id: "ic-offline-001".to_string(),
        verdict: "review_needed".to_string(),
        thinking_block_hash: thinking_block_hash.clone(),
        chain_hash: chain_hash.clone(),
        timestamp: TIMESTAMP.to_string(),
    };
    let leaf_hash = compute_leaf_hash(&leaf).unwrap();
    let leaves = vec![leaf_hash.clone()];
    let proof = generate_inclusion_proof(&leaves, 0).unwrap();
    // One-leaf tree: the root is the leaf itself.
    assert_eq!(proof.root, leaf_hash);

    let certificate = CertificateBuilder::new()
        .subject(Subject {
            checkpoint_id: CheckpointId::new("ic-offline-001").unwrap(),
            agent_id: AgentId::new("agent-offline-001").unwrap(),
            session_id: SessionId::new("session-offline-001").unwrap(),
            card_id: "card-offline-001".to_string(),
        })
        .claims(Claims {
            verdict: Verdict::review_needed(),
            concerns: vec![],
            confidence: 0.73,
            reasoning_summary: "ambiguity in declared intent".to_string(),
            analysis_model: "claude-3-opus-20240229".to_string(),
            analysis_duration_ms: 512,
        })
        .input_commitments(commitments)
        .signature(
            KeyId::from_public_key_hex(&keypair.public_key().to_hex()),
            signature,
            payload.as_str().to_string(),
        )
        .chain(ChainProof {
            chain_hash,
            prev_chain_hash: None,
            position: 0,
        })
        .merkle(proof)
        .verification(endpoints("cert-offln001"))
        .issued_at(TIMESTAMP)
        .build(
            &FixedIdSource(CertificateId::new("cert-offln001").unwrap()),
            &FixedClock(Timestamp::parse(TIMESTAMP).unwrap()),
        )
        .unwrap();

    (certificate, keypair)
}

// ---------------------------------------------------------------------------
// Scenario A — happy path, fully offline verification
// ---------------------------------------------------------------------------

#[test]
fn offline_verification_happy_path() {
    let (certificate, keypair) = issue_offline_certificate();
    let report = verify_certificate(&certificate, &keypair.public_key());
    assert!(report.signature_valid, "signature check failed");
    assert!(report.chain_valid, "chain check failed");
    assert!(report.merkle_valid, "merkle check failed");
    assert!(report.commitment_well_formed, "commitment check failed");
    assert!(report.verdict_derivation_ok, "reserved slot check failed");
    assert!(report.accepted());
}

#[test]
fn offline_verification_survives_the_wire() {
    let (certificate, keypair) = issue_offline_certificate();
    let json = certificate.to_json().unwrap();
    let parsed = IntegrityCertificate::from_json(&json).unwrap();
    assert!(verify_certificate(&parsed, &keypair.public_key()).accepted());
}

// ---------------------------------------------------------------------------
// Scenario B — signed-payload determinism and key order
// ---------------------------------------------------------------------------

#[test]
fn signed_payload_determinism() {
    let fields = SignedPayloadFields {
        agent_id: "agent-determ-001".to_string(),
        chain_hash: "12340000".repeat(8),
        checkpoint_id: "ic-determ-001".to_string(),
        input_commitment: "ef010000".repeat(8),
        thinking_block_hash: "abcd0000".repeat(8),
        timestamp: TIMESTAMP.to_string(),
        verdict: "clear".to_string(),
    };
    let outputs: Vec<String> = (0..3)
        .map(|_| {
            build_signed_payload(&fields)
                .unwrap()
                .as_str()
                .to_string()
        })
        .collect();
    assert_eq!(outputs[0], outputs[1]);
    assert_eq!(outputs[1], outputs[2]);

    let expected_order = [
        "agent_id",
        "chain_hash",
        "checkpoint_id",
        "input_commitment",
        "thinking_block_hash",
        "timestamp",
        "verdict",
    ];
    let positions: Vec<usize> = expected_order
        .iter()
        .map(|key| outputs[0].find(&format!("\"{key}\":")).expect("key missing"))
        .collect();
    assert!(
        positions.windows(2).all(|w| w[0] < w[1]),
        "payload keys not lexicographic: {}",
        outputs[0]
    );
}

// ---------------------------------------------------------------------------
// Scenario C — key rotation is selection policy only
// ---------------------------------------------------------------------------

#[test]
fn key_rotation_does_not_touch_history() {
    let provider_a = LocalKeyProvider::generate();
    let provider_b = LocalKeyProvider::generate();
    let pk_a = provider_a.public_key().unwrap();
    let pk_b = provider_b.public_key().unwrap();

    let p1 = build_signed_payload(&SignedPayloadFields {
        agent_id: "agent-rot-001".to_string(),
        chain_hash: "11".repeat(32),
        checkpoint_id: "ic-rot-001".to_string(),
        input_commitment: "22".repeat(32),
        thinking_block_hash: "33".repeat(32),
        timestamp: TIMESTAMP.to_string(),
        verdict: "clear".to_string(),
    })
    .unwrap();
    let p2 = build_signed_payload(&SignedPayloadFields {
        agent_id: "agent-rot-001".to_string(),
        chain_hash: "44".repeat(32),
        checkpoint_id: "ic-rot-002".to_string(),
        input_commitment: "55".repeat(32),
        thinking_block_hash: "66".repeat(32),
        timestamp: TIMESTAMP.to_string(),
        verdict: "clear".to_string(),
    })
    .unwrap();

    let sig_a = provider_a.sign(p1.canonical_bytes()).unwrap().to_base64();
    let sig_b = provider_b.sign(p2.canonical_bytes()).unwrap().to_base64();

    let check = |ring: &KeyRing| {
        let resolved_a = ring.public_key_for(provider_a.key_id()).unwrap();
        let resolved_b = ring.public_key_for(provider_b.key_id()).unwrap();
        assert!(verify_checkpoint_signature(&sig_a, p1.as_str(), resolved_a));
        assert!(!verify_checkpoint_signature(&sig_a, p1.as_str(), resolved_b));
        assert!(verify_checkpoint_signature(&sig_b, p2.as_str(), resolved_b));
        assert!(!verify_checkpoint_signature(&sig_b, p2.as_str(), resolved_a));
    };

    let mut ring = KeyRing::new();
    ring.register(provider_a.key_id().clone(), pk_a);
    ring.register(provider_b.key_id().clone(), pk_b);
    check(&ring);

    // Deactivation changes which key signs next, nothing else.
    ring.deactivate(provider_a.key_id()).unwrap();
    assert!(!ring.is_active_candidate(provider_a.key_id()));
    check(&ring);
}

// ---------------------------------------------------------------------------
// Scenarios D & E — tree growth and deletion detection
// ---------------------------------------------------------------------------

fn epoch_leaves(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            compute_leaf_hash(&MerkleLeaf {
                checkpoint_id: format!("ic-epoch-{i:03}"),
                verdict: "clear".to_string(),
                thinking_block_hash: "ab".repeat(32),
                chain_hash: "cd".repeat(32),
                timestamp: TIMESTAMP.to_string(),
            })
            .unwrap()
        })
        .collect()
}

#[test]
fn stale_proof_fails_after_growth() {
    let five = epoch_leaves(5);
    let root5 = compute_merkle_root(&five).unwrap();
    let proof5 = generate_inclusion_proof(&five, 2).unwrap();
    assert!(verify_inclusion_proof(&proof5, &five[2], &root5));

    let ten = epoch_leaves(10);
    let root10 = compute_merkle_root(&ten).unwrap();
    assert_ne!(root5, root10);
    assert!(!verify_inclusion_proof(&proof5, &five[2], &root10));

    let fresh = generate_inclusion_proof(&ten, 2).unwrap();
    assert!(verify_inclusion_proof(&fresh, &ten[2], &root10));
}

#[test]
fn deletion_is_detected_by_stale_proofs() {
    let six = epoch_leaves(6);
    let root6 = compute_merkle_root(&six).unwrap();
    let proof = generate_inclusion_proof(&six, 3).unwrap();
    assert!(verify_inclusion_proof(&proof, &six[3], &root6));

    let mut five = six.clone();
    five.remove(3);
    let root5 = compute_merkle_root(&five).unwrap();
    assert_ne!(root5, root6);
    assert!(!verify_inclusion_proof(&proof, &six[3], &root5));
}

// ---------------------------------------------------------------------------
// Scenario F — verdict tamper on the chain
// ---------------------------------------------------------------------------

#[test]
fn verdict_tamper_breaks_chain_verification() {
    let honest = ChainInput {
        prev_chain_hash: None,
        checkpoint_id: "ic-tamper-001".to_string(),
        verdict: "clear".to_string(),
        thinking_block_hash: "ab".repeat(32),
        input_commitment: "cd".repeat(32),
        timestamp: TIMESTAMP.to_string(),
    };
    let honest_hash = compute_chain_hash(&honest).unwrap();
    assert!(verify_chain_link(&honest, &honest_hash));

    let mut tampered = honest.clone();
    tampered.verdict = "boundary_violation".to_string();
    assert!(!verify_chain_link(&tampered, &honest_hash));
}
