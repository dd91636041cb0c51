//! # Collaborator Interfaces
//!
//! The narrow interfaces through which the pipeline reaches its external
//! collaborators: a clock, a certificate-id source, the per-session chain
//! store, and the epoch leaf store. Each trait ships with an in-memory
//! implementation for development and tests; production backends live with
//! the surrounding services.
//!
//! The core only ever *reads* through these traits. The recording side
//! (`record_chain_hash`, `append_leaf`) belongs to the collaborator and is
//! exposed on the memory backends so callers can model it.

use std::collections::BTreeMap;
use std::sync::Mutex;

use rand::Rng;

use aip_core::{CertificateId, SessionId, Timestamp};

/// Source of `issued_at` timestamps.
pub trait Clock: Send + Sync {
    /// Current time, UTC, millisecond precision.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock pinned to one instant, for tests and replay.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

/// Source of fresh certificate identifiers.
pub trait CertificateIdSource: Send + Sync {
    /// A new `cert-<8 [a-z0-9]>` identifier.
    fn certificate_id(&self) -> CertificateId;
}

/// Random identifiers from the thread RNG. Certificate ids are not secret,
/// so cryptographic quality is not required here.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdSource;

const ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

impl CertificateIdSource for RandomIdSource {
    fn certificate_id(&self) -> CertificateId {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..8)
            .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
            .collect();
        CertificateId(format!("cert-{suffix}"))
    }
}

/// A pre-selected identifier: always returns the same id. Used by the
/// issuer to thread one generated id through both the endpoints and the
/// envelope, and by tests for reproducibility.
#[derive(Debug, Clone)]
pub struct FixedIdSource(pub CertificateId);

impl CertificateIdSource for FixedIdSource {
    fn certificate_id(&self) -> CertificateId {
        self.0.clone()
    }
}

/// Read access to the per-session chain tip.
///
/// Serialization of issuance within a session is the store's
/// responsibility; two issuances reading the same tip create a forked chain
/// the core cannot reconcile.
pub trait ChainStore: Send + Sync {
    /// Chain hash of the session's latest checkpoint, or `None` before the
    /// genesis checkpoint.
    fn prev_chain_hash_for(&self, session: &SessionId) -> Option<String>;

    /// Number of checkpoints already in the session chain; the next
    /// checkpoint's `position`.
    fn chain_length_for(&self, session: &SessionId) -> u64;
}

/// In-memory chain store for development and tests.
#[derive(Debug, Default)]
pub struct MemoryChainStore {
    tips: Mutex<BTreeMap<String, Vec<String>>>,
}

impl MemoryChainStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a newly issued chain hash as the session tip.
    pub fn record_chain_hash(&self, session: &SessionId, chain_hash: impl Into<String>) {
        let mut tips = self.tips.lock().unwrap_or_else(|e| e.into_inner());
        tips.entry(session.as_str().to_string())
            .or_default()
            .push(chain_hash.into());
    }
}

impl ChainStore for MemoryChainStore {
    fn prev_chain_hash_for(&self, session: &SessionId) -> Option<String> {
        let tips = self.tips.lock().unwrap_or_else(|e| e.into_inner());
        tips.get(session.as_str()).and_then(|v| v.last().cloned())
    }

    fn chain_length_for(&self, session: &SessionId) -> u64 {
        let tips = self.tips.lock().unwrap_or_else(|e| e.into_inner());
        tips.get(session.as_str()).map(|v| v.len() as u64).unwrap_or(0)
    }
}

/// Read access to the ordered leaf hashes of a tree epoch.
pub trait LeafStore: Send + Sync {
    /// The epoch's leaf hashes in append order.
    fn leaf_hashes_for_epoch(&self, epoch: &str) -> Vec<String>;
}

/// In-memory leaf store for development and tests.
#[derive(Debug, Default)]
pub struct MemoryLeafStore {
    epochs: Mutex<BTreeMap<String, Vec<String>>>,
}

impl MemoryLeafStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a leaf hash to an epoch.
    pub fn append_leaf(&self, epoch: &str, leaf_hash: impl Into<String>) {
        let mut epochs = self.epochs.lock().unwrap_or_else(|e| e.into_inner());
        epochs
            .entry(epoch.to_string())
            .or_default()
            .push(leaf_hash.into());
    }
}

impl LeafStore for MemoryLeafStore {
    fn leaf_hashes_for_epoch(&self, epoch: &str) -> Vec<String> {
        let epochs = self.epochs.lock().unwrap_or_else(|e| e.into_inner());
        epochs.get(epoch).cloned().unwrap_or_default()
    }
}
