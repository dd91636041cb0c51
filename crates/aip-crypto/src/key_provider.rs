//! # Key Provider Abstraction
//!
//! Abstracts Ed25519 key storage and signing behind a trait, and models
//! key rotation as *selection policy*:
//!
//! - [`KeyProvider`]: signing backend used by the issuance pipeline.
//! - [`LocalKeyProvider`]: in-memory key for development and testing.
//! - [`KeyRing`]: `key_id → public key` registry for the verify path.
//!   Deactivating a key only stops it being *selected* for new signatures;
//!   historical signatures keep verifying against the public key they were
//!   issued under.
//!
//! ## Security Invariants
//!
//! - Signing input is `&CanonicalBytes` (never raw bytes).
//! - `KeyProvider` is `Send + Sync` for use across worker threads.
//! - Key material lives inside `Ed25519KeyPair` and is zeroized on drop.

use std::collections::BTreeMap;

use aip_core::{CanonicalBytes, CryptoError, KeyId};

use crate::ed25519::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};

/// Trait for Ed25519 signing backends.
pub trait KeyProvider: Send + Sync {
    /// Sign canonicalized data with the managed key.
    fn sign(&self, data: &CanonicalBytes) -> Result<Ed25519Signature, CryptoError>;

    /// The public key corresponding to the managed key.
    fn public_key(&self) -> Result<Ed25519PublicKey, CryptoError>;

    /// The identifier certificates carry in `proofs.signature.key_id`.
    fn key_id(&self) -> &KeyId;
}

// ─── LocalKeyProvider ────────────────────────────────────────────────────

/// In-memory Ed25519 key provider for development and testing.
pub struct LocalKeyProvider {
    key_id: KeyId,
    keypair: Ed25519KeyPair,
}

impl LocalKeyProvider {
    /// Wrap an existing key pair; the key id derives from the public key.
    pub fn new(keypair: Ed25519KeyPair) -> Self {
        let key_id = KeyId::from_public_key_hex(&keypair.public_key().to_hex());
        Self { key_id, keypair }
    }

    /// Generate a fresh random key.
    pub fn generate() -> Self {
        Self::new(Ed25519KeyPair::generate())
    }

    /// Build from a raw 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self::new(Ed25519KeyPair::from_seed(seed))
    }

    /// Override the derived key id.
    pub fn with_key_id(mut self, key_id: KeyId) -> Self {
        self.key_id = key_id;
        self
    }
}

impl KeyProvider for LocalKeyProvider {
    fn sign(&self, data: &CanonicalBytes) -> Result<Ed25519Signature, CryptoError> {
        Ok(self.keypair.sign(data))
    }

    fn public_key(&self) -> Result<Ed25519PublicKey, CryptoError> {
        Ok(self.keypair.public_key())
    }

    fn key_id(&self) -> &KeyId {
        &self.key_id
    }
}

impl std::fmt::Debug for LocalKeyProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LocalKeyProvider({})", self.key_id)
    }
}

// ─── KeyRing ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct RegisteredKey {
    public_key: Ed25519PublicKey,
    deactivated: bool,
}

/// A registry of verification keys keyed by `key_id`.
///
/// The verify path selects the public key by the certificate's declared
/// `key_id`; the sign path asks for the single *active* key. Deactivation
/// never removes a key — certificates signed under it must keep verifying.
#[derive(Debug, Clone, Default)]
pub struct KeyRing {
    keys: BTreeMap<String, RegisteredKey>,
    active: Option<KeyId>,
}

impl KeyRing {
    /// Create an empty key ring.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a public key. The first registered key becomes active.
    pub fn register(&mut self, key_id: KeyId, public_key: Ed25519PublicKey) {
        if self.active.is_none() {
            self.active = Some(key_id.clone());
        }
        self.keys.insert(
            key_id.0,
            RegisteredKey {
                public_key,
                deactivated: false,
            },
        );
    }

    /// Select the key used for new signatures.
    pub fn set_active(&mut self, key_id: &KeyId) -> Result<(), CryptoError> {
        if !self.keys.contains_key(key_id.as_str()) {
            return Err(CryptoError::UnknownKeyId(key_id.0.clone()));
        }
        self.active = Some(key_id.clone());
        Ok(())
    }

    /// Stop selecting a key for new signatures. Verification is unaffected.
    pub fn deactivate(&mut self, key_id: &KeyId) -> Result<(), CryptoError> {
        let entry = self
            .keys
            .get_mut(key_id.as_str())
            .ok_or_else(|| CryptoError::UnknownKeyId(key_id.0.clone()))?;
        entry.deactivated = true;
        if self.active.as_ref() == Some(key_id) {
            self.active = None;
        }
        Ok(())
    }

    /// The key id currently selected for new signatures, if any.
    pub fn active_key_id(&self) -> Option<&KeyId> {
        self.active.as_ref()
    }

    /// Look up a verification key by id — deactivated keys included, so
    /// historical certificates remain verifiable.
    pub fn public_key_for(&self, key_id: &KeyId) -> Option<&Ed25519PublicKey> {
        self.keys.get(key_id.as_str()).map(|k| &k.public_key)
    }

    /// Whether a key is still selected-able for new signatures.
    pub fn is_active_candidate(&self, key_id: &KeyId) -> bool {
        self.keys
            .get(key_id.as_str())
            .map(|k| !k.deactivated)
            .unwrap_or(false)
    }
}
