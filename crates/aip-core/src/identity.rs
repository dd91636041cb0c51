//! # Domain Identity Newtypes
//!
//! Newtype wrappers for the identifiers that flow through the attestation
//! pipeline. These prevent accidental identifier confusion — you cannot pass
//! an `AgentId` where a `SessionId` is expected.
//!
//! ## Validation
//!
//! Chain preimages are pipe-delimited (`|`), so every identifier that can
//! appear in a preimage rejects pipes and non-ASCII at construction. Wire
//! deserialization stays lenient: verification predicates must accept any
//! document and report `false`, not fail to parse.

use serde::{Deserialize, Serialize};

use crate::error::StructuralError;

fn check_preimage_safe(kind: &'static str, value: &str) -> Result<(), StructuralError> {
    if value.is_empty() {
        return Err(StructuralError::InvalidIdentifier {
            kind,
            reason: "must not be empty".to_string(),
        });
    }
    if !value.is_ascii() {
        return Err(StructuralError::InvalidIdentifier {
            kind,
            reason: "must be ASCII".to_string(),
        });
    }
    if value.contains('|') {
        return Err(StructuralError::ForbiddenPipe(kind));
    }
    Ok(())
}

/// Identifier of a single attested reasoning checkpoint (`ic-` prefix).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CheckpointId(pub String);

impl CheckpointId {
    /// Create a validated checkpoint identifier.
    pub fn new(id: impl Into<String>) -> Result<Self, StructuralError> {
        let id = id.into();
        check_preimage_safe("checkpoint_id", &id)?;
        if !id.starts_with("ic-") {
            return Err(StructuralError::InvalidIdentifier {
                kind: "checkpoint_id",
                reason: "must start with 'ic-'".to_string(),
            });
        }
        Ok(Self(id))
    }

    /// Access the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier of the agent whose reasoning is being attested.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub String);

impl AgentId {
    /// Create a validated agent identifier.
    pub fn new(id: impl Into<String>) -> Result<Self, StructuralError> {
        let id = id.into();
        check_preimage_safe("agent_id", &id)?;
        Ok(Self(id))
    }

    /// Access the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier of the per-agent session whose chain this checkpoint extends.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Create a validated session identifier.
    pub fn new(id: impl Into<String>) -> Result<Self, StructuralError> {
        let id = id.into();
        check_preimage_safe("session_id", &id)?;
        Ok(Self(id))
    }

    /// Access the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Certificate identifier: `cert-` followed by 8 lowercase alphanumerics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CertificateId(pub String);

impl CertificateId {
    /// Create a validated certificate identifier.
    pub fn new(id: impl Into<String>) -> Result<Self, StructuralError> {
        let id = id.into();
        if !Self::is_well_formed(&id) {
            return Err(StructuralError::InvalidIdentifier {
                kind: "certificate_id",
                reason: "must be 'cert-' followed by 8 lowercase alphanumerics".to_string(),
            });
        }
        Ok(Self(id))
    }

    /// Check the `cert-<8 [a-z0-9]>` shape without constructing.
    pub fn is_well_formed(id: &str) -> bool {
        match id.strip_prefix("cert-") {
            Some(suffix) => {
                suffix.len() == 8
                    && suffix
                        .bytes()
                        .all(|b| matches!(b, b'a'..=b'z' | b'0'..=b'9'))
            }
            None => false,
        }
    }

    /// Access the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Signing-key identifier (`key-` prefix).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyId(pub String);

impl KeyId {
    /// Create a validated key identifier.
    pub fn new(id: impl Into<String>) -> Result<Self, StructuralError> {
        let id = id.into();
        check_preimage_safe("key_id", &id)?;
        if !id.starts_with("key-") {
            return Err(StructuralError::InvalidIdentifier {
                kind: "key_id",
                reason: "must start with 'key-'".to_string(),
            });
        }
        Ok(Self(id))
    }

    /// Derive the conventional key id from a hex-encoded public key:
    /// `key-` plus the first 8 hex characters.
    pub fn from_public_key_hex(public_key_hex: &str) -> Self {
        let prefix: String = public_key_hex.chars().take(8).collect();
        Self(format!("key-{prefix}"))
    }

    /// Access the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The closed-set checkpoint label, carried as an opaque validated string.
///
/// The pipeline never branches on the verdict value; it only binds it into
/// hashes and signatures. New labels therefore need no code change here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Verdict(pub String);

impl Verdict {
    /// Create a validated verdict label.
    pub fn new(label: impl Into<String>) -> Result<Self, StructuralError> {
        let label = label.into();
        check_preimage_safe("verdict", &label)?;
        Ok(Self(label))
    }

    /// The `clear` verdict.
    pub fn clear() -> Self {
        Self("clear".to_string())
    }

    /// The `review_needed` verdict.
    pub fn review_needed() -> Self {
        Self("review_needed".to_string())
    }

    /// The `boundary_violation` verdict.
    pub fn boundary_violation() -> Self {
        Self("boundary_violation".to_string())
    }

    /// Access the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CheckpointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for CertificateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for KeyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
