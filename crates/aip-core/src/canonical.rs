//! # Canonical Serialization — Deterministic Byte Production
//!
//! This module defines `CanonicalBytes`, the sole construction path for bytes
//! used in commitment, chain, payload, and leaf digest computation across the
//! pipeline.
//!
//! ## Security Invariant
//!
//! The `CanonicalBytes` newtype has a private inner field. The only ways to
//! construct it are `CanonicalBytes::new()` and `CanonicalBytes::from_value()`,
//! which emit JSON with mapping keys in ascending Unicode code-point order at
//! every nesting level, no superfluous whitespace, and a fixed number policy.
//!
//! This makes the "wrong serialization path" defect class structurally
//! impossible: any function requiring canonical bytes for digest computation
//! must accept `&CanonicalBytes`, and the only way to produce one is through
//! the correct pipeline.
//!
//! ## Rules
//!
//! 1. Mapping keys are emitted in ascending code-point order (byte order of
//!    their UTF-8 encoding), recursively.
//! 2. Sequences retain input order.
//! 3. Numbers: integers emit without a fractional part. A float whose value
//!    is integral and within the 2^53 safe range collapses to integer form;
//!    other finite floats emit their shortest round-trip decimal. Non-finite
//!    values are rejected.
//! 4. Strings use standard JSON escaping; non-ASCII passes through as UTF-8.
//! 5. No whitespace anywhere in the output.
//!
//! Two semantically equal values — regardless of mapping-key insertion order
//! at any depth — produce identical bytes. The output is always valid JSON.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Largest integer exactly representable in an IEEE-754 double (2^53).
const FLOAT_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Bytes produced exclusively by the canonical JSON emitter.
///
/// # Invariants
///
/// - The only constructors are `new()` and `from_value()`.
/// - Mapping keys are sorted by Unicode code point at every nesting level.
/// - Integral numbers never carry a fractional part.
/// - The byte sequence is UTF-8 and parses as JSON.
///
/// These invariants are enforced by the constructors and cannot be violated
/// by downstream code because the inner `Vec<u8>` is private.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// This is the ONLY entry point for digest preimages in the pipeline.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::SerializationFailed` if the value
    /// cannot be represented as a JSON tree (non-string mapping keys,
    /// unsupported types), and `CanonicalizationError::NonFiniteNumber` for
    /// NaN or infinite numbers.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        Self::from_value(&value)
    }

    /// Construct canonical bytes from an already-built JSON value tree.
    pub fn from_value(value: &Value) -> Result<Self, CanonicalizationError> {
        let mut out = String::new();
        write_canonical(value, &mut out)?;
        Ok(Self(out.into_bytes()))
    }

    /// Access the canonical bytes for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// View the canonical bytes as a string slice.
    ///
    /// The emitter only ever produces UTF-8, so this cannot fail.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or("")
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Recursively emit a JSON value in canonical form.
///
/// Mapping keys are collected and sorted before emission; `String` ordering
/// in Rust is byte order over UTF-8, which equals ascending code-point order.
fn write_canonical(value: &Value, out: &mut String) -> Result<(), CanonicalizationError> {
    match value {
        Value::Null => {
            out.push_str("null");
            Ok(())
        }
        Value::Bool(b) => {
            out.push_str(if *b { "true" } else { "false" });
            Ok(())
        }
        Value::Number(n) => {
            out.push_str(&canonical_number(n)?);
            Ok(())
        }
        Value::String(s) => {
            out.push_str(&escape_json_string(s)?);
            Ok(())
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out)?;
            }
            out.push(']');
            Ok(())
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_unstable();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&escape_json_string(key.as_str())?);
                out.push(':');
                write_canonical(&map[key.as_str()], out)?;
            }
            out.push('}');
            Ok(())
        }
    }
}

/// Emit a number under the canonical policy.
///
/// `serde_json::Number` cannot hold non-finite values, but the guard stays:
/// the rejection is part of the serializer contract, not an accident of the
/// value model.
fn canonical_number(n: &serde_json::Number) -> Result<String, CanonicalizationError> {
    if n.is_i64() || n.is_u64() {
        return Ok(n.to_string());
    }
    let f = n
        .as_f64()
        .ok_or(CanonicalizationError::NonFiniteNumber(f64::NAN))?;
    if !f.is_finite() {
        return Err(CanonicalizationError::NonFiniteNumber(f));
    }
    // Integral floats collapse to integer form: 2.0 emits as "2".
    if f.fract() == 0.0 && f.abs() <= FLOAT_SAFE_INTEGER {
        return Ok(format!("{}", f as i64));
    }
    Ok(n.to_string())
}

/// Standard JSON string escaping, delegated to the serde_json writer.
fn escape_json_string(s: &str) -> Result<String, CanonicalizationError> {
    Ok(serde_json::to_string(s)?)
}
