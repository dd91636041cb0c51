//! # Byte Encodings — Hex and Base64
//!
//! Hex and base64 codecs shared by the signature, chain, and Merkle
//! modules. Hex is hand-rolled (no external hex crate); base64 uses the
//! standard alphabet with `=` padding.
//!
//! Round-trip guarantees hold for every buffer length, including the empty
//! buffer and buffers of 64 bytes and above (signature-sized material).

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;

use aip_core::EncodingError;

/// Encode bytes as lowercase hex.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Decode a hex string (either case) into bytes.
pub fn hex_to_bytes(hex: &str) -> Result<Vec<u8>, EncodingError> {
    let hex = hex.trim();
    if !hex.is_ascii() {
        let position = hex.bytes().position(|b| !b.is_ascii()).unwrap_or(0);
        return Err(EncodingError::InvalidHexChar { position });
    }
    if hex.len() % 2 != 0 {
        return Err(EncodingError::OddHexLength(hex.len()));
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| EncodingError::InvalidHexChar { position: i })
        })
        .collect()
}

/// Decode a 64-char hex digest into 32 bytes.
pub fn hex_to_digest(hex: &str) -> Result<[u8; 32], EncodingError> {
    let bytes = hex_to_bytes(hex)?;
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| EncodingError::InvalidLength {
            expected: 32,
            actual: len,
        })
}

/// Check the strict digest-field shape: exactly 64 lowercase hex characters.
///
/// This is the well-formedness predicate certificates are checked against;
/// unlike the decoders it does not accept uppercase or surrounding space.
pub fn is_hex_digest(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Encode bytes as standard base64 with `=` padding.
pub fn base64_encode(bytes: &[u8]) -> String {
    BASE64_STANDARD.encode(bytes)
}

/// Decode standard padded base64 into bytes.
pub fn base64_decode(s: &str) -> Result<Vec<u8>, EncodingError> {
    BASE64_STANDARD
        .decode(s)
        .map_err(|e| EncodingError::InvalidBase64(e.to_string()))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn hex_round_trip(buf in prop::collection::vec(any::<u8>(), 0..256)) {
            let hex = bytes_to_hex(&buf);
            prop_assert_eq!(hex_to_bytes(&hex).unwrap(), buf);
        }

        #[test]
        fn base64_round_trip(buf in prop::collection::vec(any::<u8>(), 0..256)) {
            let enc = base64_encode(&buf);
            prop_assert_eq!(base64_decode(&enc).unwrap(), buf);
        }
    }
}
