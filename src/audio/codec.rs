//! Wire codec for audio payloads.
//!
//! The platform pushes raw PCM16LE mono 16 kHz audio as base64 text inside a
//! JSON envelope. Decoding rejects payloads whose byte length is not a multiple
//! of 2 (an incomplete 16-bit sample means the buffer was truncated in flight).

use crate::error::{PipelineError, Result};
use base64::Engine;

/// Decode a base64 payload into raw PCM bytes, rejecting truncated buffers.
pub fn decode_bytes(payload: &str) -> Result<Vec<u8>> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| PipelineError::MalformedFrame {
            reason: format!("invalid base64 audio buffer: {}", e),
        })?;

    if bytes.len() % 2 != 0 {
        return Err(PipelineError::MalformedFrame {
            reason: format!("{} bytes is not a whole number of 16-bit samples", bytes.len()),
        });
    }

    Ok(bytes)
}

/// Decode a base64 payload into 16-bit little-endian samples.
pub fn decode_samples(payload: &str) -> Result<Vec<i16>> {
    let bytes = decode_bytes(payload)?;
    samples_from_bytes(&bytes)
}

/// Interpret raw bytes as PCM16LE samples.
pub fn samples_from_bytes(bytes: &[u8]) -> Result<Vec<i16>> {
    if bytes.len() % 2 != 0 {
        return Err(PipelineError::MalformedFrame {
            reason: format!("{} bytes is not a whole number of 16-bit samples", bytes.len()),
        });
    }

    Ok(bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}

/// Encode samples back to the wire representation.
///
/// Inverse of [`decode_samples`]; used by the test/simulation path, not by
/// production output.
pub fn encode_samples(samples: &[i16]) -> String {
    base64::engine::general_purpose::STANDARD.encode(samples_to_bytes(samples))
}

/// Flatten samples to PCM16LE bytes.
pub fn samples_to_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_preserves_payload() {
        let samples: Vec<i16> = vec![0, 1, -1, i16::MAX, i16::MIN, 12345, -12345];
        let payload = encode_samples(&samples);
        assert_eq!(decode_samples(&payload).unwrap(), samples);
    }

    #[test]
    fn rejects_odd_byte_length() {
        let payload = base64::engine::general_purpose::STANDARD.encode([1u8, 2, 3]);
        let err = decode_samples(&payload).unwrap_err();
        assert!(matches!(err, PipelineError::MalformedFrame { .. }));
    }

    #[test]
    fn rejects_invalid_base64() {
        let err = decode_samples("not!!valid@@base64").unwrap_err();
        assert!(matches!(err, PipelineError::MalformedFrame { .. }));
    }

    #[test]
    fn decodes_little_endian() {
        // 0x0102 little-endian is bytes [0x02, 0x01]
        let payload = base64::engine::general_purpose::STANDARD.encode([0x02u8, 0x01]);
        assert_eq!(decode_samples(&payload).unwrap(), vec![0x0102]);
    }
}
