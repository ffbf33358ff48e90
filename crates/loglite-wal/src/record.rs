// WAL record format and encoding/decoding
//
// Frame format (text):
// [crc32: 8 hex digits] [space] [json payload] [newline]
//
// Payload: {"type": 1|2, "key": <string>, "value": <string-or-null>}
//
// Types:
// - PUT (1): key-value insert/update, value present
// - DELETE (2): key deletion, value null
//
// The CRC is computed over the exact payload bytes. JSON escapes control
// characters inside strings, so a bare 0x0a byte only ever appears as the
// frame terminator.

use crc32fast::Hasher;
use loglite_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Width of the hex-rendered checksum field.
const CRC_HEX_WIDTH: usize = 8;

/// Byte value that delimits one frame from the next.
pub const FRAME_TERMINATOR: u8 = b'\n';

/// WAL record types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum RecordType {
    Put = 1,
    Delete = 2,
}

impl TryFrom<u8> for RecordType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(RecordType::Put),
            2 => Ok(RecordType::Delete),
            _ => Err(Error::MalformedFrame(format!(
                "unknown record type: {}",
                value
            ))),
        }
    }
}

/// One logged mutation intent. Immutable once constructed; its wire form
/// is fully determined by (type, key, value).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalRecord {
    pub record_type: RecordType,
    pub key: String,
    pub value: Option<String>,
}

/// On-disk payload shape.
#[derive(Serialize, Deserialize)]
struct Payload {
    #[serde(rename = "type")]
    record_type: u8,
    key: String,
    value: Option<String>,
}

impl WalRecord {
    /// Create a PUT record
    pub fn put(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            record_type: RecordType::Put,
            key: key.into(),
            value: Some(value.into()),
        }
    }

    /// Create a DELETE record
    pub fn delete(key: impl Into<String>) -> Self {
        Self {
            record_type: RecordType::Delete,
            key: key.into(),
            value: None,
        }
    }

    /// Encode the record to a framed byte sequence:
    /// `[crc32 hex] [payload json] [newline]`.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let payload = Payload {
            record_type: self.record_type as u8,
            key: self.key.clone(),
            value: self.value.clone(),
        };
        let payload_bytes = serde_json::to_vec(&payload)
            .map_err(|e| Error::Serialization(format!("failed to serialize payload: {}", e)))?;

        let mut hasher = Hasher::new();
        hasher.update(&payload_bytes);
        let crc = hasher.finalize();

        let mut frame = Vec::with_capacity(CRC_HEX_WIDTH + 1 + payload_bytes.len() + 1);
        frame.extend_from_slice(format!("{:08x} ", crc).as_bytes());
        frame.extend_from_slice(&payload_bytes);
        frame.push(FRAME_TERMINATOR);

        Ok(frame)
    }

    /// Decode a single frame, with or without its trailing newline.
    ///
    /// Fails with [`Error::ChecksumMismatch`] when the stored CRC disagrees
    /// with the payload, and [`Error::MalformedFrame`] for every other parse
    /// failure. Never panics on any input shape.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let data = match data.split_last() {
            Some((&FRAME_TERMINATOR, rest)) => rest,
            _ => data,
        };

        if data.len() < CRC_HEX_WIDTH + 2 {
            return Err(Error::MalformedFrame(format!(
                "frame too short: {} bytes",
                data.len()
            )));
        }

        let (crc_field, rest) = data.split_at(CRC_HEX_WIDTH);
        if rest[0] != b' ' {
            return Err(Error::MalformedFrame(
                "missing separator after checksum field".to_string(),
            ));
        }
        let payload_bytes = &rest[1..];

        let stored = std::str::from_utf8(crc_field)
            .ok()
            .and_then(|s| u32::from_str_radix(s, 16).ok())
            .ok_or_else(|| {
                Error::MalformedFrame("checksum field is not hexadecimal".to_string())
            })?;

        let mut hasher = Hasher::new();
        hasher.update(payload_bytes);
        let computed = hasher.finalize();

        if stored != computed {
            return Err(Error::ChecksumMismatch { stored, computed });
        }

        let payload: Payload = serde_json::from_slice(payload_bytes)
            .map_err(|e| Error::MalformedFrame(format!("payload is not valid JSON: {}", e)))?;
        let record_type = RecordType::try_from(payload.record_type)?;

        Ok(WalRecord {
            record_type,
            key: payload.key,
            value: payload.value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_type_conversion() {
        assert_eq!(RecordType::try_from(1).unwrap(), RecordType::Put);
        assert_eq!(RecordType::try_from(2).unwrap(), RecordType::Delete);
        assert!(RecordType::try_from(9).is_err());
    }

    #[test]
    fn test_put_record_round_trip() {
        let record = WalRecord::put("key1", "value1");

        let encoded = record.encode().unwrap();
        assert!(encoded.ends_with(&[FRAME_TERMINATOR]));

        let decoded = WalRecord::decode(&encoded).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_delete_record_round_trip() {
        let record = WalRecord::delete("key1");

        let encoded = record.encode().unwrap();
        let decoded = WalRecord::decode(&encoded).unwrap();

        assert_eq!(decoded, record);
        assert_eq!(decoded.value, None);
    }

    #[test]
    fn test_decode_without_trailing_newline() {
        let record = WalRecord::put("k", "v");
        let encoded = record.encode().unwrap();

        let decoded = WalRecord::decode(&encoded[..encoded.len() - 1]).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_newline_in_value_does_not_break_framing() {
        let record = WalRecord::put("key1", "hello\nworld");
        let encoded = record.encode().unwrap();

        // Exactly one bare newline in the whole frame: the terminator.
        let newlines = encoded.iter().filter(|&&b| b == b'\n').count();
        assert_eq!(newlines, 1);

        let decoded = WalRecord::decode(&encoded).unwrap();
        assert_eq!(decoded.value.as_deref(), Some("hello\nworld"));
    }

    #[test]
    fn test_any_payload_bit_flip_fails_checksum() {
        let record = WalRecord::put("key1", "value1");
        let encoded = record.encode().unwrap();

        // Flip each bit of each payload byte (after "crc " header, before \n).
        for i in CRC_HEX_WIDTH + 1..encoded.len() - 1 {
            for bit in 0..8 {
                let mut corrupted = encoded.clone();
                corrupted[i] ^= 1 << bit;
                match WalRecord::decode(&corrupted) {
                    Err(Error::ChecksumMismatch { .. }) => {}
                    other => panic!("byte {} bit {}: expected mismatch, got {:?}", i, bit, other),
                }
            }
        }
    }

    #[test]
    fn test_unknown_type_is_malformed() {
        // Craft a payload with a valid checksum but an out-of-range type.
        let payload = br#"{"type":7,"key":"k","value":null}"#;
        let crc = crc32fast::hash(payload);
        let mut frame = format!("{:08x} ", crc).into_bytes();
        frame.extend_from_slice(payload);
        frame.push(b'\n');

        match WalRecord::decode(&frame) {
            Err(Error::MalformedFrame(msg)) => assert!(msg.contains("unknown record type")),
            other => panic!("expected MalformedFrame, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_garbage_is_malformed_not_panic() {
        assert!(WalRecord::decode(b"").is_err());
        assert!(WalRecord::decode(b"\n").is_err());
        assert!(WalRecord::decode(b"not a frame at all").is_err());
        assert!(WalRecord::decode(&[0xff; 64]).is_err());
    }
}
