use crate::error::WireError;
use serde::de::DeserializeOwned;
use serde::Serialize;

const HEADER_LEN: usize = 8; // u32 len + u32 crc

/// Encodes a framed message: `[len: u32 LE][crc32: u32 LE][bincode payload]`.
///
/// Used for status messages and connection private data, which travel
/// over the simulated fabric's SEND channel rather than living at a fixed
/// offset in ring memory. The length-prefixed, checksummed framing
/// mirrors the record format used by the write-ahead log this transport's
/// sibling crates are built on.
pub fn encode_framed<T: Serialize>(value: &T) -> Result<Vec<u8>, WireError> {
    let payload = bincode::serialize(value).map_err(WireError::Encode)?;
    let crc = crc32fast::hash(&payload);
    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(&crc.to_le_bytes());
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Decodes a frame produced by [`encode_framed`], verifying its checksum.
pub fn decode_framed<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, WireError> {
    if bytes.len() < HEADER_LEN {
        return Err(WireError::Truncated {
            need: HEADER_LEN,
            got: bytes.len(),
        });
    }
    let len = u32::from_le_bytes(bytes[0..4].try_into().unwrap()) as usize;
    let expected_crc = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
    if bytes.len() < HEADER_LEN + len {
        return Err(WireError::Truncated {
            need: HEADER_LEN + len,
            got: bytes.len(),
        });
    }
    let payload = &bytes[HEADER_LEN..HEADER_LEN + len];
    let actual_crc = crc32fast::hash(payload);
    if actual_crc != expected_crc {
        return Err(WireError::ChecksumMismatch {
            expected: expected_crc,
            actual: actual_crc,
        });
    }
    bincode::deserialize(payload).map_err(WireError::Decode)
}

/// Encodes a fixed-layout record (a [`crate::MicrosliceDescriptor`] or
/// [`crate::TimesliceComponentDescriptor`]) with no framing — these live
/// directly in ring memory at a known offset, so their size must be
/// exactly the declared entry width and nothing more.
pub fn encode_fixed<T: Serialize>(value: &T) -> Result<Vec<u8>, WireError> {
    bincode::serialize(value).map_err(WireError::Encode)
}

/// Decodes a fixed-layout record encoded by [`encode_fixed`].
pub fn decode_fixed<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, WireError> {
    bincode::deserialize(bytes).map_err(WireError::Decode)
}
