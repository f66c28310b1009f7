use serde::{Deserialize, Serialize};

/// One microslice's fixed 32-byte descriptor, as laid out contiguously by
/// the producing hardware (or, here, by [`crate::MicrosliceDescriptor`]'s
/// plain `bincode` encoding, which reproduces the same byte count since
/// none of its fields need padding).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MicrosliceDescriptor {
    pub hdr_version: u8,
    pub sys_id: u8,
    pub sys_ver: u8,
    pub flags: u8,
    pub equipment_id: u16,
    pub _reserved: u16,
    /// Monotonically increasing per-equipment microslice index.
    pub idx: u64,
    /// CRC32 of the payload, computed with `crc32fast` at generation time.
    pub crc: u32,
    /// Payload size in bytes.
    pub size: u32,
    /// Payload offset within the input's local data ring.
    pub offset: u64,
}

impl MicrosliceDescriptor {
    #[must_use]
    pub fn new(equipment_id: u16, idx: u64, offset: u64, payload: &[u8]) -> Self {
        Self {
            hdr_version: 1,
            sys_id: 0,
            sys_ver: 0,
            flags: 0,
            equipment_id,
            _reserved: 0,
            idx,
            crc: crc32fast::hash(payload),
            size: payload.len() as u32,
            offset,
        }
    }

    /// Re-verifies the descriptor's CRC against a payload read back from
    /// the ring. Used by the reference processor as an ambient
    /// correctness check, not a transport-layer invariant.
    #[must_use]
    pub fn verify(&self, payload: &[u8]) -> bool {
        self.size as usize == payload.len() && self.crc == crc32fast::hash(payload)
    }
}
