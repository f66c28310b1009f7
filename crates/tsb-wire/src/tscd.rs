use serde::{Deserialize, Serialize};

/// What one input writes to one compute for one timeslice: where its
/// component landed in the compute's data ring, and how big it is.
///
/// 32 bytes on the wire (`_reserved` pads the four meaningful fields out
/// to that width, matching the descriptor ring's fixed entry size).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimesliceComponentDescriptor {
    pub ts_num: u64,
    /// Offset into the compute's data ring, already wrapped (mod `2^D`).
    pub offset: u64,
    /// Payload bytes for this component. Does not include any skipped
    /// padding inserted to avoid splitting the payload across the wrap.
    pub size: u32,
    pub num_microslices: u32,
    pub _reserved: u64,
}

impl TimesliceComponentDescriptor {
    #[must_use]
    pub fn new(ts_num: u64, offset: u64, size: u32, num_microslices: u32) -> Self {
        Self {
            ts_num,
            offset,
            size,
            num_microslices,
            _reserved: 0,
        }
    }
}
