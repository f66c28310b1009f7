use serde::{Deserialize, Serialize};

/// Describes one timeslice ready for a processor to consume: where its
/// components live in the per-input rings and how many there are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimesliceWorkItem {
    pub ts_index: u64,
    /// Position of this timeslice within each input's descriptor ring.
    pub ts_pos: u64,
    pub ts_core: u32,
    pub num_components: u32,
    pub data_buffer_size_exp: u8,
    pub desc_buffer_size_exp: u8,
}

/// Posted by a processor once it has finished a timeslice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimesliceCompletion {
    pub ts_pos: u64,
}
