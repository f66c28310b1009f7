use serde::{Deserialize, Serialize};
use tsb_core::DualIndex;

/// Wire form of [`DualIndex`]. Kept separate so `tsb-core` stays free of a
/// `serde` dependency — only the wire layer needs these cursors to cross
/// a connection boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireIndex {
    pub data: u64,
    pub desc: u64,
}

impl From<DualIndex> for WireIndex {
    fn from(idx: DualIndex) -> Self {
        Self {
            data: idx.data,
            desc: idx.desc,
        }
    }
}

impl From<WireIndex> for DualIndex {
    fn from(idx: WireIndex) -> Self {
        DualIndex::new(idx.data, idx.desc)
    }
}

/// Status message posted by an input's `SenderConnection` to its peer
/// compute. Carries the sender's current write pointer and the two
/// finalize bits resolved for this implementation (explicit-bits form,
/// not the sentinel form — see the design notes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputStatus {
    pub wp: WireIndex,
    pub r#final: bool,
    pub abort: bool,
}

/// Status message posted by a compute's `ReceiverConnection` back to its
/// peer input. Carries the receiver's released credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeStatus {
    pub ack: WireIndex,
    pub r#final: bool,
    pub request_abort: bool,
}
