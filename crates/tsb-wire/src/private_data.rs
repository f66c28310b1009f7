use serde::{Deserialize, Serialize};

/// A remote-writable memory region handle exchanged during connection
/// setup. In the simulated fabric, `addr` identifies the peer's
/// in-process ring handle and `rkey` is a simulated access key rather
/// than an HCA-registered `ibv_mr`'s `rkey` — the field shapes and the
/// exchange sequence match what a real RDMA transport would need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRegion {
    pub addr: u64,
    pub rkey: u32,
}

/// Private data an input sends when initiating a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputPrivateData {
    pub index: u16,
}

/// Private data a compute sends back once it has exposed its rings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputePrivateData {
    pub data: RemoteRegion,
    pub desc: RemoteRegion,
    pub index: u16,
    pub data_buffer_size_exp: u8,
    pub desc_buffer_size_exp: u8,
}
