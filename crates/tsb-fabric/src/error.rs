use thiserror::Error;

/// Errors from connection setup, the turn protocol, or a violated
/// connection-level invariant.
#[derive(Debug, Error)]
pub enum FabricError {
    #[error("address/route resolution timed out after {0:?}")]
    ResolveTimeout(std::time::Duration),

    #[error("peer rejected connection attempt for index {0}")]
    Rejected(u16),

    #[error("peer disconnected after connection was established")]
    Disconnected,

    #[error("wire codec error: {0}")]
    Wire(#[from] tsb_wire::WireError),

    /// A misbehaving peer violated a protocol invariant (ring overrun,
    /// wrong TS index in a TSCD, negative credit). Checked with
    /// `debug_assert!` in debug builds; raised here so a release build
    /// cannot silently corrupt a ring.
    #[error("protocol violation: {0}")]
    Protocol(String),
}
