use thiserror::Error;

/// Errors from encoding, decoding or checksum-verifying a wire message.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("failed to encode message: {0}")]
    Encode(#[source] bincode::Error),

    #[error("failed to decode message: {0}")]
    Decode(#[source] bincode::Error),

    #[error("frame checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("frame truncated: need at least {need} bytes, got {got}")]
    Truncated { need: usize, got: usize },
}
