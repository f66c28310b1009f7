use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShmError {
    #[error("shared-memory syscall failed: {0}")]
    Nix(#[from] nix::Error),

    #[error("I/O error on shared-memory segment: {0}")]
    Io(#[from] std::io::Error),

    #[error("wire codec error: {0}")]
    Wire(#[from] tsb_wire::WireError),

    #[error("message exceeds queue's maximum message size: {got} > {max}")]
    MessageTooLarge { got: usize, max: usize },
}
