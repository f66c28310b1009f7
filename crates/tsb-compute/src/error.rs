use thiserror::Error;

#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("fabric error: {0}")]
    Fabric(#[from] tsb_fabric::FabricError),

    #[error("shared-memory error: {0}")]
    Shm(#[from] tsb_shm::ShmError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("processor exited with code {0:?}")]
    ProcessorExited(Option<i32>),
}
