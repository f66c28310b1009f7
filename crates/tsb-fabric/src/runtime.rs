use crate::FabricError;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tsb_core::{DataRing, DescRing};

/// One side of an established connection.
///
/// `remote_data`/`remote_desc` are the *peer's* rings: for the input side
/// these are the compute's rings, registered as remote-writable during
/// setup (an RDMA write target); for the compute side they are its own
/// rings, handed back to itself for symmetry so `ReceiverConnection`
/// doesn't need a separate code path.
///
/// `status_tx`/`status_rx` carry the turn-protocol status messages
/// ([`tsb_wire::InputStatus`] / [`tsb_wire::ComputeStatus`], framed with
/// [`tsb_wire::encode_framed`]) that a real RDMA transport would send as
/// two-sided SEND/RECV work requests.
///
/// `status_rx` is `Arc<Mutex<..>>` rather than a bare `Mutex` so `Endpoint`
/// is cheaply `Clone`: a connection's main loop and its background status
/// receiver both hold a handle onto the same channel.
#[derive(Clone)]
pub struct Endpoint {
    pub remote_data: Arc<DataRing>,
    pub remote_desc: Arc<DescRing>,
    pub status_tx: mpsc::Sender<Vec<u8>>,
    pub status_rx: Arc<Mutex<mpsc::Receiver<Vec<u8>>>>,
}

impl Endpoint {
    pub async fn send_status(&self, frame: Vec<u8>) -> Result<(), FabricError> {
        self.status_tx
            .send(frame)
            .await
            .map_err(|_| FabricError::Disconnected)
    }

    pub async fn recv_status(&self) -> Result<Vec<u8>, FabricError> {
        self.status_rx
            .lock()
            .await
            .recv()
            .await
            .ok_or(FabricError::Disconnected)
    }
}

/// Abstracts connection establishment between one input and one compute.
///
/// The only implementation in this workspace is `tsb-fabric-sim`'s
/// deterministic in-process runtime; a real deployment would implement
/// this trait over `ibverbs`-registered memory regions and queue pairs,
/// keeping `tsb-fabric`'s connection and scheduling logic unchanged.
pub trait FabricRuntime: Send + Sync + 'static {
    /// Exposes a compute's rings for one input index as remote-writable
    /// memory, ahead of that pair's first `connect`. A real deployment
    /// would register `data`/`desc` with the HCA here and hand back their
    /// `(addr, rkey)` in connection private data instead.
    fn register_rings(
        &self,
        input_index: u16,
        compute_index: u16,
        data: Arc<DataRing>,
        desc: Arc<DescRing>,
    );

    /// Establishes a connection for `(input_index, compute_index)`,
    /// returning the input-side and compute-side endpoints.
    fn connect(
        &self,
        input_index: u16,
        compute_index: u16,
    ) -> Result<(Endpoint, Endpoint), FabricError>;
}
