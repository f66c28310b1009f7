//! Deterministic, in-process [`FabricRuntime`] implementation.
//!
//! Stands in for a real RDMA transport: instead of registering memory
//! regions with an HCA and posting queue-pair work requests, `SimFabric`
//! just hands connecting peers `Arc` clones of the compute's actual ring
//! buffers and a pair of `tokio::sync::mpsc` channels for status traffic.
//! The connection/turn-protocol logic in `tsb-fabric` is unaware of the
//! difference.
//!
//! Sibling of `tsb-core`'s ring types in the same way the teacher's
//! deterministic-simulation sibling crate tests its write-ahead log: by
//! giving test code a fully in-process, inspectable stand-in for the
//! part of the system that would otherwise need real hardware.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::debug;
use tsb_core::{DataRing, DescRing};
use tsb_fabric::{Endpoint, FabricError, FabricRuntime};

/// Channel depth for the simulated status-message transport.
const STATUS_CHANNEL_DEPTH: usize = 64;

#[derive(Clone)]
struct ComputeRings {
    data: Arc<DataRing>,
    desc: Arc<DescRing>,
}

/// A deterministic, in-process fabric shared by every connecting input
/// and compute in a test or demo run.
#[derive(Default)]
pub struct SimFabric {
    rings: Mutex<HashMap<(u16, u16), ComputeRings>>,
    /// `(input_index, compute_index)` pairs whose *next* connect attempt
    /// should fail, consumed on use. Lets tests exercise the rejection
    /// retry path (scenario S6) without hardware to actually reject.
    fail_next: Mutex<HashMap<(u16, u16), u32>>,
}

impl SimFabric {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arranges for the next `count` connect attempts for this pair to be
    /// rejected, to exercise the retry-after-rejection path.
    pub fn fail_next_connect(&self, input_index: u16, compute_index: u16, count: u32) {
        self.fail_next
            .lock()
            .unwrap()
            .insert((input_index, compute_index), count);
    }
}

impl FabricRuntime for SimFabric {
    fn register_rings(
        &self,
        input_index: u16,
        compute_index: u16,
        data: Arc<DataRing>,
        desc: Arc<DescRing>,
    ) {
        self.rings
            .lock()
            .unwrap()
            .insert((input_index, compute_index), ComputeRings { data, desc });
    }

    fn connect(
        &self,
        input_index: u16,
        compute_index: u16,
    ) -> Result<(Endpoint, Endpoint), FabricError> {
        {
            let mut fail_next = self.fail_next.lock().unwrap();
            if let Some(remaining) = fail_next.get_mut(&(input_index, compute_index)) {
                if *remaining > 0 {
                    *remaining -= 1;
                    debug!(input_index, compute_index, "simulated connect rejection");
                    return Err(FabricError::Rejected(compute_index));
                }
            }
        }

        let rings = self
            .rings
            .lock()
            .unwrap()
            .get(&(input_index, compute_index))
            .cloned()
            .ok_or(FabricError::Rejected(compute_index))?;

        let (input_tx, compute_rx) = mpsc::channel(STATUS_CHANNEL_DEPTH);
        let (compute_tx, input_rx) = mpsc::channel(STATUS_CHANNEL_DEPTH);

        let input_endpoint = Endpoint {
            remote_data: rings.data.clone(),
            remote_desc: rings.desc.clone(),
            status_tx: input_tx,
            status_rx: std::sync::Arc::new(tokio::sync::Mutex::new(input_rx)),
        };
        let compute_endpoint = Endpoint {
            remote_data: rings.data,
            remote_desc: rings.desc,
            status_tx: compute_tx,
            status_rx: std::sync::Arc::new(tokio::sync::Mutex::new(compute_rx)),
        };

        debug!(input_index, compute_index, "simulated connect established");
        Ok((input_endpoint, compute_endpoint))
    }
}
