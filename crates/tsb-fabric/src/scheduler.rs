use crate::source::MicrosliceSource;
use crate::{FabricError, SenderConnection};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::sleep;
use tracing::{info, warn};

/// Sentinel `ts_index` meaning "run until aborted", matching the
/// original's unbounded run mode.
pub const TS_MAX_UNBOUNDED: u64 = u64::MAX;

const RETRY_BACKOFF: Duration = Duration::from_millis(1);

/// The per-input scheduler: selects the target compute for each
/// timeslice, hands its component to that connection, and drives the
/// turn protocol for every connection in the group.
pub struct InputChannelSender {
    input_index: u16,
    connections: Vec<SenderConnection>,
    source: Box<dyn MicrosliceSource>,
    timeslice_size: u64,
    overlap_size: u64,
    max_ts: u64,
    ts_index: u64,
    abort: Arc<AtomicBool>,
}

impl InputChannelSender {
    #[must_use]
    pub fn new(
        input_index: u16,
        connections: Vec<SenderConnection>,
        source: Box<dyn MicrosliceSource>,
        timeslice_size: u64,
        overlap_size: u64,
        max_ts: u64,
        abort: Arc<AtomicBool>,
    ) -> Self {
        Self {
            input_index,
            connections,
            source,
            timeslice_size,
            overlap_size,
            max_ts,
            ts_index: 0,
            abort,
        }
    }

    #[must_use]
    pub fn ts_index(&self) -> u64 {
        self.ts_index
    }

    /// Runs the scheduler loop until `ts_index == max_ts` or abort, then
    /// finalizes every connection and drains their remaining status
    /// traffic.
    ///
    /// Compute status has to be received while `ts_index` is advancing,
    /// not only once the loop is done sending: `on_recv_status` is what
    /// reclaims a connection's turn and its cached `ack` credit (spec §5),
    /// so one background task per connection polls
    /// [`SenderConnection::endpoint_handle`] concurrently with the send
    /// loop, forwarding raw frames back here for `self` to apply.
    pub async fn run(mut self) -> Result<(), FabricError> {
        let (frame_tx, mut frame_rx) = mpsc::channel::<(usize, Vec<u8>)>(64);
        let mut receivers = JoinSet::new();
        for (idx, conn) in self.connections.iter().enumerate() {
            let endpoint = conn.endpoint_handle();
            let tx = frame_tx.clone();
            receivers.spawn(async move {
                while let Ok(frame) = endpoint.recv_status().await {
                    if tx.send((idx, frame)).await.is_err() {
                        break;
                    }
                }
            });
        }
        drop(frame_tx);

        while self.ts_index < self.max_ts && !self.abort.load(Ordering::Relaxed) {
            self.drain_status_frames(&mut frame_rx)?;
            if !self.send_next_component().await? {
                sleep(RETRY_BACKOFF).await;
            }
            self.flush_turns().await?;
        }

        let aborting = self.abort.load(Ordering::Relaxed);
        for conn in &mut self.connections {
            conn.finalize(aborting);
        }
        while !self.connections.iter().all(SenderConnection::is_done) {
            self.flush_turns().await?;
            match frame_rx.recv().await {
                Some((idx, frame)) => self.connections[idx].apply_status_frame(&frame)?,
                None => break,
            }
        }
        receivers.abort_all();
        info!(input_index = self.input_index, ts_sent = self.ts_index, "input channel sender finished");
        Ok(())
    }

    /// Applies every status frame already buffered from the background
    /// receive tasks, without blocking.
    fn drain_status_frames(
        &mut self,
        frame_rx: &mut mpsc::Receiver<(usize, Vec<u8>)>,
    ) -> Result<(), FabricError> {
        while let Ok((idx, frame)) = frame_rx.try_recv() {
            self.connections[idx].apply_status_frame(&frame)?;
        }
        Ok(())
    }

    /// Attempts to send the component for the current `ts_index`. Returns
    /// `false` (NOT_SENT) if the source has nothing ready yet or the
    /// target connection has no space, in which case the caller should
    /// back off and retry the same index.
    async fn send_next_component(&mut self) -> Result<bool, FabricError> {
        let Some(component) =
            self.source
                .next_component(self.ts_index, self.timeslice_size, self.overlap_size)
        else {
            return Ok(false);
        };

        let j = (self.ts_index % self.connections.len() as u64) as usize;
        let conn = &mut self.connections[j];

        let skip = conn.skip_required(component.payload.len() as u64);
        let total = component.payload.len() as u64 + skip;
        if !conn.check_space(total, 1) {
            warn!(ts_index = self.ts_index, compute_index = j, "buffer full, deferring");
            return Ok(false);
        }

        conn.send_component(self.ts_index, component.mc_count, skip, &component.payload)?;
        self.ts_index += 1;
        Ok(true)
    }

    /// Flushes any pending status update on every connection whose turn
    /// it currently is.
    async fn flush_turns(&mut self) -> Result<(), FabricError> {
        for conn in &mut self.connections {
            conn.try_flush_status().await?;
        }
        Ok(())
    }
}
