use crate::ack_ring::AckRing;
use crate::error::ComputeError;
use crate::red_lantern;
use std::sync::Arc;
use tracing::trace;
use tsb_core::BufferConfig;
use tsb_fabric::ReceiverConnection;
use tsb_shm::{MessageQueue, TimesliceCompletion, TimesliceWorkItem};

/// Destination for freshly-ready [`TimesliceWorkItem`]s. Implemented for
/// the real [`MessageQueue`] and, in tests, by an in-memory double so
/// tests don't need a real POSIX message queue.
pub trait WorkItemSink: Send + Sync {
    fn send(&self, item: TimesliceWorkItem) -> Result<(), ComputeError>;
    fn send_shutdown(&self) -> Result<(), ComputeError>;
}

impl WorkItemSink for MessageQueue<TimesliceWorkItem> {
    fn send(&self, item: TimesliceWorkItem) -> Result<(), ComputeError> {
        MessageQueue::send(self, &item).map_err(ComputeError::from)
    }

    fn send_shutdown(&self) -> Result<(), ComputeError> {
        MessageQueue::send_shutdown(self).map_err(ComputeError::from)
    }
}

/// Source of processor completions. See [`WorkItemSink`] for why this is
/// a trait rather than a concrete `MessageQueue`.
pub trait CompletionSource: Send + Sync {
    /// Blocks until a completion or the shutdown sentinel arrives.
    fn recv(&self) -> Result<Option<TimesliceCompletion>, ComputeError>;
}

impl CompletionSource for MessageQueue<TimesliceCompletion> {
    fn recv(&self) -> Result<Option<TimesliceCompletion>, ComputeError> {
        MessageQueue::recv(self).map_err(ComputeError::from)
    }
}

/// Owns one compute node's per-input receiver connections, the
/// red-lantern bookkeeping that turns their delivery progress into ready
/// work items, and the out-of-order completion reassembly that turns
/// processor completions back into released credit.
pub struct ComputeBuffer {
    compute_index: u16,
    num_computes: u32,
    receivers: Vec<ReceiverConnection>,
    config: BufferConfig,
    ack_ring: AckRing,
    next_ts_pos_emitted: u64,
}

impl ComputeBuffer {
    #[must_use]
    pub fn new(
        compute_index: u16,
        num_computes: u32,
        receivers: Vec<ReceiverConnection>,
        config: BufferConfig,
    ) -> Self {
        Self {
            compute_index,
            num_computes,
            receivers,
            config,
            ack_ring: AckRing::new(config.desc_bits),
            next_ts_pos_emitted: 0,
        }
    }

    #[must_use]
    pub fn receivers(&mut self) -> &mut [ReceiverConnection] {
        &mut self.receivers
    }

    /// The red-lantern cursor: how many timeslice positions every input
    /// has completely delivered.
    #[must_use]
    pub fn completely_written(&self) -> u64 {
        let counts: Vec<u64> = self.receivers.iter().map(|r| r.recv_wp().desc).collect();
        red_lantern::completely_written(&counts)
    }

    /// Posts one work item per newly-ready timeslice position, advancing
    /// `next_ts_pos_emitted`. Returns how many were emitted.
    pub fn emit_ready_work_items(&mut self, sink: &dyn WorkItemSink) -> Result<u64, ComputeError> {
        let ready = self.completely_written();
        let mut emitted = 0u64;
        while self.next_ts_pos_emitted < ready {
            let ts_pos = self.next_ts_pos_emitted;
            let ts_index = ts_pos * u64::from(self.num_computes) + u64::from(self.compute_index);
            let item = TimesliceWorkItem {
                ts_index,
                ts_pos,
                ts_core: self.receivers.len() as u32,
                num_components: self.receivers.len() as u32,
                data_buffer_size_exp: self.config.data_bits,
                desc_buffer_size_exp: self.config.desc_bits,
            };
            sink.send(item)?;
            trace!(ts_index, ts_pos, "emitted work item");
            self.next_ts_pos_emitted += 1;
            emitted += 1;
        }
        Ok(emitted)
    }

    /// Applies one processor completion, releasing credit on every
    /// input's receiver connection for every timeslice position the
    /// completion newly makes contiguous.
    pub fn apply_completion(&mut self, completion: TimesliceCompletion) {
        let before = self.ack_ring.next_expected;
        if self.ack_ring.complete(completion.ts_pos) {
            for ts_pos in before..self.ack_ring.next_expected {
                let desc_pos = ts_pos + 1;
                for conn in &mut self.receivers {
                    conn.inc_ack(desc_pos);
                }
            }
        }
    }

    /// Drains completions from `source` until the shutdown sentinel,
    /// applying each one. Blocking `recv` calls run on a blocking thread
    /// so they don't stall the async runtime.
    pub async fn run_completion_loop(
        &mut self,
        source: Arc<dyn CompletionSource>,
    ) -> Result<(), ComputeError> {
        loop {
            let source = Arc::clone(&source);
            let msg = tokio::task::spawn_blocking(move || source.recv())
                .await
                .expect("completion recv task panicked")?;
            match msg {
                None => return Ok(()),
                Some(completion) => self.apply_completion(completion),
            }
        }
    }

    #[must_use]
    pub fn acked(&self) -> u64 {
        self.ack_ring.next_expected
    }
}
