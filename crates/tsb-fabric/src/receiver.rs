use crate::runtime::Endpoint;
use crate::FabricError;
use tracing::debug;
use tsb_core::{ConnectionMetrics, DualIndex};
use tsb_wire::{decode_framed, encode_framed, ComputeStatus, InputStatus, WireIndex};

/// One endpoint on the compute side, tracking one input's delivery
/// progress into this compute's rings.
///
/// `recv_wp` is only ever updated from an explicit [`InputStatus`] — even
/// though the simulated runtime gives this connection direct access to
/// the same ring the sender writes into, a real RDMA write is one-sided
/// and silent, so the receiver must not infer progress from the ring
/// itself.
pub struct ReceiverConnection {
    endpoint: Endpoint,
    input_index: u16,
    recv_wp: DualIndex,
    ack: DualIndex,
    send_ack: DualIndex,
    our_turn: bool,
    done: bool,
    metrics: ConnectionMetrics,
    /// Unwrapped data-ring cursor immediately after the TSCD at entry
    /// `idx % capacity`, indexed by the same unwrapped desc index used by
    /// `recv_wp.desc`. Reconstructed from each newly-observed TSCD's
    /// wrapped offset/size, since a status message only reports the
    /// latest cursor, not a per-entry breakdown.
    data_end_log: Vec<u64>,
    last_wrapped_end: u64,
    last_observed_desc: u64,
    unwrapped_end_cache: u64,
}

impl ReceiverConnection {
    #[must_use]
    pub fn new(endpoint: Endpoint, input_index: u16) -> Self {
        let capacity = endpoint.remote_desc.capacity() as usize;
        Self {
            endpoint,
            input_index,
            recv_wp: DualIndex::ZERO,
            ack: DualIndex::ZERO,
            send_ack: DualIndex::ZERO,
            our_turn: false, // initially it is the input's turn
            done: false,
            metrics: ConnectionMetrics::new(),
            data_end_log: vec![0u64; capacity],
            last_wrapped_end: 0,
            last_observed_desc: 0,
            unwrapped_end_cache: 0,
        }
    }

    #[must_use]
    pub fn metrics(&self) -> &ConnectionMetrics {
        &self.metrics
    }

    #[must_use]
    pub fn recv_wp(&self) -> DualIndex {
        self.recv_wp
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Replays newly-committed TSCD entries to reconstruct the unwrapped
    /// data cursor immediately following each one, so `inc_ack` can later
    /// release exactly that many bytes back to the sender.
    fn observe_new_entries(&mut self, new_desc_wp: u64) {
        let mask = self.endpoint.remote_desc.capacity() - 1;
        for idx in self.last_observed_desc..new_desc_wp {
            // Safety: idx is within [ack.desc, recv_wp.desc), which the
            // sender guarantees has been committed before advertising wp.
            let raw = unsafe { self.endpoint.remote_desc.read_entry(idx) };
            let tscd: tsb_wire::TimesliceComponentDescriptor =
                tsb_wire::decode_fixed(&raw).expect("valid TSCD entry");

            let skip = if idx == 0 {
                tscd.offset
            } else {
                tscd.offset.wrapping_sub(self.last_wrapped_end) & mask
            };
            let unwrapped_end = self.last_wrapped_end_unwrapped() + skip + u64::from(tscd.size);
            self.data_end_log[(idx & mask) as usize] = unwrapped_end;
            self.last_wrapped_end = (tscd.offset + u64::from(tscd.size)) & mask;
            self.last_observed_desc = idx + 1;
            self.unwrapped_end_cache = unwrapped_end;
        }
    }

    fn last_wrapped_end_unwrapped(&self) -> u64 {
        self.unwrapped_end_cache
    }

    /// Applies an [`InputStatus`]: if final, posts a final ack and marks
    /// done; otherwise updates `recv_wp` and, if there is released credit
    /// to report, sends an ack status immediately.
    pub async fn on_recv_status(&mut self, msg: InputStatus) -> Result<(), FabricError> {
        self.metrics.inc_status_received();
        self.our_turn = true;

        if msg.r#final {
            let ack_msg = ComputeStatus {
                ack: WireIndex::from(self.ack),
                r#final: true,
                request_abort: false,
            };
            let frame = encode_framed(&ack_msg)?;
            self.endpoint.send_status(frame).await?;
            self.metrics.inc_status_sent();
            self.done = true;
            debug!(input_index = self.input_index, "received final status, sent final ack");
            return Ok(());
        }

        let new_wp: DualIndex = msg.wp.into();
        if new_wp.desc > self.recv_wp.desc {
            self.observe_new_entries(new_wp.desc);
        }
        self.recv_wp = new_wp;

        // Always echo a reply, even with no new credit to report: the turn
        // protocol has no other mechanism (spec's periodic status timer is
        // not modeled here) to hand the turn back to the input side, and
        // without a reply every status after the first would be a no-op.
        self.try_flush_ack().await?;
        Ok(())
    }

    /// Releases credit up to (and including) desc-ring entry `desc_pos -
    /// 1`. `ack.data` is derived as the byte immediately past that
    /// entry's payload, not merely the bytes consumed so far.
    pub fn inc_ack(&mut self, desc_pos: u64) {
        if desc_pos == 0 || desc_pos <= self.ack.desc {
            return;
        }
        let mask = self.endpoint.remote_desc.capacity() - 1;
        let data_end = self.data_end_log[((desc_pos - 1) & mask) as usize];
        self.ack = DualIndex::new(data_end, desc_pos);
    }

    /// If it is our turn, ships an ack status reflecting the current
    /// `ack` cursor — even when unchanged since the last one sent, since
    /// an unconditional reply is this transport's stand-in for the spec's
    /// periodic status timer.
    pub async fn try_flush_ack(&mut self) -> Result<bool, FabricError> {
        if !self.our_turn {
            return Ok(false);
        }
        let msg = ComputeStatus {
            ack: WireIndex::from(self.ack),
            r#final: false,
            request_abort: false,
        };
        let frame = encode_framed(&msg)?;
        self.endpoint.send_status(frame).await?;
        self.metrics.inc_status_sent();
        self.send_ack = self.ack;
        self.our_turn = false;
        Ok(true)
    }

    /// Decodes a raw status frame received from the input side.
    pub fn decode_status(frame: &[u8]) -> Result<InputStatus, FabricError> {
        decode_framed(frame).map_err(FabricError::from)
    }

    /// Waits for, decodes, and applies one status message from the input
    /// side. Convenience wrapper over [`Self::decode_status`] and
    /// [`Self::on_recv_status`] for callers that don't need to inspect
    /// the raw frame.
    pub async fn recv_status(&mut self) -> Result<(), FabricError> {
        let frame = self.endpoint.recv_status().await?;
        let msg = Self::decode_status(&frame)?;
        self.on_recv_status(msg).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::{mpsc, Mutex};
    use tsb_core::{DataRing, DescRing};

    fn make_connection() -> ReceiverConnection {
        let (status_tx, _rx) = mpsc::channel(8);
        let (_tx, status_rx) = mpsc::channel(8);
        let endpoint = Endpoint {
            remote_data: Arc::new(DataRing::new(8)),
            remote_desc: Arc::new(DescRing::new(4)),
            status_tx,
            status_rx: std::sync::Arc::new(Mutex::new(status_rx)),
        };
        ReceiverConnection::new(endpoint, 0)
    }

    #[test]
    fn decode_status_roundtrips_through_encode_framed() {
        let msg = InputStatus {
            wp: WireIndex::from(DualIndex::new(10, 1)),
            r#final: false,
            abort: false,
        };
        let frame = encode_framed(&msg).unwrap();
        let decoded = ReceiverConnection::decode_status(&frame).unwrap();
        assert_eq!(decoded.wp, msg.wp);
        assert!(!decoded.r#final);
    }

    #[test]
    fn inc_ack_ignores_non_advancing_positions() {
        let mut conn = make_connection();
        conn.data_end_log[0] = 64;
        conn.inc_ack(1);
        assert_eq!(conn.ack, DualIndex::new(64, 1));
        conn.inc_ack(0);
        assert_eq!(conn.ack, DualIndex::new(64, 1), "desc_pos=0 must not rewind ack");
        conn.inc_ack(1);
        assert_eq!(conn.ack, DualIndex::new(64, 1), "a repeated desc_pos must not re-apply");
    }

    #[tokio::test]
    async fn try_flush_ack_is_a_noop_without_our_turn() {
        let mut conn = make_connection();
        conn.our_turn = false;
        conn.ack = DualIndex::new(1, 1);
        assert!(!conn.try_flush_ack().await.unwrap());
    }
}
