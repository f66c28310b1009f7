use crate::invariants::{debug_assert_credit_ordering, debug_assert_turn_exclusive};
use crate::runtime::Endpoint;
use crate::FabricError;
use tracing::{debug, trace};
use tsb_core::{ConnectionMetrics, DualIndex};
use tsb_wire::{decode_framed, encode_framed, InputStatus, TimesliceComponentDescriptor, WireIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Active,
    Finalizing { abort: bool },
    Done,
}

/// One endpoint on the input side: maintains `wp` (implicit, read off the
/// remote rings since this connection is their sole writer), a cached
/// `ack` reflecting the receiver's released credit, and the turn flag.
pub struct SenderConnection {
    endpoint: Endpoint,
    compute_index: u16,
    ack: DualIndex,
    sent_wp: DualIndex,
    our_turn: bool,
    state: State,
    metrics: ConnectionMetrics,
}

impl SenderConnection {
    #[must_use]
    pub fn new(endpoint: Endpoint, compute_index: u16) -> Self {
        Self {
            endpoint,
            compute_index,
            ack: DualIndex::ZERO,
            sent_wp: DualIndex::ZERO,
            our_turn: true, // initially it is the input's turn
            state: State::Active,
            metrics: ConnectionMetrics::new(),
        }
    }

    #[must_use]
    pub fn metrics(&self) -> &ConnectionMetrics {
        &self.metrics
    }

    fn wp(&self) -> DualIndex {
        DualIndex::new(
            self.endpoint.remote_data.write_pos(),
            self.endpoint.remote_desc.write_pos(),
        )
    }

    /// Bytes needed to reach the data ring's wrap boundary before writing
    /// `data_bytes` more, or 0 if no skip is needed.
    #[must_use]
    pub fn skip_required(&self, data_bytes: u64) -> u64 {
        self.endpoint.remote_data.skip_required(data_bytes)
    }

    /// Whether `data_total` bytes (including any skip) and `desc_count`
    /// descriptor entries currently fit given the cached `ack`.
    #[must_use]
    pub fn check_space(&self, data_total: u64, desc_count: u64) -> bool {
        let wp = self.wp();
        debug_assert_credit_ordering!(self.ack.data, self.sent_wp.data, wp.data);
        (wp.data - self.ack.data) + data_total <= self.endpoint.remote_data.capacity()
            && (wp.desc - self.ack.desc) + desc_count <= self.endpoint.remote_desc.capacity()
    }

    /// Writes one component's payload and its `TimesliceComponentDescriptor`
    /// into the peer compute's rings, advancing `wp` by `skip + payload.len()`.
    pub fn send_component(
        &mut self,
        ts_index: u64,
        mc_count: u32,
        skip: u64,
        payload: &[u8],
    ) -> Result<(), FabricError> {
        let data_bytes = payload.len() as u64;
        let reservation = self
            .endpoint
            .remote_data
            .reserve(self.ack.data, skip, data_bytes)
            .ok_or_else(|| FabricError::Protocol("data ring overrun in send_component".into()))?;
        let write_offset = reservation.write_offset();
        reservation.write(payload);

        let tscd = TimesliceComponentDescriptor::new(
            ts_index,
            write_offset,
            data_bytes as u32,
            mc_count,
        );
        let bytes = tsb_wire::encode_fixed(&tscd)?;
        let mut entry = [0u8; tsb_core::DESC_ENTRY_BYTES as usize];
        entry.copy_from_slice(&bytes);

        let desc_reservation = self
            .endpoint
            .remote_desc
            .reserve(self.ack.desc, 1)
            .ok_or_else(|| FabricError::Protocol("desc ring overrun in send_component".into()))?;
        desc_reservation.write_entry(0, &entry);
        desc_reservation.commit();

        self.metrics.add_write(skip + data_bytes, 1);
        trace!(ts_index, compute_index = self.compute_index, write_offset, data_bytes, "sent component");
        Ok(())
    }

    /// Enters finalize state. The next flushed status carries `final=true`
    /// once `wp == ack` (clean), or immediately (abort).
    pub fn finalize(&mut self, abort: bool) {
        if !matches!(self.state, State::Done) {
            self.state = State::Finalizing { abort };
        }
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        matches!(self.state, State::Done)
    }

    /// If it is our turn and there is an update (or a pending finalize) to
    /// report, ships a status message and clears the turn flag.
    pub async fn try_flush_status(&mut self) -> Result<bool, FabricError> {
        if !self.our_turn {
            return Ok(false);
        }
        let wp = self.wp();
        let is_final = match self.state {
            State::Finalizing { abort: true } => true,
            State::Finalizing { abort: false } => wp == self.ack,
            State::Active | State::Done => false,
        };
        let has_update = wp != self.sent_wp;
        if !has_update && !is_final {
            return Ok(false);
        }

        debug_assert_turn_exclusive!(self.our_turn);
        let msg = InputStatus {
            wp: WireIndex::from(wp),
            r#final: is_final,
            abort: matches!(self.state, State::Finalizing { abort: true }),
        };
        let frame = encode_framed(&msg)?;
        self.endpoint.send_status(frame).await?;
        self.metrics.inc_status_sent();

        self.sent_wp = wp;
        self.our_turn = false;
        if is_final {
            self.state = State::Done;
            debug!(compute_index = self.compute_index, "sent final status");
        }
        Ok(true)
    }

    /// A cheap handle onto this connection's endpoint, for a background
    /// task to poll [`Endpoint::recv_status`] concurrently with the main
    /// send loop. Frames it receives are applied via
    /// [`Self::apply_status_frame`], which only this connection's owner
    /// can call, so there is never a second mutable borrow of `self`.
    #[must_use]
    pub fn endpoint_handle(&self) -> Endpoint {
        self.endpoint.clone()
    }

    /// Decodes and applies one already-received status frame: updates the
    /// cached `ack` and takes the turn.
    pub fn apply_status_frame(&mut self, frame: &[u8]) -> Result<(), FabricError> {
        let msg: tsb_wire::ComputeStatus = decode_framed(frame)?;
        self.ack = msg.ack.into();
        self.our_turn = true;
        self.metrics.inc_status_received();
        if msg.r#final {
            self.state = State::Done;
        }
        Ok(())
    }

    /// Waits for, and applies, one status message from the receiver.
    /// Convenience wrapper over [`Self::apply_status_frame`] for callers
    /// that don't need to receive concurrently with anything else.
    pub async fn recv_status(&mut self) -> Result<(), FabricError> {
        let frame = self.endpoint.recv_status().await?;
        self.apply_status_frame(&frame)
    }
}
