/// One timeslice component's worth of microslice data, ready to hand to a
/// [`crate::SenderConnection`]: the concatenated payload of `mc_count`
/// microslices.
#[derive(Debug, Clone)]
pub struct Component {
    pub mc_count: u32,
    pub payload: Vec<u8>,
}

/// Produces microslices into an input-local ring, standing in for the
/// hardware DMA engines and software pattern generators this transport
/// does not itself model.
///
/// `next_component` is polled once per timeslice index by
/// [`crate::InputChannelSender`]; returning `None` means not enough
/// microslices have been produced yet for this index, and the caller
/// should back off and retry.
pub trait MicrosliceSource: Send {
    fn next_component(
        &mut self,
        ts_index: u64,
        timeslice_size: u64,
        overlap_size: u64,
    ) -> Option<Component>;
}

/// A minimal in-memory pattern generator, analogous to the original's
/// `EmbeddedPatternGenerator`: every microslice is `typical_content_size`
/// bytes of a single repeating byte derived from its own monotonic index,
/// so a reference processor can independently recompute and check it.
///
/// Microslice `m`'s content byte is a pure function of `m`'s absolute
/// index, not of call order: TS `t`'s component spans absolute indices
/// `[t*TS_CORE, t*TS_CORE+TS_CORE+TS_OVERLAP)`, so its overlap tail
/// `[TS_CORE, TS_CORE+TS_OVERLAP)` names the same absolute indices — and
/// therefore the same bytes — as TS `t+1`'s head.
pub struct PatternGenerator {
    typical_content_size: usize,
}

impl PatternGenerator {
    #[must_use]
    pub fn new(typical_content_size: usize) -> Self {
        Self { typical_content_size }
    }
}

impl MicrosliceSource for PatternGenerator {
    fn next_component(
        &mut self,
        ts_index: u64,
        timeslice_size: u64,
        overlap_size: u64,
    ) -> Option<Component> {
        let count = timeslice_size + overlap_size;
        let base_idx = ts_index * timeslice_size;
        let mut payload = Vec::with_capacity(count as usize * self.typical_content_size);
        for offset in 0..count {
            let byte = ((base_idx + offset) % 256) as u8;
            payload.extend(std::iter::repeat(byte).take(self.typical_content_size));
        }
        Some(Component {
            mc_count: count as u32,
            payload,
        })
    }
}
