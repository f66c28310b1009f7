/// Ring size configuration for one connection's compute-side rings.
///
/// Mirrors the teacher's `Config` (ring size as a power-of-two exponent) but
/// splits data and descriptor rings, since the two grow at different rates:
/// the data ring holds `2^data_bits` bytes, the descriptor ring holds
/// `2^desc_bits` 32-byte [`crate::DescRing`] entries.
#[derive(Debug, Clone, Copy)]
pub struct BufferConfig {
    /// Data ring size as a power of two (bytes).
    pub data_bits: u8,
    /// Descriptor ring size as a power of two (entries).
    pub desc_bits: u8,
}

impl BufferConfig {
    /// Creates a new configuration.
    ///
    /// # Panics
    ///
    /// Panics if either exponent is 0 or greater than 34 (the descriptor
    /// buffer auto-sizing clamp in the CLI never asks for more than this;
    /// values beyond it are almost certainly a config mistake).
    #[must_use]
    pub const fn new(data_bits: u8, desc_bits: u8) -> Self {
        assert!(data_bits > 0 && data_bits <= 34, "data_bits out of range");
        assert!(desc_bits > 0 && desc_bits <= 34, "desc_bits out of range");
        Self {
            data_bits,
            desc_bits,
        }
    }

    #[must_use]
    pub const fn data_capacity(&self) -> u64 {
        1u64 << self.data_bits
    }

    #[must_use]
    pub const fn desc_capacity(&self) -> u64 {
        1u64 << self.desc_bits
    }

    #[must_use]
    pub const fn data_mask(&self) -> u64 {
        self.data_capacity() - 1
    }

    #[must_use]
    pub const fn desc_mask(&self) -> u64 {
        self.desc_capacity() - 1
    }
}

impl Default for BufferConfig {
    /// 1 MiB data ring, 32K descriptor entries — the lower end of the
    /// auto-sizing clamp described in the spec's buffer-size auto-sizing
    /// section.
    fn default() -> Self {
        Self::new(20, 15)
    }
}
