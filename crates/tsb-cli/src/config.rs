use sysinfo::System;
use tsb_core::BufferConfig;

/// Lower/upper clamp on the auto-sized data ring exponent: 1 MiB .. 1 GiB.
const DATA_BITS_MIN: u8 = 20;
const DATA_BITS_MAX: u8 = 30;

/// Smallest power-of-two byte count no less than `bytes`, expressed as an
/// exponent, clamped to `[DATA_BITS_MIN, DATA_BITS_MAX]`.
fn bits_for_at_least(bytes: u64) -> u8 {
    let bits = 64 - bytes.max(1).saturating_sub(1).leading_zeros() as u8;
    bits.clamp(DATA_BITS_MIN, DATA_BITS_MAX)
}

/// Picks a data ring size exponent when none was given on the command
/// line: the smallest power of two no less than 5% of physical RAM
/// divided among the local inputs, clamped to `[2^20, 2^30]`.
#[must_use]
pub fn auto_size_data_bits(num_inputs_local: usize) -> u8 {
    let mut sys = System::new();
    sys.refresh_memory();
    let total_bytes = sys.total_memory();
    let share = (total_bytes / 20) / num_inputs_local.max(1) as u64;
    bits_for_at_least(share)
}

/// Picks a descriptor ring size exponent given the chosen data ring size
/// and the producer's typical microslice content size: `4 * data_size /
/// typical_content_size` entries, clamped so the descriptor ring occupies
/// between 10% and 100% of the data ring's byte size.
#[must_use]
pub fn auto_size_desc_bits(data_bits: u8, typical_content_size: u64) -> u8 {
    let data_size = 1u64 << data_bits;
    let target_entries = (4 * data_size) / typical_content_size.max(1);
    let mut bits = bits_for_at_least(target_entries.max(1));

    let desc_bytes_for = |b: u8| (1u64 << b) * u64::from(tsb_core::DESC_ENTRY_BYTES);
    while desc_bytes_for(bits) * 10 < data_size && bits > 1 {
        bits -= 1;
    }
    while desc_bytes_for(bits) > data_size && bits > 1 {
        bits -= 1;
    }
    bits
}

/// Resolves an explicit CLI exponent, or auto-sizes it against the given
/// data ring exponent and the source's typical content size.
#[must_use]
pub fn resolve_buffer_config(
    data_bits: Option<u8>,
    desc_bits: Option<u8>,
    num_inputs_local: usize,
    typical_content_size: u64,
) -> BufferConfig {
    let data_bits = data_bits.unwrap_or_else(|| auto_size_data_bits(num_inputs_local));
    let desc_bits = desc_bits.unwrap_or_else(|| auto_size_desc_bits(data_bits, typical_content_size));
    BufferConfig::new(data_bits, desc_bits)
}
