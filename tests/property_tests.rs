//! Property-based tests for the ring/cursor invariants from src/invariants.rs.
//!
//! Coverage:
//! - DataRing<Vec<u8>> (byte-addressable, variable-length reservations)
//! - DescRing<Vec<u8>> (fixed-size entries)

use proptest::prelude::*;
use tsb_core::{DataRing, DescRing};

// =============================================================================
// INV-RING-01: Bounded occupancy
// "0 <= wp - ack <= capacity"
// =============================================================================

proptest! {
    /// INV-RING-01: DataRing never reports occupancy beyond its capacity,
    /// however reservations and an externally-advancing ack interleave.
    #[test]
    fn prop_bounded_occupancy_data_ring(
        sizes in prop::collection::vec(1u64..64, 1..40),
        ack_advances in prop::collection::vec(0u64..64, 1..40),
    ) {
        let ring = DataRing::new(8); // 256 bytes
        let mut ack = 0u64;

        for (i, &size) in sizes.iter().enumerate() {
            if let Some(r) = ring.reserve(ack, 0, size) {
                r.write(&vec![0u8; size as usize]);
            }
            let occupancy = ring.write_pos() - ack;
            prop_assert!(occupancy <= ring.capacity(),
                "INV-RING-01 violated: occupancy {} > capacity {}", occupancy, ring.capacity());

            if let Some(&advance) = ack_advances.get(i) {
                ack = (ack + advance).min(ring.write_pos());
            }
        }
    }

    /// INV-RING-01: DescRing never reports occupancy beyond its capacity.
    #[test]
    fn prop_bounded_occupancy_desc_ring(
        counts in prop::collection::vec(1u64..8, 1..40),
        ack_advances in prop::collection::vec(0u64..8, 1..40),
    ) {
        let ring = DescRing::new(4); // 16 entries
        let mut ack = 0u64;

        for (i, &count) in counts.iter().enumerate() {
            if let Some(r) = ring.reserve(ack, count) {
                r.commit();
            }
            let occupancy = ring.write_pos() - ack;
            prop_assert!(occupancy <= ring.capacity(),
                "INV-RING-01 violated: occupancy {} > capacity {}", occupancy, ring.capacity());

            if let Some(&advance) = ack_advances.get(i) {
                ack = (ack + advance).min(ring.write_pos());
            }
        }
    }
}

// =============================================================================
// INV-RING-02: Monotonic write cursor
// "wp only ever increases"
// =============================================================================

proptest! {
    /// INV-RING-02: write_pos() never goes backwards across any sequence
    /// of successful reservations.
    #[test]
    fn prop_monotonic_write_pos(
        sizes in prop::collection::vec(1u64..200, 1..50),
    ) {
        let ring = DataRing::new(12); // 4096 bytes, generous so most fit
        let mut ack = 0u64;
        let mut last_wp = ring.write_pos();

        for size in sizes {
            let skip = ring.skip_required(size);
            if let Some(r) = ring.reserve(ack, skip, size) {
                r.write(&vec![0u8; size as usize]);
            }
            let wp = ring.write_pos();
            prop_assert!(wp >= last_wp,
                "INV-RING-02 violated: write_pos {} < previous {}", wp, last_wp);
            last_wp = wp;
            ack = wp.saturating_sub(ring.capacity());
        }
    }
}

// =============================================================================
// INV-RING-03: Reservation gated by ack, not by a live remote cursor
// =============================================================================

proptest! {
    /// INV-RING-03: a reservation only succeeds when the requested total
    /// fits within `capacity - (wp - ack)`, and every successful write
    /// offset lands within the ring's byte bounds.
    #[test]
    fn prop_reservation_respects_space_and_bounds(
        request in 1u64..300,
        pre_fill in 0u64..200,
    ) {
        let ring = DataRing::new(8); // 256 bytes
        let ack = 0u64;

        if pre_fill > 0 {
            let skip = ring.skip_required(pre_fill.min(ring.capacity()));
            let len = pre_fill.min(ring.capacity());
            if let Some(r) = ring.reserve(ack, skip, len) {
                r.write(&vec![0u8; len as usize]);
            }
        }

        let wp = ring.write_pos();
        let free = ring.capacity() - (wp - ack);
        let skip = ring.skip_required(request);

        match ring.reserve(ack, skip, request) {
            Some(r) => {
                prop_assert!(skip + request <= free,
                    "reservation granted {} total bytes but only {} were free", skip + request, free);
                prop_assert!(r.write_offset() < ring.capacity());
            }
            None => {
                prop_assert!(skip + request > free,
                    "reservation denied despite {} bytes free for a {} byte request", free, skip + request);
            }
        }
    }
}
