//! Debug assertion macros for the ring/cursor invariants from spec §3 and §8.
//!
//! Active only in debug builds (`#[cfg(debug_assertions)]`); zero overhead
//! in release. Connection-level invariants (turn protocol, TSCD contents)
//! live in `tsb-fabric`'s own `invariants` module.

// =============================================================================
// INV-RING-01: Bounded occupancy
// =============================================================================

/// **Invariant**: `0 ≤ tail - head ≤ capacity` for a ring's write/read cursors.
///
/// Used in: `DataRing::commit_internal`, `DescRing::commit_internal`.
macro_rules! debug_assert_bounded_occupancy {
    ($occupancy:expr, $capacity:expr) => {
        debug_assert!(
            $occupancy <= $capacity,
            "INV-RING-01 violated: occupancy {} exceeds capacity {}",
            $occupancy,
            $capacity
        )
    };
}

// =============================================================================
// INV-RING-02: Monotonic cursor progress
// =============================================================================

/// **Invariant**: a cursor only ever increases.
///
/// Used in: `DataRing::commit_internal`/`advance`, `DescRing` equivalents.
macro_rules! debug_assert_monotonic {
    ($name:literal, $old:expr, $new:expr) => {
        debug_assert!(
            $new >= $old,
            "INV-RING-02 violated: {} decreased from {} to {}",
            $name,
            $old,
            $new
        )
    };
}

// =============================================================================
// INV-RING-03: Reservation never exceeds capacity
// =============================================================================

/// **Invariant**: a single reservation can never ask for more than the ring
/// holds in total — the caller must split across multiple `reserve` calls.
///
/// Used in: `DataRing::reserve`, `DescRing::reserve`.
macro_rules! debug_assert_reservation_within_capacity {
    ($n:expr, $capacity:expr) => {
        debug_assert!(
            $n <= $capacity,
            "INV-RING-03 violated: reservation of {} exceeds capacity {}",
            $n,
            $capacity
        )
    };
}

pub(crate) use debug_assert_bounded_occupancy;
pub(crate) use debug_assert_monotonic;
pub(crate) use debug_assert_reservation_within_capacity;
