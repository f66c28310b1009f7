//! Debug assertion macros for connection-level invariants. Ring-level
//! invariants (bounded occupancy, monotonic cursors) live in `tsb-core`;
//! these concern the turn protocol and the data a `TimesliceComponentDescriptor`
//! claims about itself.

/// **Invariant**: a sender never reports more credit consumed than the
/// receiver has acknowledged plus the ring's capacity, i.e.
/// `ack ≤ sent_wp ≤ wp`.
macro_rules! debug_assert_credit_ordering {
    ($ack:expr, $sent_wp:expr, $wp:expr) => {
        debug_assert!(
            $ack <= $sent_wp && $sent_wp <= $wp,
            "INV-FABRIC-01 violated: ack={} sent_wp={} wp={}",
            $ack,
            $sent_wp,
            $wp
        )
    };
}

/// **Invariant**: a `TimesliceComponentDescriptor` written for timeslice
/// `expected` must carry that same index.
macro_rules! debug_assert_tscd_index {
    ($expected:expr, $actual:expr) => {
        debug_assert_eq!(
            $expected, $actual,
            "INV-FABRIC-02 violated: TSCD written for ts_num={} but scheduler is at ts_index={}",
            $actual, $expected
        )
    };
}

/// **Invariant**: exactly one side holds the turn at any time.
macro_rules! debug_assert_turn_exclusive {
    ($have_turn:expr) => {
        debug_assert!(
            $have_turn,
            "INV-FABRIC-03 violated: attempted to send a status message without the turn"
        )
    };
}

pub(crate) use debug_assert_credit_ordering;
pub(crate) use debug_assert_tscd_index;
pub(crate) use debug_assert_turn_exclusive;
