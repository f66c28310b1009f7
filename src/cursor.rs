use std::fmt;

/// A pair of untruncated 64-bit cursors, one for the data ring and one for
/// the descriptor ring of a single connection.
///
/// `DualIndex` never wraps on its own — wrapping only happens when a cursor
/// value is used to address a ring slot (`value % capacity`). Carrying the
/// unwrapped value means `wp - ack` is always the live occupancy, with no
/// special-casing at the wrap boundary.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DualIndex {
    pub data: u64,
    pub desc: u64,
}

impl DualIndex {
    pub const ZERO: DualIndex = DualIndex { data: 0, desc: 0 };

    #[must_use]
    pub const fn new(data: u64, desc: u64) -> Self {
        Self { data, desc }
    }

    /// `self - other`, per field, saturating at zero.
    ///
    /// Used to compute occupancy (`wp - ack`); callers that instead need the
    /// raw (possibly negative-in-spirit) delta for credit math should
    /// subtract the `u64` fields directly.
    #[must_use]
    pub fn saturating_sub(self, other: DualIndex) -> DualIndex {
        DualIndex {
            data: self.data.saturating_sub(other.data),
            desc: self.desc.saturating_sub(other.desc),
        }
    }
}

impl fmt::Display for DualIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(data={}, desc={})", self.data, self.desc)
    }
}
