use crate::data_ring::ByteStorage;
use crate::invariants::{debug_assert_monotonic, debug_assert_reservation_within_capacity};
use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicU64, Ordering};

/// Wire size of one timeslice component descriptor entry. Fixed by the
/// on-the-wire layout in `tsb-wire::TimesliceComponentDescriptor`.
pub const DESC_ENTRY_BYTES: u64 = 32;

/// A ring of fixed-size 32-byte descriptor entries.
///
/// Entries never need to be split across the wrap boundary — unlike
/// [`crate::DataRing`], reservations are always a whole number of entries,
/// so this is closer to the teacher's `Ring<T>` than to `DataRing`: each
/// `reserve` call hands back a contiguous run of entries, wrapping back to
/// index 0 at the capacity boundary.
pub struct DescRing<S: ByteStorage = Vec<u8>> {
    bits: u8,
    write_pos: AtomicU64,
    storage: UnsafeCell<S>,
}

unsafe impl<S: ByteStorage + Send> Send for DescRing<S> {}
unsafe impl<S: ByteStorage + Send> Sync for DescRing<S> {}

impl DescRing<Vec<u8>> {
    /// Creates a new ring of `2^bits` entries backed by a zeroed buffer.
    #[must_use]
    pub fn new(bits: u8) -> Self {
        let bytes = (1usize << bits) * DESC_ENTRY_BYTES as usize;
        Self::with_storage(bits, vec![0u8; bytes])
    }
}

impl<S: ByteStorage> DescRing<S> {
    /// Wraps externally-provided storage as a descriptor ring.
    ///
    /// # Panics
    ///
    /// Panics if `storage.as_ref().len() != 2^bits * 32`.
    pub fn with_storage(bits: u8, storage: S) -> Self {
        assert_eq!(
            storage.as_ref().len() as u64,
            (1u64 << bits) * DESC_ENTRY_BYTES,
            "storage size must equal 2^bits entries of 32 bytes each"
        );
        Self {
            bits,
            write_pos: AtomicU64::new(0),
            storage: UnsafeCell::new(storage),
        }
    }

    #[must_use]
    #[inline]
    pub const fn capacity(&self) -> u64 {
        1u64 << self.bits
    }

    #[inline]
    fn mask(&self) -> u64 {
        self.capacity() - 1
    }

    /// Current write cursor, counted in entries (not bytes), unwrapped.
    #[inline]
    pub fn write_pos(&self) -> u64 {
        self.write_pos.load(Ordering::Acquire)
    }

    /// Reserves `count` contiguous entries starting at the current write
    /// cursor. Returns `None` if there is not enough free space given
    /// `ack` (the last entry the reader has fully consumed).
    pub fn reserve(&self, ack: u64, count: u64) -> Option<DescReservation<'_, S>> {
        debug_assert_reservation_within_capacity!(count, self.capacity());
        let wp = self.write_pos();
        if (wp - ack) + count > self.capacity() {
            return None;
        }
        Some(DescReservation {
            ring: self,
            start: wp,
            count,
        })
    }

    fn commit_internal(&self, count: u64) {
        let old = self.write_pos.load(Ordering::Relaxed);
        let new = old + count;
        debug_assert_monotonic!("DescRing.write_pos", old, new);
        self.write_pos.store(new, Ordering::Release);
    }

    /// Reads back the 32-byte entry at unwrapped index `idx`.
    ///
    /// # Safety
    ///
    /// The caller must ensure `idx` lies in `[ack, write_pos)`.
    pub unsafe fn read_entry(&self, idx: u64) -> [u8; DESC_ENTRY_BYTES as usize] {
        let slot = (idx & self.mask()) as usize * DESC_ENTRY_BYTES as usize;
        let storage = &*self.storage.get();
        let bytes = storage.as_ref();
        let mut out = [0u8; DESC_ENTRY_BYTES as usize];
        out.copy_from_slice(&bytes[slot..slot + DESC_ENTRY_BYTES as usize]);
        out
    }
}

/// A reservation for `count` contiguous descriptor entries.
pub struct DescReservation<'a, S: ByteStorage> {
    ring: &'a DescRing<S>,
    start: u64,
    count: u64,
}

impl<'a, S: ByteStorage> DescReservation<'a, S> {
    /// Unwrapped entry index of the first reserved entry — becomes part of
    /// the ack protocol on the wire.
    #[must_use]
    pub fn start(&self) -> u64 {
        self.start
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Writes one 32-byte entry at reservation-relative index `i`
    /// (`0 <= i < count`).
    pub fn write_entry(&self, i: u64, entry: &[u8; DESC_ENTRY_BYTES as usize]) {
        assert!(i < self.count, "entry index out of reservation bounds");
        let idx = self.start + i;
        let slot = (idx & self.ring.mask()) as usize * DESC_ENTRY_BYTES as usize;
        // Safety: single writer per ring, slot computed from a granted
        // reservation that already checked capacity.
        let storage = unsafe { &mut *self.ring.storage.get() };
        let bytes = storage.as_mut();
        bytes[slot..slot + DESC_ENTRY_BYTES as usize].copy_from_slice(entry);
    }

    /// Commits all `count` entries, publishing them to readers.
    pub fn commit(self) {
        self.ring.commit_internal(self.count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(tag: u8) -> [u8; DESC_ENTRY_BYTES as usize] {
        [tag; DESC_ENTRY_BYTES as usize]
    }

    #[test]
    fn reserve_write_commit_roundtrip() {
        let ring = DescRing::new(4); // 16 entries
        let r = ring.reserve(0, 3).unwrap();
        assert_eq!(r.start(), 0);
        r.write_entry(0, &entry(1));
        r.write_entry(1, &entry(2));
        r.write_entry(2, &entry(3));
        r.commit();
        assert_eq!(ring.write_pos(), 3);
        assert_eq!(unsafe { ring.read_entry(1) }, entry(2));
    }

    #[test]
    fn reserve_wraps_at_capacity() {
        let ring = DescRing::new(2); // 4 entries
        ring.reserve(0, 4).unwrap().commit();
        assert_eq!(ring.write_pos(), 4);
        let r = ring.reserve(4, 2).unwrap();
        assert_eq!(r.start(), 4);
        r.write_entry(0, &entry(9));
        r.commit();
        // Index 4 wraps to slot 0.
        assert_eq!(unsafe { ring.read_entry(4) }, entry(9));
    }

    #[test]
    fn reserve_rejects_overflow() {
        let ring = DescRing::new(2); // 4 entries
        ring.reserve(0, 4).unwrap().commit();
        assert!(ring.reserve(0, 1).is_none()); // ack stuck at 0, ring full
        assert!(ring.reserve(1, 1).is_some());
    }
}
