/// Reassembles out-of-order processor completions into the strictly
/// increasing `ts_pos` order credit release requires.
///
/// Completions may arrive out of order (processors run concurrently and
/// finish in any order); TSs are released in index order, so an
/// out-of-order completion is buffered here (indexed `ts_pos mod
/// capacity`) until every earlier one has also completed.
pub struct AckRing {
    mask: u64,
    pending: Vec<bool>,
    /// Next `ts_pos` still awaited before `acked` can advance past it.
    pub next_expected: u64,
}

impl AckRing {
    #[must_use]
    pub fn new(capacity_bits: u8) -> Self {
        let capacity = 1usize << capacity_bits;
        Self {
            mask: capacity as u64 - 1,
            pending: vec![false; capacity],
            next_expected: 0,
        }
    }

    /// Records a completion for `ts_pos`. Returns `true` if `next_expected`
    /// advanced (possibly draining several buffered completions at once).
    pub fn complete(&mut self, ts_pos: u64) -> bool {
        if ts_pos == self.next_expected {
            self.next_expected += 1;
            loop {
                let idx = (self.next_expected & self.mask) as usize;
                if self.pending[idx] {
                    self.pending[idx] = false;
                    self.next_expected += 1;
                } else {
                    break;
                }
            }
            true
        } else {
            debug_assert!(
                ts_pos > self.next_expected,
                "completion for ts_pos={ts_pos} arrived twice (next_expected={})",
                self.next_expected
            );
            let idx = (ts_pos & self.mask) as usize;
            self.pending[idx] = true;
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_order_completions_advance_immediately() {
        let mut ring = AckRing::new(4);
        assert!(ring.complete(0));
        assert_eq!(ring.next_expected, 1);
        assert!(ring.complete(1));
        assert_eq!(ring.next_expected, 2);
    }

    #[test]
    fn out_of_order_completions_buffer_until_gap_closes() {
        let mut ring = AckRing::new(4);
        assert!(!ring.complete(2));
        assert!(!ring.complete(1));
        assert_eq!(ring.next_expected, 0);
        assert!(ring.complete(0));
        assert_eq!(ring.next_expected, 3); // drains 1 and 2 in the same call
    }
}
