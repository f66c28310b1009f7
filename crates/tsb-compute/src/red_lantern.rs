/// The "red lantern": the number of timeslice positions every input has
/// completely delivered to this compute, i.e. `min` over inputs of their
/// descriptor-ring receive cursor.
///
/// Named for the slowest train on a railway carrying a lantern at the
/// rear — the whole convoy is only as far along as its slowest member.
#[must_use]
pub fn completely_written(recv_desc_counts: &[u64]) -> u64 {
    recv_desc_counts.iter().copied().min().unwrap_or(0)
}
