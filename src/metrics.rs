use std::sync::atomic::{AtomicU64, Ordering};

/// Lightweight, lock-free counters for one `(input, compute)` connection.
///
/// Mirrors the teacher's `Metrics` (messages/batches sent and received) but
/// tracks the quantities this protocol actually reasons about: bytes and
/// descriptor entries written, status messages exchanged, and how often
/// the sender had to wait for space.
#[derive(Debug, Default)]
pub struct ConnectionMetrics {
    data_bytes_written: AtomicU64,
    desc_entries_written: AtomicU64,
    status_sent: AtomicU64,
    status_received: AtomicU64,
    buffer_full_waits: AtomicU64,
}

impl ConnectionMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_write(&self, data_bytes: u64, desc_entries: u64) {
        self.data_bytes_written
            .fetch_add(data_bytes, Ordering::Relaxed);
        self.desc_entries_written
            .fetch_add(desc_entries, Ordering::Relaxed);
    }

    pub fn inc_status_sent(&self) {
        self.status_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_status_received(&self) {
        self.status_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_buffer_full_wait(&self) {
        self.buffer_full_waits.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn snapshot(&self) -> ConnectionMetricsSnapshot {
        ConnectionMetricsSnapshot {
            data_bytes_written: self.data_bytes_written.load(Ordering::Relaxed),
            desc_entries_written: self.desc_entries_written.load(Ordering::Relaxed),
            status_sent: self.status_sent.load(Ordering::Relaxed),
            status_received: self.status_received.load(Ordering::Relaxed),
            buffer_full_waits: self.buffer_full_waits.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`ConnectionMetrics`], cheap to log or export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionMetricsSnapshot {
    pub data_bytes_written: u64,
    pub desc_entries_written: u64,
    pub status_sent: u64,
    pub status_received: u64,
    pub buffer_full_waits: u64,
}
