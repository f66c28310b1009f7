//! Cursor, ring-buffer and credit bookkeeping primitives for the
//! timeslice-building transport core.
//!
//! A compute node keeps, per input, a byte-addressable *data ring* and a
//! fixed-entry *descriptor ring* ([`DataRing`] / [`DescRing`]). Both are
//! addressed by untruncated 64-bit cursors ([`DualIndex`]) so that capacity
//! checks and wrap arithmetic never have to special-case the wrap point
//! itself — only slot addressing does.
//!
//! This crate has no knowledge of RDMA, sockets or shared memory; it is the
//! pure bookkeeping layer reused by both the input-side sender and the
//! compute-side receiver in `tsb-fabric`.
//!
//! # Example
//!
//! ```
//! use tsb_core::{BufferConfig, DataRing, DescRing};
//!
//! let config = BufferConfig::new(8, 4); // 256 B data ring, 16 TSCD slots
//! let data = DataRing::new(config.data_bits);
//! let desc = DescRing::new(config.desc_bits);
//!
//! // ack == 0 (nothing consumed yet), no skip needed, 64 bytes of payload.
//! let r = data.reserve(0, 0, 64).unwrap();
//! assert_eq!(r.write_offset(), 0);
//! r.write(&[0u8; 64]);
//! assert_eq!(data.write_pos(), 64);
//! assert_eq!(desc.capacity(), 16);
//! ```

mod backoff;
mod config;
mod cursor;
mod data_ring;
mod desc_ring;
mod invariants;
mod metrics;

pub use backoff::Backoff;
pub use config::BufferConfig;
pub use cursor::DualIndex;
pub use data_ring::{ByteStorage, DataRing, DataReservation};
pub use desc_ring::{DescRing, DescReservation, DESC_ENTRY_BYTES};
pub use metrics::{ConnectionMetrics, ConnectionMetricsSnapshot};
