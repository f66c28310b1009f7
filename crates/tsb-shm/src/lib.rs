//! Named shared-memory segments and bounded message queues bridging a
//! compute node's buffer to its processor child processes.
//!
//! Two segments per compute process hold the per-input data/descriptor
//! rings ([`create_data_ring`] / [`create_desc_ring`]); two named message
//! queues carry [`TimesliceWorkItem`]s out to processors and
//! [`TimesliceCompletion`]s back ([`MessageQueue`]).

mod error;
mod mqueue;
mod segment;
mod work_item;

pub use error::ShmError;
pub use mqueue::MessageQueue;
pub use segment::{create_data_ring, create_desc_ring, ShmSegment};
pub use work_item::{TimesliceCompletion, TimesliceWorkItem};
