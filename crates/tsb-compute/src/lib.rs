//! Compute-side timeslice assembly.
//!
//! A compute node accepts one [`tsb_fabric::ReceiverConnection`] per
//! input, tracks how far each has delivered with the red-lantern
//! algorithm ([`red_lantern`]), and reassembles out-of-order processor
//! completions ([`ack_ring::AckRing`]) back into released credit. The
//! [`compute_buffer::ComputeBuffer`] ties these together; processors
//! themselves run as supervised child processes ([`processor`]).

mod ack_ring;
mod compute_buffer;
mod error;
mod processor;
mod red_lantern;

pub use ack_ring::AckRing;
pub use compute_buffer::{CompletionSource, ComputeBuffer, WorkItemSink};
pub use error::ComputeError;
pub use processor::ProcessorSupervisor;
pub use red_lantern::completely_written;
