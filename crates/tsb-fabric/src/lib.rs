//! Connection-level flow control, the turn protocol, and per-input
//! scheduling for the timeslice-building transport.
//!
//! This crate has no opinion on how bytes actually cross the wire — that
//! is [`FabricRuntime`]'s job, implemented deterministically by
//! `tsb-fabric-sim` for tests and demos, and in principle by a real
//! `ibverbs`-backed runtime for production use. What lives here is the
//! credit/position protocol itself: [`SenderConnection`] on the input
//! side, [`ReceiverConnection`] on the compute side, and
//! [`InputChannelSender`], the scheduler that picks a target compute per
//! timeslice and drives both sides' turn protocol.

mod error;
mod invariants;
mod receiver;
mod runtime;
mod scheduler;
mod sender;
pub mod source;

pub use error::FabricError;
pub use receiver::ReceiverConnection;
pub use runtime::{Endpoint, FabricRuntime};
pub use scheduler::{InputChannelSender, TS_MAX_UNBOUNDED};
pub use sender::SenderConnection;
pub use source::{Component, MicrosliceSource, PatternGenerator};
