//! Wire types and codec for the timeslice-building transport.
//!
//! Three things travel between an input and a compute node: fixed-layout
//! descriptors written directly into ring memory
//! ([`MicrosliceDescriptor`], [`TimesliceComponentDescriptor`]), status
//! messages exchanged over the turn protocol ([`InputStatus`],
//! [`ComputeStatus`]), and connection private data exchanged once at
//! setup ([`InputPrivateData`], [`ComputePrivateData`]). The [`codec`]
//! module provides the encode/decode functions for both shapes.

mod codec;
mod error;
mod microslice;
mod private_data;
mod status;
mod tscd;

pub use codec::{decode_fixed, decode_framed, encode_fixed, encode_framed};
pub use error::WireError;
pub use microslice::MicrosliceDescriptor;
pub use private_data::{ComputePrivateData, InputPrivateData, RemoteRegion};
pub use status::{ComputeStatus, InputStatus, WireIndex};
pub use tscd::TimesliceComponentDescriptor;
