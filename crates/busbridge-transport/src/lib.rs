//! busbridge-transport - Envelope codec and frame reassembly
//!
//! This crate provides:
//! - [`Envelope`] and [`EnvelopeType`] for the protocol's JSON message shapes
//! - [`FrameCodec`] trait and [`JsonFrameCodec`] for length-prefixed frames
//! - [`FrameReassembler`] for rebuilding frames from arbitrary byte chunks

mod codec;
mod envelope;
mod reassembler;

pub use codec::{CodecError, FrameCodec, JsonFrameCodec, LENGTH_PREFIX_SIZE};
pub use envelope::{Envelope, EnvelopeType, Headers, merge_headers};
pub use reassembler::{FrameReassembler, Frames};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        CodecError, Envelope, EnvelopeType, FrameCodec, FrameReassembler, Headers,
        JsonFrameCodec, merge_headers,
    };
}
