//! Frame reassembly over a byte stream
//!
//! The transport hands over chunks with arbitrary boundaries: a chunk may hold
//! half a length prefix, several whole frames, or the tail of one frame and
//! the head of the next. [`FrameReassembler`] keeps the unconsumed bytes in a
//! single `BytesMut` and yields complete payloads in arrival order.
//!
//! # Example
//!
//! ```
//! use busbridge_transport::FrameReassembler;
//!
//! let mut reassembler = FrameReassembler::new();
//!
//! // A frame split inside its length prefix
//! assert_eq!(reassembler.feed(&[0, 0]).count(), 0);
//! let frames: Vec<_> = reassembler.feed(&[0, 2, b'{', b'}']).collect();
//!
//! assert_eq!(frames.len(), 1);
//! assert_eq!(&frames[0][..], b"{}");
//! ```
//!
//! There is no maximum frame size in this protocol, so the buffer grows as
//! large as the biggest frame the peer announces. The peer is trusted.

use crate::LENGTH_PREFIX_SIZE;
use bytes::{Buf, Bytes, BytesMut};

const DEFAULT_CAPACITY: usize = 8 * 1024;

/// Buffer for accumulating incoming bytes and extracting complete frame payloads
#[derive(Debug)]
pub struct FrameReassembler {
    buffer: BytesMut,
}

impl FrameReassembler {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
        }
    }

    /// Append a chunk and iterate the frames that are now complete
    ///
    /// The iterator is lazy. Frames it does not get to stay buffered and are
    /// produced by the next call to [`feed`](Self::feed) or
    /// [`frames`](Self::frames).
    pub fn feed(&mut self, chunk: &[u8]) -> Frames<'_> {
        self.buffer.extend_from_slice(chunk);
        Frames { reassembler: self }
    }

    /// Iterate the complete frames already buffered
    pub fn frames(&mut self) -> Frames<'_> {
        Frames { reassembler: self }
    }

    /// Split the next complete payload off the buffer, if there is one
    pub fn next_frame(&mut self) -> Option<Bytes> {
        let payload_len = self.pending_payload_len()?;
        let frame_len = payload_len.checked_add(LENGTH_PREFIX_SIZE)?;
        if self.buffer.len() < frame_len {
            return None;
        }

        self.buffer.advance(LENGTH_PREFIX_SIZE);
        Some(self.buffer.split_to(payload_len).freeze())
    }

    /// Payload length announced by the buffered prefix, once 4 bytes are in
    pub fn pending_payload_len(&self) -> Option<usize> {
        let prefix: [u8; LENGTH_PREFIX_SIZE] =
            self.buffer.get(..LENGTH_PREFIX_SIZE)?.try_into().ok()?;
        usize::try_from(u32::from_be_bytes(prefix)).ok()
    }

    /// Number of bytes received but not yet yielded
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Drop everything buffered
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for FrameReassembler {
    fn default() -> Self {
        Self::new()
    }
}

/// Lazy iterator over complete frame payloads
#[derive(Debug)]
pub struct Frames<'a> {
    reassembler: &'a mut FrameReassembler,
}

impl Iterator for Frames<'_> {
    type Item = Bytes;

    fn next(&mut self) -> Option<Self::Item> {
        self.reassembler.next_frame()
    }
}

#[cfg(test)]
#[path = "reassembler/reassembler_tests.rs"]
mod reassembler_tests;
