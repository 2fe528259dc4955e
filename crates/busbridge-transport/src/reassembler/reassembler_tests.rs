#![allow(non_snake_case)]

use super::*;

fn frame(payload: &[u8]) -> Vec<u8> {
    let mut out = (payload.len() as u32).to_be_bytes().to_vec();
    out.extend_from_slice(payload);
    out
}

#[test]
fn FrameReassembler___feed___whole_frame_yields_payload() {
    let mut reassembler = FrameReassembler::new();

    let frames: Vec<Bytes> = reassembler.feed(&frame(b"{\"a\":1}")).collect();

    assert_eq!(frames.len(), 1);
    assert_eq!(&frames[0][..], b"{\"a\":1}");
    assert!(reassembler.is_empty());
}

#[test]
fn FrameReassembler___feed___split_inside_length_prefix() {
    let mut reassembler = FrameReassembler::new();
    let bytes = frame(b"{}");

    assert_eq!(reassembler.feed(&bytes[..1]).count(), 0);
    assert_eq!(reassembler.feed(&bytes[1..3]).count(), 0);
    let frames: Vec<Bytes> = reassembler.feed(&bytes[3..]).collect();

    assert_eq!(frames, vec![Bytes::from_static(b"{}")]);
}

#[test]
fn FrameReassembler___feed___split_mid_payload_buffers_until_complete() {
    let mut reassembler = FrameReassembler::new();
    let bytes = frame(b"{\"msg\":\"hello\"}");

    assert_eq!(reassembler.feed(&bytes[..7]).count(), 0);
    assert_eq!(reassembler.buffered_len(), 7);
    let frames: Vec<Bytes> = reassembler.feed(&bytes[7..]).collect();

    assert_eq!(&frames[0][..], b"{\"msg\":\"hello\"}");
}

#[test]
fn FrameReassembler___feed___coalesced_frames_yield_in_order() {
    let mut reassembler = FrameReassembler::new();
    let mut bytes = frame(b"1");
    bytes.extend(frame(b"22"));
    bytes.extend(frame(b"333"));

    let frames: Vec<Bytes> = reassembler.feed(&bytes).collect();

    assert_eq!(
        frames,
        vec![
            Bytes::from_static(b"1"),
            Bytes::from_static(b"22"),
            Bytes::from_static(b"333"),
        ]
    );
}

#[test]
fn FrameReassembler___feed___trailing_partial_frame_kept() {
    let mut reassembler = FrameReassembler::new();
    let mut bytes = frame(b"first");
    let second = frame(b"second");
    bytes.extend_from_slice(&second[..6]);

    let frames: Vec<Bytes> = reassembler.feed(&bytes).collect();

    assert_eq!(frames.len(), 1);
    assert_eq!(reassembler.buffered_len(), 6);
    assert_eq!(reassembler.pending_payload_len(), Some(6));
}

#[test]
fn FrameReassembler___feed___zero_length_frame_yields_empty_payload() {
    let mut reassembler = FrameReassembler::new();

    let frames: Vec<Bytes> = reassembler.feed(&[0, 0, 0, 0]).collect();

    assert_eq!(frames, vec![Bytes::new()]);
}

#[test]
fn FrameReassembler___feed___iterator_is_lazy_and_restartable() {
    let mut reassembler = FrameReassembler::new();
    let mut bytes = frame(b"a");
    bytes.extend(frame(b"b"));

    let first = reassembler.feed(&bytes).next();
    let rest: Vec<Bytes> = reassembler.frames().collect();

    assert_eq!(first, Some(Bytes::from_static(b"a")));
    assert_eq!(rest, vec![Bytes::from_static(b"b")]);
}

#[test]
fn FrameReassembler___feed___payload_bytes_are_not_validated() {
    let mut reassembler = FrameReassembler::new();
    let mut bytes = frame(b"not json");
    bytes.extend(frame(b"{}"));

    let frames: Vec<Bytes> = reassembler.feed(&bytes).collect();

    assert_eq!(frames.len(), 2);
    assert_eq!(&frames[1][..], b"{}");
}

#[test]
fn FrameReassembler___pending_payload_len___none_before_prefix_complete() {
    let mut reassembler = FrameReassembler::new();

    let _ = reassembler.feed(&[0, 0, 1]).count();

    assert_eq!(reassembler.pending_payload_len(), None);
}

#[test]
fn FrameReassembler___clear___drops_buffered_bytes() {
    let mut reassembler = FrameReassembler::default();
    let _ = reassembler.feed(&[0, 0, 0, 9, 1, 2]).count();

    reassembler.clear();

    assert!(reassembler.is_empty());
}
