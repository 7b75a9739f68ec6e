use std::convert::TryInto;
use std::io::Cursor;

use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;

use crate::frame::{self, Frame};
use crate::Error;

/// Streaming RESP decoder over a growable byte buffer.
///
/// A full frame may span several socket reads; until one is complete the
/// decoder reports `Ok(None)` and leaves the buffer untouched.
pub struct FrameCodec;

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let mut cursor = Cursor::new(&src[..]);
        let frame = match Frame::parse(&mut cursor) {
            Ok(frame) => frame,
            // Not enough data to parse a frame.
            Err(frame::Error::Incomplete) => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let position: usize = cursor
            .position()
            .try_into()
            .expect("cursor position is too large");

        // Remove the parsed frame from the buffer.
        src.advance(position);

        Ok(Some(frame))
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    #[test]
    fn decode_whole_frame() {
        let mut codec = FrameCodec;
        let mut buffer = BytesMut::from(&b"+OK\r\n"[..]);

        let frame = codec.decode(&mut buffer).unwrap();

        assert_eq!(frame, Some(Frame::Simple("OK".to_string())));
        assert!(buffer.is_empty());
    }

    #[test]
    fn decode_incomplete_frame_keeps_buffer() {
        let mut codec = FrameCodec;
        let mut buffer = BytesMut::from(&b"*2\r\n$3\r\nfoo\r\n"[..]);

        let frame = codec.decode(&mut buffer).unwrap();

        assert_eq!(frame, None);
        assert_eq!(&buffer[..], b"*2\r\n$3\r\nfoo\r\n");
    }

    #[test]
    fn decode_completes_once_remainder_arrives() {
        let mut codec = FrameCodec;
        let mut buffer = BytesMut::from(&b"*2\r\n$3\r\nfoo\r\n"[..]);

        assert_eq!(codec.decode(&mut buffer).unwrap(), None);

        buffer.extend_from_slice(b"$3\r\nbar\r\n");
        let frame = codec.decode(&mut buffer).unwrap();

        assert_eq!(
            frame,
            Some(Frame::Array(vec![
                Frame::Bulk(Bytes::from("foo")),
                Frame::Bulk(Bytes::from("bar")),
            ]))
        );
        assert!(buffer.is_empty());
    }

    #[test]
    fn decode_leaves_trailing_bytes_for_next_call() {
        let mut codec = FrameCodec;
        let mut buffer = BytesMut::from(&b":1\r\n:2\r\n"[..]);

        assert_eq!(codec.decode(&mut buffer).unwrap(), Some(Frame::Integer(1)));
        assert_eq!(codec.decode(&mut buffer).unwrap(), Some(Frame::Integer(2)));
        assert_eq!(codec.decode(&mut buffer).unwrap(), None);
    }

    #[test]
    fn decode_propagates_framing_errors() {
        let mut codec = FrameCodec;
        let mut buffer = BytesMut::from(&b"?oops\r\n"[..]);

        assert!(codec.decode(&mut buffer).is_err());
    }
}
