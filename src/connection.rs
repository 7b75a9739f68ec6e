use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_util::codec::Decoder;

use crate::codec::FrameCodec;
use crate::frame::Frame;
use crate::Result;

pub struct Connection {
    stream: TcpStream,
    // Data is read from the socket into the read buffer. When a frame is
    // parsed, the corresponding data is removed from the buffer.
    buffer: BytesMut,
    codec: FrameCodec,
}

impl Connection {
    pub fn new(stream: TcpStream) -> Connection {
        Connection {
            stream,
            // Allocate the buffer with 4kb of capacity.
            buffer: BytesMut::with_capacity(4096),
            codec: FrameCodec,
        }
    }

    /// Reads one frame, pulling more bytes from the socket as needed.
    ///
    /// Returns `None` when the peer closed the connection cleanly between
    /// frames. A close in the middle of a frame is a protocol error.
    pub async fn read_frame(&mut self) -> Result<Option<Frame>> {
        loop {
            if let Some(frame) = self.codec.decode(&mut self.buffer)? {
                return Ok(Some(frame));
            }

            if self.stream.read_buf(&mut self.buffer).await? == 0 {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                return Err("connection reset by peer".into());
            }
        }
    }

    pub async fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.stream.write_all(&frame.serialize()).await?;
        Ok(())
    }
}
