// https://redis.io/docs/reference/protocol-spec

use std::fmt;
use std::io::Cursor;

use bytes::{Buf, Bytes};
use thiserror::Error as ThisError;

static CRLF: &[u8; 2] = b"\r\n";

#[derive(Debug, ThisError, PartialEq)]
pub enum Error {
    #[error("not enough data is available to parse an entire frame")]
    Incomplete,
    #[error("invalid frame data type: {0}")]
    InvalidDataType(u8),
    #[error("invalid frame length")]
    InvalidLength,
    #[error("invalid integer value")]
    InvalidInteger,
    #[error("frame is not terminated by CRLF")]
    BadLineEnding,
    #[error("invalid UTF-8 string")]
    InvalidUtf8,
}

/// A single RESP value.
///
/// Requests and responses are both built from these five kinds. Bulk strings
/// and arrays each have a distinguished null form (`$-1\r\n` and `*-1\r\n`)
/// that is not the same as being empty.
#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    Simple(String),
    Error(String),
    Integer(i64),
    Bulk(Bytes),
    NullBulkString,
    Array(Vec<Frame>),
    NullArray,
}

impl Frame {
    /// Parses one top-level frame out of `src`, consuming exactly the bytes
    /// that belong to it. Callers feeding a stream may invoke this repeatedly;
    /// `Error::Incomplete` means more bytes are needed, not that the input is
    /// malformed.
    pub fn parse(src: &mut Cursor<&[u8]>) -> Result<Self, Error> {
        // The first byte in a RESP-serialized payload always identifies its
        // type. Subsequent bytes constitute the type's contents.
        let first_byte = get_byte(src)?;
        let data_type = DataType::try_from(first_byte)?;

        match data_type {
            DataType::SimpleString => {
                let bytes = get_line(src)?.to_vec();
                let string = String::from_utf8(bytes).map_err(|_| Error::InvalidUtf8)?;
                Ok(Frame::Simple(string))
            }
            DataType::SimpleError => {
                let bytes = get_line(src)?.to_vec();
                let string = String::from_utf8(bytes).map_err(|_| Error::InvalidUtf8)?;
                Ok(Frame::Error(string))
            }
            DataType::Integer => {
                let line = get_line(src)?;
                let integer = parse_decimal(line).ok_or(Error::InvalidInteger)?;
                Ok(Frame::Integer(integer))
            }
            // $<length>\r\n<data>\r\n
            DataType::BulkString => {
                let length = match get_length(src)? {
                    -1 => return Ok(Frame::NullBulkString),
                    n if n < -1 => return Err(Error::InvalidLength),
                    n => n as usize,
                };

                if src.remaining() < length + CRLF.len() {
                    return Err(Error::Incomplete);
                }

                let start = src.position() as usize;
                let data = Bytes::copy_from_slice(&src.get_ref()[start..start + length]);
                src.advance(length);

                let terminator = [src.get_u8(), src.get_u8()];
                if terminator != *CRLF {
                    return Err(Error::BadLineEnding);
                }

                Ok(Frame::Bulk(data))
            }
            // *<number-of-elements>\r\n<element-1>...<element-n>
            DataType::Array => {
                let length = match get_length(src)? {
                    -1 => return Ok(Frame::NullArray),
                    n if n < -1 => return Err(Error::InvalidLength),
                    n => n as usize,
                };

                let mut frames = Vec::with_capacity(length);
                for _ in 0..length {
                    frames.push(Self::parse(src)?);
                }

                Ok(Frame::Array(frames))
            }
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        match self {
            Frame::Simple(s) => {
                let mut bytes = Vec::with_capacity(1 + s.len() + CRLF.len());
                bytes.push(u8::from(DataType::SimpleString));
                bytes.extend_from_slice(s.as_bytes());
                bytes.extend_from_slice(CRLF);
                bytes
            }
            Frame::Error(s) => {
                let mut bytes = Vec::with_capacity(1 + s.len() + CRLF.len());
                bytes.push(u8::from(DataType::SimpleError));
                bytes.extend_from_slice(s.as_bytes());
                bytes.extend_from_slice(CRLF);
                bytes
            }
            Frame::Integer(i) => {
                let repr = i.to_string();
                let mut bytes = Vec::with_capacity(1 + repr.len() + CRLF.len());
                bytes.push(u8::from(DataType::Integer));
                bytes.extend_from_slice(repr.as_bytes());
                bytes.extend_from_slice(CRLF);
                bytes
            }
            Frame::Bulk(data) => {
                let length = data.len().to_string();
                let mut bytes = Vec::with_capacity(1 + length.len() + CRLF.len() * 2 + data.len());
                bytes.push(u8::from(DataType::BulkString));
                bytes.extend_from_slice(length.as_bytes());
                bytes.extend_from_slice(CRLF);
                bytes.extend_from_slice(data);
                bytes.extend_from_slice(CRLF);
                bytes
            }
            Frame::NullBulkString => b"$-1\r\n".to_vec(),
            Frame::Array(frames) => {
                let length = frames.len().to_string();
                let mut bytes = Vec::with_capacity(1 + length.len() + CRLF.len());
                bytes.push(u8::from(DataType::Array));
                bytes.extend_from_slice(length.as_bytes());
                bytes.extend_from_slice(CRLF);
                for frame in frames {
                    bytes.extend(frame.serialize());
                }
                bytes
            }
            Frame::NullArray => b"*-1\r\n".to_vec(),
        }
    }

    /// Bulk string frame from anything byte-like.
    pub fn bulk(data: impl Into<Bytes>) -> Frame {
        Frame::Bulk(data.into())
    }
}

impl From<Frame> for Vec<u8> {
    fn from(frame: Frame) -> Self {
        frame.serialize()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Simple(s) => write!(f, "+{}", s),
            Frame::Error(s) => write!(f, "-{}", s),
            Frame::Integer(i) => write!(f, ":{}", i),
            Frame::Bulk(bytes) => write!(f, "${}", String::from_utf8_lossy(bytes)),
            Frame::NullBulkString => write!(f, "$-1"),
            Frame::Array(frames) => {
                write!(f, "*{}", frames.len())?;
                for frame in frames {
                    write!(f, " {}", frame)?;
                }
                Ok(())
            }
            Frame::NullArray => write!(f, "*-1"),
        }
    }
}

/// Reads up to (but not including) the next CRLF and positions the cursor
/// just past it.
fn get_line<'a>(src: &mut Cursor<&'a [u8]>) -> Result<&'a [u8], Error> {
    let buf: &'a [u8] = src.get_ref();
    let start = src.position() as usize;

    let line_end = buf[start..]
        .windows(CRLF.len())
        .position(|window| window == CRLF)
        .map(|index| start + index)
        .ok_or(Error::Incomplete)?;

    src.set_position((line_end + CRLF.len()) as u64);

    Ok(&buf[start..line_end])
}

/// Reads a length prefix line (`<decimal>\r\n`). `-1` is the only negative
/// value with a meaning (null); anything more negative is left for the caller
/// to reject.
fn get_length(src: &mut Cursor<&[u8]>) -> Result<i64, Error> {
    let line = get_line(src)?;
    parse_decimal(line).ok_or(Error::InvalidLength)
}

fn parse_decimal(line: &[u8]) -> Option<i64> {
    std::str::from_utf8(line).ok()?.parse::<i64>().ok()
}

fn get_byte(src: &mut Cursor<&[u8]>) -> Result<u8, Error> {
    if !src.has_remaining() {
        return Err(Error::Incomplete);
    }
    Ok(src.get_u8())
}

#[derive(Debug)]
enum DataType {
    SimpleString, // '+'
    SimpleError,  // '-'
    Integer,      // ':'
    BulkString,   // '$'
    Array,        // '*'
}

impl TryFrom<u8> for DataType {
    type Error = Error;

    fn try_from(byte: u8) -> Result<Self, Error> {
        match byte {
            b'+' => Ok(Self::SimpleString),
            b'-' => Ok(Self::SimpleError),
            b':' => Ok(Self::Integer),
            b'$' => Ok(Self::BulkString),
            b'*' => Ok(Self::Array),
            _ => Err(Error::InvalidDataType(byte)),
        }
    }
}

impl From<DataType> for u8 {
    fn from(value: DataType) -> Self {
        match value {
            DataType::SimpleString => b'+',
            DataType::SimpleError => b'-',
            DataType::Integer => b':',
            DataType::BulkString => b'$',
            DataType::Array => b'*',
        }
    }
}
